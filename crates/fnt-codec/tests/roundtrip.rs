use std::fs;
use std::path::Path;

use fnt_codec::{
    decode, encode, inspect, CoefficientsFactory, DecodeOutcome, EncodeOptions, EncodeOutcome,
    FountainInfo, Overwrite, RowSizing,
};
use fnt_core::{header_size, FntError, FormatError};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tempfile::TempDir;

fn random_file(dir: &TempDir, name: &str, len: usize, seed: u64) -> (std::path::PathBuf, Vec<u8>) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let data: Vec<u8> = (0..len).map(|_| rng.gen()).collect();
    let path = dir.path().join(name);
    fs::write(&path, &data).unwrap();
    (path, data)
}

fn encoded(outcome: EncodeOutcome) -> fnt_codec::EncodeReport {
    match outcome {
        EncodeOutcome::Encoded(report) => report,
        EncodeOutcome::Skipped => panic!("encode was skipped"),
    }
}

#[test]
fn test_systematic_hundred_bytes() {
    let dir = tempfile::tempdir().unwrap();
    let (source, data) = random_file(&dir, "source.bin", 100, 1);
    let fountain = dir.path().join("source.fnt");
    let restored = dir.path().join("restored.bin");

    let options = EncodeOptions {
        systematic: true,
        sizing: RowSizing::CoefficientHint(10),
        rows: Some(10),
        ..Default::default()
    };
    let report = encoded(encode(&source, &fountain, options, &mut CoefficientsFactory::seeded(5)).unwrap());
    assert_eq!(report.rows, 10);
    assert_eq!(report.header.row_size, 10);

    // 10 coefficients pack into 2 bytes: 10 blocks of 12
    assert_eq!(fs::metadata(&fountain).unwrap().len(), header_size() + 120);

    assert_eq!(decode(&fountain, &restored).unwrap(), DecodeOutcome::Decoded { steps: 0 });
    assert_eq!(fs::read(&restored).unwrap(), data);
}

#[test]
fn test_too_few_rows_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let (source, _) = random_file(&dir, "source.bin", 100, 2);
    let fountain = dir.path().join("source.fnt");
    let restored = dir.path().join("restored.bin");

    let options = EncodeOptions {
        sizing: RowSizing::CoefficientHint(10),
        rows: Some(5),
        ..Default::default()
    };
    encode(&source, &fountain, options, &mut CoefficientsFactory::seeded(6)).unwrap();

    assert_eq!(decode(&fountain, &restored).unwrap(), DecodeOutcome::NotSolvable);
    assert!(!restored.exists());
}

#[test]
fn test_auto_stop_yields_decodable_file() {
    let dir = tempfile::tempdir().unwrap();
    let (source, data) = random_file(&dir, "source.bin", 4000, 3);
    let fountain = dir.path().join("source.fnt");
    let restored = dir.path().join("restored.bin");

    let options = EncodeOptions { sizing: RowSizing::CoefficientHint(40), ..Default::default() };
    let report = encoded(encode(&source, &fountain, options, &mut CoefficientsFactory::seeded(7)).unwrap());
    let g = report.geometry();
    assert!(report.rows >= g.num_coefficients);
    assert_eq!(fs::metadata(&fountain).unwrap().len(), g.row_offset(report.rows));

    match inspect(&fountain).unwrap() {
        FountainInfo::Fountain(summary) => {
            assert_eq!(summary.rows, report.rows);
            assert!(summary.solvable);
        }
        other => panic!("unexpected {:?}", other),
    }

    assert!(matches!(decode(&fountain, &restored).unwrap(), DecodeOutcome::Decoded { .. }));
    assert_eq!(fs::read(&restored).unwrap(), data);
}

#[test]
fn test_percent_row_count_and_short_last_chunk() {
    let dir = tempfile::tempdir().unwrap();
    let (source, data) = random_file(&dir, "source.bin", 1001, 4);
    let fountain = dir.path().join("source.fnt");
    let restored = dir.path().join("restored.bin");

    let options = EncodeOptions {
        systematic: true,
        sizing: RowSizing::RowSize(100),
        percent: Some(25.0),
        ..Default::default()
    };
    let report = encoded(encode(&source, &fountain, options, &mut CoefficientsFactory::seeded(8)).unwrap());
    // 11 coefficients + ceil(2.75)
    assert_eq!(report.rows, 14);

    decode(&fountain, &restored).unwrap();
    assert_eq!(fs::read(&restored).unwrap(), data);
}

#[test]
fn test_corrupt_payload_fails_integrity() {
    let dir = tempfile::tempdir().unwrap();
    let (source, _) = random_file(&dir, "source.bin", 64, 9);
    let fountain = dir.path().join("source.fnt");
    let restored = dir.path().join("restored.bin");

    let options = EncodeOptions {
        systematic: true,
        sizing: RowSizing::RowSize(16),
        rows: Some(4),
        ..Default::default()
    };
    encode(&source, &fountain, options, &mut CoefficientsFactory::seeded(9)).unwrap();

    // Flip a payload byte of the first row
    let mut bytes = fs::read(&fountain).unwrap();
    let payload_start = header_size() as usize + 1;
    bytes[payload_start] ^= 0x01;
    fs::write(&fountain, &bytes).unwrap();

    assert!(matches!(decode(&fountain, &restored), Err(FntError::Integrity { .. })));
    assert!(!restored.exists());
}

#[test]
fn test_empty_and_missing_sources() {
    let dir = tempfile::tempdir().unwrap();
    let empty = dir.path().join("empty.bin");
    fs::write(&empty, b"").unwrap();
    let out = dir.path().join("out.fnt");
    let mut factory = CoefficientsFactory::seeded(0);

    assert!(matches!(
        encode(&empty, &out, EncodeOptions::default(), &mut factory),
        Err(FntError::Format(FormatError::EmptySource))
    ));
    assert!(matches!(
        encode(&dir.path().join("nope"), &out, EncodeOptions::default(), &mut factory),
        Err(FntError::NotFound(_))
    ));
    assert!(!out.exists());
}

#[test]
fn test_overwrite_policy() {
    let dir = tempfile::tempdir().unwrap();
    let (source, _) = random_file(&dir, "source.bin", 50, 10);
    let out = dir.path().join("out.fnt");
    fs::write(&out, b"keep me").unwrap();
    let mut factory = CoefficientsFactory::seeded(0);

    let refused = encode(&source, &out, EncodeOptions::default(), &mut factory).unwrap();
    assert_eq!(refused, EncodeOutcome::Skipped);
    assert_eq!(fs::read(&out).unwrap(), b"keep me");

    let declined = EncodeOptions { overwrite: Overwrite::Ask(Box::new(|_: &Path| false)), ..Default::default() };
    assert_eq!(encode(&source, &out, declined, &mut factory).unwrap(), EncodeOutcome::Skipped);

    let accepted = EncodeOptions { overwrite: Overwrite::Ask(Box::new(|_: &Path| true)), ..Default::default() };
    assert!(matches!(encode(&source, &out, accepted, &mut factory).unwrap(), EncodeOutcome::Encoded(_)));
    assert_eq!(&fs::read(&out).unwrap()[..4], b"FNT0");
}

#[test]
fn test_decode_requires_fountain_input() {
    let dir = tempfile::tempdir().unwrap();
    let plain = dir.path().join("plain.txt");
    fs::write(&plain, b"hello world, definitely not a fountain file at all........").unwrap();
    let out = dir.path().join("out.bin");

    assert!(matches!(decode(&plain, &out), Err(FntError::Format(FormatError::NotFountain))));
    assert!(matches!(decode(&dir.path().join("missing"), &out), Err(FntError::NotFound(_))));
    assert!(!out.exists());
}

#[test]
fn test_decode_onto_itself_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    let (source, _) = random_file(&dir, "source.bin", 100, 11);
    let fountain = dir.path().join("source.fnt");
    let options = EncodeOptions {
        systematic: true,
        sizing: RowSizing::CoefficientHint(10),
        rows: Some(10),
        ..Default::default()
    };
    encode(&source, &fountain, options, &mut CoefficientsFactory::seeded(11)).unwrap();
    let before = fs::read(&fountain).unwrap();

    assert!(matches!(decode(&fountain, &fountain), Err(FntError::InvalidArgument(_))));
    // Same file reached through a different spelling of the path
    let dotted = dir.path().join(".").join("source.fnt");
    assert!(matches!(decode(&fountain, &dotted), Err(FntError::InvalidArgument(_))));
    assert_eq!(fs::read(&fountain).unwrap(), before);
}

#[test]
fn test_encode_onto_source_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    let (source, data) = random_file(&dir, "source.bin", 100, 12);
    let options = EncodeOptions { overwrite: Overwrite::Replace, ..Default::default() };

    assert!(matches!(
        encode(&source, &source, options, &mut CoefficientsFactory::seeded(12)),
        Err(FntError::InvalidArgument(_))
    ));
    assert_eq!(fs::read(&source).unwrap(), data);
}

#[test]
fn test_oversized_header_is_a_format_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("huge.fnt");
    let header = fnt_core::FountainHeader::new([0u8; 32], u64::MAX, 2);
    fs::write(&path, header.to_bytes()).unwrap();

    assert!(matches!(
        inspect(&path).unwrap(),
        FountainInfo::NotFountain(FormatError::TooManyCoefficients(_))
    ));
    assert!(matches!(
        decode(&path, &dir.path().join("out.bin")),
        Err(FntError::Format(FormatError::TooManyCoefficients(_)))
    ));
}
