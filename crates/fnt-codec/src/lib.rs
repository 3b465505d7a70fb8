#![forbid(unsafe_code)]

//! Fountain file operations: encode a source into rows, decode rows back into
//! the source, merge row sets, shrink after solving and inspect a file.
//!
//! Every operation validates its inputs (existence, magic, header) before it
//! writes anything.

pub mod coefficients;
pub mod encoder;
pub mod decoder;
pub mod merger;
pub mod shrinker;
pub mod info;

pub use coefficients::{CoefficientsFactory, Entropy, RngEntropy};
pub use decoder::{decode, DecodeOutcome};
pub use encoder::{encode, EncodeOptions, EncodeOutcome, EncodeReport, Overwrite, RowSizing};
pub use info::{inspect, FountainInfo, FountainSummary};
pub use merger::{merge_from, merge_siblings};
pub use shrinker::{shrink, ShrinkReport};

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use fnt_core::{FntError, FntResult, FormatError, FountainHeader};

/// Reads and validates the header at offset 0.
pub fn read_header(file: &mut File) -> FntResult<FountainHeader> {
    if file.metadata()?.len() < FountainHeader::SIZE as u64 {
        return Err(FormatError::Truncated.into());
    }
    let mut buf = [0u8; FountainHeader::SIZE];
    file.seek(SeekFrom::Start(0))?;
    file.read_exact(&mut buf)?;
    Ok(FountainHeader::from_bytes(&buf)?)
}

/// Opens an existing fountain file and parses its header.
pub fn open_fountain(path: &Path, writable: bool) -> FntResult<(File, FountainHeader)> {
    if !path.is_file() {
        return Err(FntError::NotFound(path.to_path_buf()));
    }
    let mut file = OpenOptions::new().read(true).write(writable).open(path)?;
    let header = read_header(&mut file)?;
    Ok((file, header))
}

/// True when both paths name the same existing file.
pub(crate) fn same_file(a: &Path, b: &Path) -> FntResult<bool> {
    if !a.exists() || !b.exists() {
        return Ok(false);
    }
    Ok(fs::canonicalize(a)? == fs::canonicalize(b)?)
}

/// Cheap magic/version check, run before any heavier work.
pub fn check_fountain(path: &Path) -> FntResult<()> {
    if !path.is_file() {
        return Err(FntError::NotFound(path.to_path_buf()));
    }
    let mut tag = [0u8; 4];
    let mut file = File::open(path)?;
    let mut read = 0;
    while read < tag.len() {
        match file.read(&mut tag[read..])? {
            0 => break,
            n => read += n,
        }
    }
    FountainHeader::check_magic(&tag[..read])?;
    Ok(())
}
