use fnt_core::{derive_row_size, coefficient_count_from_row_size, FormatError, FountainHeader};
use proptest::prelude::*;

#[test]
fn test_magic_rejection() {
    let mut bytes = FountainHeader::new([7u8; 32], 100, 10).to_bytes();

    // Right tag, wrong version byte
    bytes[3] = b'9';
    assert_eq!(FountainHeader::from_bytes(&bytes), Err(FormatError::UnrecognizedVersion(b'9')));

    // Wrong tag
    bytes[0] = b'X';
    assert_eq!(FountainHeader::from_bytes(&bytes), Err(FormatError::NotFountain));

    // Short buffer
    assert_eq!(FountainHeader::from_bytes(&bytes[..20]), Err(FormatError::Truncated));
}

#[test]
fn test_zero_row_size_rejected() {
    let bytes = FountainHeader::new([0u8; 32], 100, 0).to_bytes();
    assert_eq!(FountainHeader::from_bytes(&bytes), Err(FormatError::ZeroRowSize));
}

#[test]
fn test_oversized_geometry_rejected() {
    // Would overflow a naive ceil(len / row) and then allocate per coefficient
    let bytes = FountainHeader::new([0u8; 32], u64::MAX, 2).to_bytes();
    assert_eq!(
        FountainHeader::from_bytes(&bytes),
        Err(FormatError::TooManyCoefficients(u64::MAX / 2 + 1))
    );

    let bytes = FountainHeader::new([0u8; 32], 1 << 40, 1).to_bytes();
    assert_eq!(FountainHeader::from_bytes(&bytes), Err(FormatError::TooManyCoefficients(1 << 40)));

    // Exactly at the ceiling is still a valid file
    let bytes = FountainHeader::new([0u8; 32], 65_535, 1).to_bytes();
    assert!(FountainHeader::from_bytes(&bytes).is_ok());
}

#[test]
fn test_compatibility_is_byte_exact() {
    let a = FountainHeader::new([1u8; 32], 100, 10);
    assert!(a.is_compatible(&FountainHeader::new([1u8; 32], 100, 10)));
    assert!(!a.is_compatible(&FountainHeader::new([2u8; 32], 100, 10)));
    assert!(!a.is_compatible(&FountainHeader::new([1u8; 32], 101, 10)));
    assert!(!a.is_compatible(&FountainHeader::new([1u8; 32], 100, 11)));
}

proptest! {
    #[test]
    fn sizing_invariant_holds(file_len in 1u64..50_000_000, hint in 1u32..=65_535) {
        let (row_size, n) = derive_row_size(file_len, hint).unwrap();
        let row_size = row_size as u64;
        prop_assert!(row_size > 0);
        prop_assert!(n > 0);
        prop_assert!(row_size * (n - 1) < file_len);
        prop_assert!(file_len <= row_size * n);
        prop_assert!(n <= hint as u64);
    }

    #[test]
    fn explicit_row_size_covers_file(file_len in 1u64..50_000_000, row_size in 1u32..1_000_000) {
        let n = coefficient_count_from_row_size(file_len, row_size);
        let row_size = row_size as u64;
        prop_assert!(row_size * (n - 1) < file_len);
        prop_assert!(file_len <= row_size * n);
    }
}
