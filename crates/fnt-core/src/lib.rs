#![forbid(unsafe_code)]

use std::path::PathBuf;

pub mod geometry;
pub use geometry::{
    coefficient_count_from_row_size, derive_row_size, header_size, packed_byte_count, Geometry,
};

/// "FNT" followed by the format version byte.
pub const FNT_MAGIC: [u8; 3] = *b"FNT";
pub const FNT_VERSION: u8 = b'0';

/// Upper bound on coefficients accepted when creating a fountain file.
pub const MAX_COEFFICIENTS: u32 = 65_535;

/// Fixed record at offset 0 of every fountain file.
/// Layout (little-endian, packed): magic[4] | sha256[32] | source_len u64 | row_size u32.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FountainHeader {
    pub magic: [u8; 4],
    pub source_hash: [u8; 32],
    pub source_len: u64,
    pub row_size: u32,
}

impl FountainHeader {
    pub const SIZE: usize = 48;

    pub fn new(source_hash: [u8; 32], source_len: u64, row_size: u32) -> Self {
        let mut magic = [0u8; 4];
        magic[0..3].copy_from_slice(&FNT_MAGIC);
        magic[3] = FNT_VERSION;
        Self { magic, source_hash, source_len, row_size }
    }

    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut buf = [0u8; Self::SIZE];
        buf[0..4].copy_from_slice(&self.magic);
        buf[4..36].copy_from_slice(&self.source_hash);
        buf[36..44].copy_from_slice(&self.source_len.to_le_bytes());
        buf[44..48].copy_from_slice(&self.row_size.to_le_bytes());
        buf
    }

    pub fn from_bytes(buf: &[u8]) -> Result<Self, FormatError> {
        if buf.len() < Self::SIZE { return Err(FormatError::Truncated); }
        Self::check_magic(buf)?;

        let mut magic = [0u8; 4];
        magic.copy_from_slice(&buf[0..4]);
        let mut source_hash = [0u8; 32];
        source_hash.copy_from_slice(&buf[4..36]);
        let mut len_bytes = [0u8; 8];
        len_bytes.copy_from_slice(&buf[36..44]);
        let mut row_bytes = [0u8; 4];
        row_bytes.copy_from_slice(&buf[44..48]);

        let header = Self {
            magic,
            source_hash,
            source_len: u64::from_le_bytes(len_bytes),
            row_size: u32::from_le_bytes(row_bytes),
        };
        if header.row_size == 0 { return Err(FormatError::ZeroRowSize); }
        if header.source_len == 0 { return Err(FormatError::EmptySource); }

        // Bounds every size derived from the header
        let count = coefficient_count_from_row_size(header.source_len, header.row_size);
        if count > MAX_COEFFICIENTS as u64 {
            return Err(FormatError::TooManyCoefficients(count));
        }
        Ok(header)
    }

    /// Magic/version pre-check on the first four bytes of a file.
    pub fn check_magic(buf: &[u8]) -> Result<(), FormatError> {
        if buf.len() < 4 { return Err(FormatError::Truncated); }
        if buf[0..3] != FNT_MAGIC { return Err(FormatError::NotFountain); }
        if buf[3] != FNT_VERSION { return Err(FormatError::UnrecognizedVersion(buf[3])); }
        Ok(())
    }

    /// Byte-exact equality, the compatibility rule for merging.
    pub fn is_compatible(&self, other: &Self) -> bool {
        self.to_bytes() == other.to_bytes()
    }

    pub fn geometry(&self) -> Geometry {
        Geometry::new(self.source_len, self.row_size)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    #[error("truncated header")]
    Truncated,
    #[error("not a fountain file")]
    NotFountain,
    #[error("unrecognized fountain version {0:#04x}")]
    UnrecognizedVersion(u8),
    #[error("header declares a zero row size")]
    ZeroRowSize,
    #[error("source is empty")]
    EmptySource,
    #[error("header describes {0} coefficients, more than 65535")]
    TooManyCoefficients(u64),
    #[error("incompatible fountain headers")]
    Incompatible,
}

pub type FntResult<T> = Result<T, FntError>;

#[derive(Debug, thiserror::Error)]
pub enum FntError {
    #[error("cannot find file {}", .0.display())]
    NotFound(PathBuf),
    #[error(transparent)]
    Format(#[from] FormatError),
    #[error("SHA256 mismatch: expected {expected}, got {actual}")]
    Integrity { expected: String, actual: String },
    #[error("range {offset}+{count} exceeds file length {len}")]
    OutOfRange { offset: u64, count: usize, len: u64 },
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
    #[error("window is read-only")]
    ReadOnly,
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Uppercase hex, dash separated, as printed by `info`.
pub fn hash_to_hex(hash: &[u8]) -> String {
    let mut out = String::with_capacity(hash.len() * 3);
    for (i, b) in hash.iter().enumerate() {
        if i > 0 { out.push('-'); }
        out.push_str(&format!("{:02X}", b));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_layout_is_little_endian() {
        let header = FountainHeader::new([0xAB; 32], 0x0A0B_0C0D_0E0F, 0x4000_0011);
        let bytes = header.to_bytes();
        assert_eq!(&bytes[0..4], b"FNT0");
        assert_eq!(bytes[4], 0xAB);
        assert_eq!(bytes[36], 0x0F);
        assert_eq!(bytes[41], 0x0A);
        assert_eq!(bytes[43], 0x00);
        assert_eq!(bytes[44], 0x11);
        assert_eq!(bytes[47], 0x40);
        assert_eq!(FountainHeader::from_bytes(&bytes).unwrap(), header);
    }

    #[test]
    fn hex_is_dash_separated() {
        assert_eq!(hash_to_hex(&[0x00, 0xFF, 0x1A]), "00-FF-1A");
    }
}
