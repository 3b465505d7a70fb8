use crate::{FntError, FntResult, FountainHeader};

/// Constant byte size of the header record.
pub const fn header_size() -> u64 {
    FountainHeader::SIZE as u64
}

/// ceil(n / 8): bytes needed for `n` bit-packed coefficients.
pub const fn packed_byte_count(num_coefficients: usize) -> usize {
    (num_coefficients + 7) / 8
}

/// ceil(a / b) without the overflow of `a + b - 1`.
const fn div_ceil(a: u64, b: u64) -> u64 {
    a / b + (a % b != 0) as u64
}

/// ceil(file_len / row_size).
pub fn coefficient_count_from_row_size(file_len: u64, row_size: u32) -> u64 {
    div_ceil(file_len, row_size as u64)
}

/// Derives (row_size, coefficient_count) from a coefficient count hint.
/// Padding is bounded to under one row. Callers ensure both inputs are non-zero.
pub fn derive_row_size(file_len: u64, coefficient_hint: u32) -> FntResult<(u32, u64)> {
    let mut n = (coefficient_hint as u64).min(file_len).max(1);
    let mut row_size = div_ceil(file_len, n);

    if row_size.saturating_mul(n) > file_len.saturating_add(row_size) {
        n = div_ceil(file_len - 1, row_size).max(1);
        row_size = div_ceil(file_len, n);
    }

    // The header only carries the row size; the count is always re-derived from it.
    let row_size = u32::try_from(row_size)
        .map_err(|_| FntError::InvalidArgument("row size does not fit in 32 bits"))?;
    Ok((row_size, coefficient_count_from_row_size(file_len, row_size)))
}

/// Layout of the rows that follow a header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub source_len: u64,
    pub row_size: u32,
    pub num_coefficients: usize,
    pub packed_bytes: usize,
}

impl Geometry {
    pub fn new(source_len: u64, row_size: u32) -> Self {
        let num_coefficients = coefficient_count_from_row_size(source_len, row_size) as usize;
        Self {
            source_len,
            row_size,
            num_coefficients,
            packed_bytes: packed_byte_count(num_coefficients),
        }
    }

    /// Packed coefficients + payload.
    pub fn block_size(&self) -> usize {
        self.packed_bytes + self.row_size as usize
    }

    pub fn row_offset(&self, row: usize) -> u64 {
        header_size() + (row as u64) * (self.block_size() as u64)
    }

    /// Whole rows in a file of `file_len` bytes. Trailing partial blocks are excluded.
    pub fn row_count(&self, file_len: u64) -> usize {
        if file_len < header_size() { return 0; }
        ((file_len - header_size()) / self.block_size() as u64) as usize
    }

    /// File length trimmed down to a whole-block boundary.
    pub fn block_aligned_len(&self, file_len: u64) -> u64 {
        self.row_offset(self.row_count(file_len))
    }

    /// Byte range of source chunk `index`; the last chunk may be short.
    pub fn chunk_len(&self, index: usize) -> usize {
        let start = index as u64 * self.row_size as u64;
        (self.source_len.saturating_sub(start)).min(self.row_size as u64) as usize
    }
}
