use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use fnt_core::{header_size, FntError, FntResult, FormatError, FountainHeader, Geometry};
use fnt_math::{solve, CoefficientMatrix, StepCounter};

use crate::read_header;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FountainSummary {
    pub file_len: u64,
    pub header: FountainHeader,
    /// Whole rows present after the header.
    pub rows: usize,
    pub solvable: bool,
    /// Row operations the elimination took, solvable or not.
    pub steps: u64,
}

impl FountainSummary {
    pub fn geometry(&self) -> Geometry {
        self.header.geometry()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FountainInfo {
    Missing,
    NotFountain(FormatError),
    Fountain(FountainSummary),
}

/// Reports on a fountain file without modifying it.
///
/// Only the coefficient part of each row is read; elimination runs on an
/// in-memory copy.
pub fn inspect(path: &Path) -> FntResult<FountainInfo> {
    if !path.is_file() {
        return Ok(FountainInfo::Missing);
    }
    let mut file = File::open(path)?;
    let header = match read_header(&mut file) {
        Ok(header) => header,
        Err(FntError::Format(e)) => return Ok(FountainInfo::NotFountain(e)),
        Err(e) => return Err(e),
    };

    let file_len = file.metadata()?.len();
    let geometry = header.geometry();
    let rows = geometry.row_count(file_len);

    let mut matrix = CoefficientMatrix::new(geometry.num_coefficients);
    let mut reader = BufReader::new(file);
    reader.seek(SeekFrom::Start(header_size()))?;
    let mut coefficients = vec![0u8; geometry.packed_bytes];
    for _ in 0..rows {
        reader.read_exact(&mut coefficients)?;
        matrix.push_packed(&coefficients)?;
        reader.seek_relative(geometry.row_size as i64)?;
    }

    let mut counter = StepCounter::new(matrix);
    let solvable = solve(&mut counter)?;
    Ok(FountainInfo::Fountain(FountainSummary {
        file_len,
        header,
        rows,
        solvable,
        steps: counter.steps(),
    }))
}
