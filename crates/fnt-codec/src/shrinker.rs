use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use fnt_core::{FntResult, Geometry};
use fnt_math::{is_zero, solve};
use fnt_store::FountainFileProblem;
use log::info;

use crate::open_fountain;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShrinkReport {
    pub rows_before: usize,
    pub rows_after: usize,
    pub solvable: bool,
}

/// Reduces the rows in place and cuts off the trailing all-zero rows.
///
/// Row operations never change the span of the rows, so a file that
/// was solvable stays solvable with at most `num_coefficients` rows.
pub fn shrink(fountain: &Path) -> FntResult<ShrinkReport> {
    let (file, header) = open_fountain(fountain, true)?;
    let geometry = header.geometry();
    let rows_before = geometry.row_count(file.metadata()?.len());

    let solvable = {
        let mut problem = FountainFileProblem::new(&file, &header)?;
        solve(&mut problem)?
    };

    let rows_after = last_nonzero_row(&file, &geometry, rows_before)?.map_or(0, |row| row + 1);
    file.set_len(geometry.row_offset(rows_after))?;
    file.sync_all()?;

    info!("Shrunk {} from {} to {} rows", fountain.display(), rows_before, rows_after);
    Ok(ShrinkReport { rows_before, rows_after, solvable })
}

fn last_nonzero_row(file: &File, geometry: &Geometry, rows: usize) -> FntResult<Option<usize>> {
    let mut reader = file;
    let mut coefficients = vec![0u8; geometry.packed_bytes];
    for row in (0..rows).rev() {
        reader.seek(SeekFrom::Start(geometry.row_offset(row)))?;
        reader.read_exact(&mut coefficients)?;
        if !is_zero(&coefficients) {
            return Ok(Some(row));
        }
    }
    Ok(None)
}
