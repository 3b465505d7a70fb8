use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use fnt_core::{hash_to_hex, FntError, FntResult, Geometry};
use fnt_math::{solve, StepCounter};
use fnt_store::{Access, FountainFileProblem, SlidingWindow, DEFAULT_MAP_SIZE};
use log::{info, warn};
use sha2::{Digest, Sha256};

use crate::{open_fountain, same_file};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeOutcome {
    /// Source written and verified; `steps` row operations were needed.
    Decoded { steps: u64 },
    /// Too few independent rows. Nothing was written.
    NotSolvable,
}

/// Solves `fountain` in place and writes the recovered source to `destination`.
///
/// On a hash mismatch the destination is deleted and `FntError::Integrity` returned.
pub fn decode(fountain: &Path, destination: &Path) -> FntResult<DecodeOutcome> {
    let (file, header) = open_fountain(fountain, true)?;
    if same_file(fountain, destination)? {
        return Err(FntError::InvalidArgument("fountain and destination are the same file"));
    }
    let geometry = header.geometry();

    // 1. Reduce; rows 0..n become the source chunks
    let steps = {
        let mut problem = StepCounter::new(FountainFileProblem::new(&file, &header)?);
        if !solve(&mut problem)? {
            info!("{} is not solvable", fountain.display());
            return Ok(DecodeOutcome::NotSolvable);
        }
        problem.steps()
    };
    info!("Solved {} in {} steps", fountain.display(), steps);

    // 2. Stream out and verify
    match write_source(&file, &geometry, destination) {
        Ok(actual) if actual == header.source_hash => {
            info!("Decoded {} bytes to {}", header.source_len, destination.display());
            Ok(DecodeOutcome::Decoded { steps })
        }
        Ok(actual) => {
            warn!("SHA256 mismatch, removing {}", destination.display());
            fs::remove_file(destination)?;
            Err(FntError::Integrity {
                expected: hash_to_hex(&header.source_hash),
                actual: hash_to_hex(&actual),
            })
        }
        Err(e) => {
            let _ = fs::remove_file(destination);
            Err(e)
        }
    }
}

fn write_source(file: &File, geometry: &Geometry, destination: &Path) -> FntResult<[u8; 32]> {
    let mut window = SlidingWindow::new(file, Access::Read, DEFAULT_MAP_SIZE);
    let mut out = BufWriter::new(File::create(destination)?);
    let mut hasher = Sha256::new();

    for i in 0..geometry.num_coefficients {
        let offset = geometry.row_offset(i) + geometry.packed_bytes as u64;
        let chunk = window.get(offset, geometry.chunk_len(i))?;
        hasher.update(chunk);
        out.write_all(chunk)?;
    }
    out.flush()?;

    let mut hash = [0u8; 32];
    hash.copy_from_slice(&hasher.finalize());
    Ok(hash)
}
