use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, Write};
use std::path::Path;

use fnt_core::{
    coefficient_count_from_row_size, derive_row_size, FntError, FntResult, FormatError,
    FountainHeader, Geometry, MAX_COEFFICIENTS,
};
use fnt_math::{packed, solve, xor_into, CoefficientMatrix};
use fnt_store::{Access, SlidingWindow, DEFAULT_MAP_SIZE};
use log::{debug, info, warn};
use sha2::{Digest, Sha256};

use crate::coefficients::{CoefficientsFactory, Entropy};
use crate::same_file;

pub const DEFAULT_COEFFICIENT_HINT: u32 = 1024;

/// How the source is cut into rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowSizing {
    /// Fixed payload size; the coefficient count follows from it.
    RowSize(u32),
    /// Target coefficient count; the row size is derived with bounded padding.
    CoefficientHint(u32),
}

impl Default for RowSizing {
    fn default() -> Self {
        RowSizing::CoefficientHint(DEFAULT_COEFFICIENT_HINT)
    }
}

/// What to do when the destination already exists.
pub enum Overwrite {
    Refuse,
    Replace,
    Ask(Box<dyn FnMut(&Path) -> bool>),
}

impl Overwrite {
    fn permits(&mut self, path: &Path) -> bool {
        match self {
            Overwrite::Refuse => false,
            Overwrite::Replace => true,
            Overwrite::Ask(confirm) => confirm(path),
        }
    }
}

pub struct EncodeOptions {
    pub systematic: bool,
    pub sizing: RowSizing,
    /// Exact number of rows to write. Takes precedence over `percent`.
    pub rows: Option<u32>,
    /// Redundancy over the coefficient count, in percent.
    pub percent: Option<f64>,
    pub overwrite: Overwrite,
    pub map_size: usize,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            systematic: false,
            sizing: RowSizing::default(),
            rows: None,
            percent: None,
            overwrite: Overwrite::Refuse,
            map_size: DEFAULT_MAP_SIZE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StopRule {
    Rows(usize),
    Solvable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeReport {
    pub header: FountainHeader,
    pub rows: usize,
}

impl EncodeReport {
    pub fn geometry(&self) -> Geometry {
        self.header.geometry()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodeOutcome {
    Encoded(EncodeReport),
    /// The destination existed and the overwrite policy declined.
    Skipped,
}

/// Resolves (row_size, coefficient_count) for a source of `source_len` bytes.
fn plan_rows(source_len: u64, sizing: RowSizing) -> FntResult<(u32, usize)> {
    let (row_size, n) = match sizing {
        RowSizing::RowSize(0) => return Err(FntError::InvalidArgument("row size must be positive")),
        RowSizing::RowSize(row_size) => {
            (row_size, coefficient_count_from_row_size(source_len, row_size))
        }
        RowSizing::CoefficientHint(0) => {
            return Err(FntError::InvalidArgument("coefficient count must be positive"))
        }
        RowSizing::CoefficientHint(hint) => derive_row_size(source_len, hint)?,
    };
    if n > MAX_COEFFICIENTS as u64 {
        return Err(FntError::InvalidArgument("coefficient count exceeds 65535"));
    }
    Ok((row_size, n as usize))
}

fn stop_rule(options: &EncodeOptions, num_coefficients: usize) -> FntResult<StopRule> {
    if let Some(rows) = options.rows {
        return Ok(StopRule::Rows(rows as usize));
    }
    if let Some(percent) = options.percent {
        if !percent.is_finite() || percent < 0.0 {
            return Err(FntError::InvalidArgument("percent must be a non-negative number"));
        }
        let extra = (num_coefficients as f64 * percent / 100.0).ceil() as usize;
        return Ok(StopRule::Rows(num_coefficients + extra));
    }
    Ok(StopRule::Solvable)
}

pub(crate) fn hash_source(file: &File) -> io::Result<[u8; 32]> {
    let mut hasher = Sha256::new();
    io::copy(&mut BufReader::new(file), &mut hasher)?;
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&hasher.finalize());
    Ok(hash)
}

/// Encodes `source` into a new fountain file at `destination`.
pub fn encode<E: Entropy>(
    source: &Path,
    destination: &Path,
    mut options: EncodeOptions,
    factory: &mut CoefficientsFactory<E>,
) -> FntResult<EncodeOutcome> {
    // 1. Source must exist and be non-empty
    if !source.is_file() {
        return Err(FntError::NotFound(source.to_path_buf()));
    }
    let source_file = File::open(source)?;
    let source_len = source_file.metadata()?.len();
    if source_len == 0 {
        return Err(FormatError::EmptySource.into());
    }

    // 2. Layout and stopping rule, before touching the destination
    let (row_size, n) = plan_rows(source_len, options.sizing)?;
    let stop = stop_rule(&options, n)?;

    if same_file(source, destination)? {
        return Err(FntError::InvalidArgument("source and destination are the same file"));
    }
    if destination.exists() && !options.overwrite.permits(destination) {
        warn!("{} exists, leaving it untouched", destination.display());
        return Ok(EncodeOutcome::Skipped);
    }

    // 3. Header
    let header = FountainHeader::new(hash_source(&source_file)?, source_len, row_size);
    let geometry = header.geometry();
    info!(
        "Encoding {} bytes as {} coefficients of {} bytes ({:?})",
        source_len, n, row_size, stop
    );

    let mut out = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(true)
        .open(destination)?;
    out.write_all(&header.to_bytes())?;

    // 4. Rows
    let written = match write_rows(&source_file, &out, &geometry, stop, &options, factory) {
        Ok(written) => written,
        Err(e) => {
            drop(out);
            let _ = fs::remove_file(destination);
            return Err(e);
        }
    };
    out.set_len(geometry.row_offset(written))?;
    out.sync_all()?;

    info!("Wrote {} rows to {}", written, destination.display());
    Ok(EncodeOutcome::Encoded(EncodeReport { header, rows: written }))
}

fn write_rows<E: Entropy>(
    source: &File,
    out: &File,
    geometry: &Geometry,
    stop: StopRule,
    options: &EncodeOptions,
    factory: &mut CoefficientsFactory<E>,
) -> FntResult<usize> {
    let n = geometry.num_coefficients;
    let block = geometry.block_size();

    // Auto mode grows the file a batch of `n` blocks at a time
    let mut capacity = match stop {
        StopRule::Rows(target) => target,
        StopRule::Solvable => n,
    };
    out.set_len(geometry.row_offset(capacity))?;

    let mut input = SlidingWindow::new(source, Access::Read, options.map_size);
    let mut output = SlidingWindow::new(out, Access::ReadWrite, options.map_size);
    let mut matrix = CoefficientMatrix::new(n);
    let mut written = 0;

    for coefficients in factory.generate(n, options.systematic) {
        if let StopRule::Rows(target) = stop {
            if written >= target { break; }
        }
        if written == capacity {
            capacity += n;
            debug!("growing to {} rows", capacity);
            out.set_len(geometry.row_offset(capacity))?;
        }

        let row = output.get_mut(geometry.row_offset(written), block)?;
        let (packed_row, payload) = row.split_at_mut(geometry.packed_bytes);
        packed::pack_into(&coefficients, packed_row);
        for (j, _) in coefficients.iter().enumerate().filter(|(_, c)| **c) {
            let offset = j as u64 * geometry.row_size as u64;
            xor_into(payload, input.get(offset, geometry.chunk_len(j))?);
        }
        written += 1;

        if stop == StopRule::Solvable {
            matrix.push_row(&coefficients)?;
            if written >= n && solve(&mut matrix)? { break; }
        }
    }

    output.flush()?;
    Ok(written)
}
