use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};

use fnt_core::{FntError, FntResult};
use fnt_math::{xor_into, GaussianProblem};
use fnt_mem::MostUsedCache;
use log::trace;
use memmap2::MmapMut;

use crate::map::map_region_mut;
use crate::DEFAULT_CACHE_SLOTS;

/// Writes one standalone slice: a `0xFF`/`0x00` byte per coefficient, then the payload.
pub fn write_slice(file: &mut File, coefficients: &[bool], data: &[u8]) -> FntResult<()> {
    file.set_len((coefficients.len() + data.len()) as u64)?;
    file.seek(SeekFrom::Start(0))?;
    let unpacked: Vec<u8> = coefficients.iter().map(|&c| if c { u8::MAX } else { 0 }).collect();
    file.write_all(&unpacked)?;
    file.write_all(data)?;
    Ok(())
}

/// One file per row, each laid out like `write_slice`. Whole files are mapped
/// through a bounded cache so only a few rows are resident at a time.
pub struct SegmentedProblem {
    files: Vec<File>,
    num_coefficients: usize,
    row_width: usize,
    maps: MostUsedCache<usize, MmapMut>,
}

impl SegmentedProblem {
    pub fn new(num_coefficients: usize, row_width: usize) -> Self {
        Self::with_cache_slots(num_coefficients, row_width, DEFAULT_CACHE_SLOTS)
    }

    pub fn with_cache_slots(num_coefficients: usize, row_width: usize, slots: usize) -> Self {
        Self {
            files: Vec::new(),
            num_coefficients,
            row_width,
            maps: MostUsedCache::with_disposer(slots.max(2), unmap_slice as fn(usize, MmapMut)),
        }
    }

    pub fn add(&mut self, file: File) -> FntResult<()> {
        if file.metadata()?.len() != (self.num_coefficients + self.row_width) as u64 {
            return Err(FntError::InvalidArgument("incorrect slice length"));
        }
        self.files.push(file);
        Ok(())
    }

    /// Payload of row `row` as it currently stands.
    pub fn read_payload(&self, row: usize) -> FntResult<Vec<u8>> {
        let mut f = &self.files[row];
        let mut buf = vec![0u8; self.row_width];
        f.seek(SeekFrom::Start(self.num_coefficients as u64))?;
        f.read_exact(&mut buf)?;
        Ok(buf)
    }
}

fn unmap_slice(row: usize, _map: MmapMut) {
    trace!("unmapping slice {}", row);
}

impl GaussianProblem for SegmentedProblem {
    fn num_rows(&self) -> usize { self.files.len() }

    fn num_coefficients(&self) -> usize { self.num_coefficients }

    fn has_coefficient(&mut self, row: usize, coefficient: usize) -> FntResult<bool> {
        let mut f = &self.files[row];
        let mut byte = [0u8; 1];
        f.seek(SeekFrom::Start(coefficient as u64))?;
        f.read_exact(&mut byte)?;
        Ok(byte[0] > 0)
    }

    fn xor(&mut self, from: usize, to: usize) -> FntResult<()> {
        let files = &self.files;
        let len = self.num_coefficients + self.row_width;
        let (src, dest) = self.maps.get_pair(&from, &to, |&r| -> FntResult<MmapMut> {
            trace!("mapping slice {}", r);
            Ok(map_region_mut(&files[r], 0, len)?)
        })?;
        xor_into(dest, src);
        Ok(())
    }
}
