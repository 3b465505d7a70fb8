use std::fs::File;

use fnt_core::{FntResult, FountainHeader, Geometry};
use fnt_math::{packed, xor_into, GaussianProblem};
use fnt_mem::MostUsedCache;
use memmap2::MmapMut;

use crate::map::{map_region, map_region_mut, Access, Mapping};
use crate::DEFAULT_CACHE_SLOTS;

/// Rows stored in place inside a fountain file, right after the header.
///
/// Coefficient lookups map only the packed-coefficient prefix of a row,
/// read-only. Row XORs map whole blocks (packed coefficients + payload)
/// writable. Each kind of mapping is held in its own small most-used cache.
pub struct FountainFileProblem<'a> {
    file: &'a File,
    geometry: Geometry,
    rows: usize,
    coefficients: MostUsedCache<usize, Mapping>,
    blocks: MostUsedCache<usize, MmapMut>,
}

impl<'a> FountainFileProblem<'a> {
    pub fn new(file: &'a File, header: &FountainHeader) -> FntResult<Self> {
        Self::with_cache_slots(file, header, DEFAULT_CACHE_SLOTS)
    }

    pub fn with_cache_slots(file: &'a File, header: &FountainHeader, slots: usize) -> FntResult<Self> {
        let geometry = header.geometry();
        let rows = geometry.row_count(file.metadata()?.len());
        Ok(Self {
            file,
            geometry,
            rows,
            coefficients: MostUsedCache::new(slots),
            blocks: MostUsedCache::new(slots.max(2)),
        })
    }
}

fn map_coefficients(file: &File, geometry: &Geometry, row: usize) -> FntResult<Mapping> {
    Ok(map_region(file, geometry.row_offset(row), geometry.packed_bytes, Access::Read)?)
}

fn map_block(file: &File, geometry: &Geometry, row: usize) -> FntResult<MmapMut> {
    Ok(map_region_mut(file, geometry.row_offset(row), geometry.block_size())?)
}

impl GaussianProblem for FountainFileProblem<'_> {
    fn num_rows(&self) -> usize { self.rows }

    fn num_coefficients(&self) -> usize { self.geometry.num_coefficients }

    fn has_coefficient(&mut self, row: usize, coefficient: usize) -> FntResult<bool> {
        let (file, geometry) = (self.file, self.geometry);
        let prefix = self.coefficients.get(&row, |&r| map_coefficients(file, &geometry, r))?;
        Ok(packed::is_set(prefix.bytes(), coefficient))
    }

    fn xor(&mut self, from: usize, to: usize) -> FntResult<()> {
        let (file, geometry) = (self.file, self.geometry);
        let (src, dest) = self.blocks.get_pair(&from, &to, |&r| map_block(file, &geometry, r))?;
        xor_into(dest, src);
        Ok(())
    }
}
