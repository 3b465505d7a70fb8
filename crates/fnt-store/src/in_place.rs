use std::fs::File;
use std::io::{Read, Seek, SeekFrom};

use fnt_core::{FntError, FntResult};
use fnt_math::{xor_into, GaussianProblem};

use crate::map::map_region_mut;

/// Coefficients and payload in two separate files, one byte per coefficient.
/// Row `r` lives at `r * num_coefficients` and `r * row_width` respectively.
pub struct InPlaceProblem<'a> {
    coefficients: &'a File,
    data: &'a File,
    num_coefficients: usize,
    row_width: usize,
    rows: usize,
}

impl<'a> InPlaceProblem<'a> {
    pub fn new(
        coefficients: &'a File,
        data: &'a File,
        num_coefficients: usize,
        row_width: usize,
    ) -> FntResult<Self> {
        if num_coefficients == 0 || row_width == 0 {
            return Err(FntError::InvalidArgument("empty rows"));
        }
        let rows = (data.metadata()?.len() / row_width as u64) as usize;
        Ok(Self { coefficients, data, num_coefficients, row_width, rows })
    }

    fn xor_region(file: &File, width: usize, from: usize, to: usize) -> FntResult<()> {
        let src = map_region_mut(file, (from * width) as u64, width)?;
        let mut dest = map_region_mut(file, (to * width) as u64, width)?;
        xor_into(&mut dest, &src);
        Ok(())
    }
}

impl GaussianProblem for InPlaceProblem<'_> {
    fn num_rows(&self) -> usize { self.rows }

    fn num_coefficients(&self) -> usize { self.num_coefficients }

    fn has_coefficient(&mut self, row: usize, coefficient: usize) -> FntResult<bool> {
        let address = (row * self.num_coefficients + coefficient) as u64;
        if address >= self.coefficients.metadata()?.len() { return Ok(false); }

        let mut f = self.coefficients;
        let mut byte = [0u8; 1];
        f.seek(SeekFrom::Start(address))?;
        f.read_exact(&mut byte)?;
        Ok(byte[0] > 0)
    }

    fn xor(&mut self, from: usize, to: usize) -> FntResult<()> {
        // Coefficients first, then the payload
        Self::xor_region(self.coefficients, self.num_coefficients, from, to)?;
        Self::xor_region(self.data, self.row_width, from, to)
    }
}
