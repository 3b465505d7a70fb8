use crate::{packed, GaussianProblem};
use fnt_core::{FntError, FntResult};

/// Coefficients-only problem held in memory. Payload is never materialised,
/// so solvability and step counts cost no I/O.
#[derive(Debug, Clone, Default)]
pub struct CoefficientMatrix {
    cols: usize,
    rows: Vec<Vec<bool>>,
}

impl CoefficientMatrix {
    pub fn new(num_coefficients: usize) -> Self {
        Self { cols: num_coefficients, rows: Vec::new() }
    }

    pub fn push_row(&mut self, coefficients: &[bool]) -> FntResult<()> {
        if coefficients.len() != self.cols {
            return Err(FntError::InvalidArgument("wrong number of coefficients"));
        }
        self.rows.push(coefficients.to_vec());
        Ok(())
    }

    pub fn push_packed(&mut self, packed_row: &[u8]) -> FntResult<()> {
        if packed_row.len() != packed::packed_byte_count(self.cols) {
            return Err(FntError::InvalidArgument("wrong packed coefficient length"));
        }
        let mut row = vec![false; self.cols];
        packed::unpack_into(packed_row, &mut row);
        self.rows.push(row);
        Ok(())
    }

    pub fn row(&self, r: usize) -> Option<&[bool]> {
        self.rows.get(r).map(|v| v.as_slice())
    }

    /// Runs elimination on a copy, leaving `self` untouched.
    pub fn is_solvable(&self) -> bool {
        if self.rows.len() < self.cols { return false; }
        let mut scratch = self.clone();
        // In-memory xor never fails
        crate::solve(&mut scratch).unwrap_or(false)
    }
}

impl GaussianProblem for CoefficientMatrix {
    fn num_rows(&self) -> usize { self.rows.len() }

    fn num_coefficients(&self) -> usize { self.cols }

    fn has_coefficient(&mut self, row: usize, coefficient: usize) -> FntResult<bool> {
        Ok(self.rows[row][coefficient])
    }

    fn xor(&mut self, from: usize, to: usize) -> FntResult<()> {
        if from == to { return Err(FntError::InvalidArgument("xor of a row into itself")); }
        let (src, dest) = if from < to {
            let (head, tail) = self.rows.split_at_mut(to);
            (&head[from], &mut tail[0])
        } else {
            let (head, tail) = self.rows.split_at_mut(from);
            (&tail[0], &mut head[to])
        };
        for (d, s) in dest.iter_mut().zip(src.iter()) {
            *d ^= *s;
        }
        Ok(())
    }
}
