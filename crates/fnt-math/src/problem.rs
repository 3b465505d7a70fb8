use fnt_core::FntResult;

/// An N-row x M-coefficient binary matrix, plus any payload tied to its rows.
///
/// The engine reaches storage only through this seam. Backings decide how a
/// row is addressed; none of them may reorder rows.
pub trait GaussianProblem {
    fn num_rows(&self) -> usize;

    fn num_coefficients(&self) -> usize;

    /// Whether row `row` has coefficient `coefficient` set.
    fn has_coefficient(&mut self, row: usize, coefficient: usize) -> FntResult<bool>;

    /// Row `to` ^= row `from`, coefficients and payload alike. `from != to`.
    fn xor(&mut self, from: usize, to: usize) -> FntResult<()>;
}

impl<P: GaussianProblem + ?Sized> GaussianProblem for &mut P {
    fn num_rows(&self) -> usize { (**self).num_rows() }
    fn num_coefficients(&self) -> usize { (**self).num_coefficients() }
    fn has_coefficient(&mut self, row: usize, coefficient: usize) -> FntResult<bool> {
        (**self).has_coefficient(row, coefficient)
    }
    fn xor(&mut self, from: usize, to: usize) -> FntResult<()> {
        (**self).xor(from, to)
    }
}

/// Counts every `xor` forwarded to the wrapped problem.
pub struct StepCounter<P> {
    inner: P,
    steps: u64,
}

impl<P: GaussianProblem> StepCounter<P> {
    pub fn new(inner: P) -> Self {
        Self { inner, steps: 0 }
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }
}

impl<P: GaussianProblem> GaussianProblem for StepCounter<P> {
    fn num_rows(&self) -> usize { self.inner.num_rows() }

    fn num_coefficients(&self) -> usize { self.inner.num_coefficients() }

    fn has_coefficient(&mut self, row: usize, coefficient: usize) -> FntResult<bool> {
        self.inner.has_coefficient(row, coefficient)
    }

    fn xor(&mut self, from: usize, to: usize) -> FntResult<()> {
        self.inner.xor(from, to)?;
        self.steps += 1;
        Ok(())
    }
}
