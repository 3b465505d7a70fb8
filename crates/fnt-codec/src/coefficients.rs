use std::sync::Arc;

use fnt_mem::{VectorLease, VectorPool};
use rand_chacha::ChaCha20Rng;
use rand_core::{RngCore, SeedableRng};

/// Source of independent unbiased bits and uniform integers.
pub trait Entropy {
    fn next_bit(&mut self) -> bool;
    fn next_index(&mut self) -> u32;
}

/// Adapts any `RngCore` into an `Entropy` source.
pub struct RngEntropy<R>(pub R);

impl<R: RngCore> Entropy for RngEntropy<R> {
    fn next_bit(&mut self) -> bool {
        self.0.next_u32() & 1 == 1
    }

    fn next_index(&mut self) -> u32 {
        self.0.next_u32()
    }
}

/// Leased buffers kept warm per generator; consumers drop each vector before pulling the next.
const POOL_DEPTH: usize = 2;

pub struct CoefficientsFactory<E> {
    entropy: E,
}

impl CoefficientsFactory<RngEntropy<rand::rngs::ThreadRng>> {
    pub fn from_thread_rng() -> Self {
        Self::new(RngEntropy(rand::thread_rng()))
    }
}

impl CoefficientsFactory<RngEntropy<ChaCha20Rng>> {
    /// Reproducible stream for a given seed.
    pub fn seeded(seed: u64) -> Self {
        Self::new(RngEntropy(ChaCha20Rng::seed_from_u64(seed)))
    }
}

impl<E: Entropy> CoefficientsFactory<E> {
    pub fn new(entropy: E) -> Self {
        Self { entropy }
    }

    /// Unbounded stream of coefficient vectors.
    ///
    /// With `systematic`, vector `i < num_coefficients` is the unit vector `e_i`.
    /// Every later vector is random and never all-zero.
    pub fn generate(&mut self, num_coefficients: usize, systematic: bool) -> Coefficients<'_, E> {
        Coefficients {
            entropy: &mut self.entropy,
            pool: VectorPool::new(num_coefficients, POOL_DEPTH),
            systematic_left: if systematic { num_coefficients } else { 0 },
            index: 0,
        }
    }
}

pub struct Coefficients<'a, E> {
    entropy: &'a mut E,
    pool: Arc<VectorPool>,
    systematic_left: usize,
    index: usize,
}

impl<E: Entropy> Iterator for Coefficients<'_, E> {
    type Item = VectorLease;

    fn next(&mut self) -> Option<VectorLease> {
        let width = self.pool.width();
        if width == 0 { return None; }

        // Leases come back zeroed
        let mut lease = self.pool.acquire();

        if self.systematic_left > 0 {
            lease[self.index] = true;
            self.index += 1;
            self.systematic_left -= 1;
            return Some(lease);
        }

        let mut any = false;
        for c in lease.iter_mut() {
            *c = self.entropy.next_bit();
            any |= *c;
        }
        if !any {
            lease[self.entropy.next_index() as usize % width] = true;
        }
        Some(lease)
    }
}
