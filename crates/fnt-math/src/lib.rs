#![forbid(unsafe_code)]

//! GF(2) arithmetic for fountain rows: the XOR kernel, packed coefficient
//! vectors and the Gaussian elimination engine with its in-memory backings.

pub mod packed;
pub mod problem;
pub mod solver;
pub mod matrix;

pub use matrix::CoefficientMatrix;
pub use problem::{GaussianProblem, StepCounter};
pub use solver::solve;

const WORD: usize = core::mem::size_of::<u64>();

/// dest ^= src over the common prefix of both slices.
/// GF(2) addition of two rows; the only row operation the engine ever performs.
#[inline]
pub fn xor_into(dest: &mut [u8], src: &[u8]) {
    let len = dest.len().min(src.len());
    let (dest, src) = (&mut dest[..len], &src[..len]);

    let split = len - len % WORD;
    let (dest_words, dest_tail) = dest.split_at_mut(split);
    let (src_words, src_tail) = src.split_at(split);

    for (d, s) in dest_words.chunks_exact_mut(WORD).zip(src_words.chunks_exact(WORD)) {
        let mut a = [0u8; WORD];
        let mut b = [0u8; WORD];
        a.copy_from_slice(d);
        b.copy_from_slice(s);
        d.copy_from_slice(&(u64::from_ne_bytes(a) ^ u64::from_ne_bytes(b)).to_ne_bytes());
    }
    for (d, s) in dest_tail.iter_mut().zip(src_tail) {
        *d ^= *s;
    }
}

/// True when every byte is zero.
pub fn is_zero(bytes: &[u8]) -> bool {
    bytes.iter().all(|&b| b == 0)
}
