#![forbid(unsafe_code)]

pub mod cache;
pub use cache::MostUsedCache;

use std::sync::Arc;
use spin::Mutex;
use zeroize::Zeroize;
use core::ops::{Deref, DerefMut};

/// Pool of equally sized coefficient buffers.
/// Buffers come back zeroed, so a lease always starts as the zero vector.
pub struct VectorPool {
    width: usize,
    pool: Mutex<Vec<Box<[bool]>>>,
}

pub struct VectorLease {
    buf: Option<Box<[bool]>>,
    pool: Arc<VectorPool>,
}

impl VectorPool {
    pub fn new(width: usize, capacity: usize) -> Arc<Self> {
        let mut pool = Vec::with_capacity(capacity);
        for _ in 0..capacity {
            pool.push(vec![false; width].into_boxed_slice());
        }
        Arc::new(Self { width, pool: Mutex::new(pool) })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Takes a pooled buffer, or allocates one if every buffer is leased.
    pub fn acquire(self: &Arc<Self>) -> VectorLease {
        let buf = self
            .pool
            .lock()
            .pop()
            .unwrap_or_else(|| vec![false; self.width].into_boxed_slice());
        VectorLease { buf: Some(buf), pool: self.clone() }
    }

    fn release(&self, buf: Box<[bool]>) {
        self.pool.lock().push(buf);
    }

    pub fn available(&self) -> usize {
        self.pool.lock().len()
    }
}

impl Deref for VectorLease {
    type Target = [bool];
    fn deref(&self) -> &[bool] {
        self.buf.as_deref().unwrap_or(&[])
    }
}

impl DerefMut for VectorLease {
    fn deref_mut(&mut self) -> &mut [bool] {
        self.buf.as_deref_mut().unwrap_or(&mut [])
    }
}

impl Drop for VectorLease {
    fn drop(&mut self) {
        if let Some(mut buf) = self.buf.take() {
            buf.zeroize();
            self.pool.release(buf);
        }
    }
}
