use std::fs::File;
use std::io;

use memmap2::{Mmap, MmapMut, MmapOptions};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read,
    ReadWrite,
}

/// One live mapping of a file region.
pub enum Mapping {
    Read(Mmap),
    Write(MmapMut),
}

impl Mapping {
    pub fn bytes(&self) -> &[u8] {
        match self {
            Mapping::Read(m) => &m[..],
            Mapping::Write(m) => &m[..],
        }
    }

    pub fn bytes_mut(&mut self) -> Option<&mut [u8]> {
        match self {
            Mapping::Read(_) => None,
            Mapping::Write(m) => Some(&mut m[..]),
        }
    }

    pub fn flush(&self) -> io::Result<()> {
        match self {
            Mapping::Read(_) => Ok(()),
            Mapping::Write(m) => m.flush(),
        }
    }
}

/// Maps `[offset, offset + len)`. `len` must be non-zero and inside the file.
pub fn map_region(file: &File, offset: u64, len: usize, access: Access) -> io::Result<Mapping> {
    let mut opts = MmapOptions::new();
    opts.offset(offset).len(len);
    // SAFETY: fountain files have a single writer, coordinated by the caller.
    // The mapping is owned by one window or cache slot and never escapes it.
    unsafe {
        match access {
            Access::Read => opts.map(file).map(Mapping::Read),
            Access::ReadWrite => opts.map_mut(file).map(Mapping::Write),
        }
    }
}

/// Writable mapping of `[offset, offset + len)`.
pub fn map_region_mut(file: &File, offset: u64, len: usize) -> io::Result<MmapMut> {
    // SAFETY: see `map_region`.
    unsafe { MmapOptions::new().offset(offset).len(len).map_mut(file) }
}
