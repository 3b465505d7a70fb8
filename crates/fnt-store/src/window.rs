use std::borrow::Borrow;
use std::fs::File;

use fnt_core::{FntError, FntResult};
use log::trace;

use crate::map::{map_region, Access, Mapping};

/// A single reusable mapping over part of a file.
///
/// Requests inside the mapped region are served without a system call. A
/// request outside it drops the current mapping (flushing it when writable)
/// and maps `max(count, min_map_size)` bytes from the requested offset,
/// clipped to the file length.
///
/// The window owns its file when given a `File` (closing it on drop) and
/// leaves it open when given a `&File`.
pub struct SlidingWindow<F: Borrow<File> = File> {
    file: F,
    access: Access,
    min_map_size: usize,
    mapping: Option<Mapping>,
    offset: u64,
    count: usize,
}

impl<F: Borrow<File>> SlidingWindow<F> {
    pub fn new(file: F, access: Access, min_map_size: usize) -> Self {
        Self {
            file,
            access,
            min_map_size: min_map_size.max(1),
            mapping: None,
            offset: 0,
            count: 0,
        }
    }

    pub fn get(&mut self, offset: u64, count: usize) -> FntResult<&[u8]> {
        match self.locate(offset, count)? {
            Some(start) => match &self.mapping {
                Some(m) => Ok(&m.bytes()[start..start + count]),
                None => Ok(&[]),
            },
            None => Ok(&[]),
        }
    }

    pub fn get_mut(&mut self, offset: u64, count: usize) -> FntResult<&mut [u8]> {
        if self.access != Access::ReadWrite { return Err(FntError::ReadOnly); }
        match self.locate(offset, count)? {
            Some(start) => match self.mapping.as_mut().and_then(|m| m.bytes_mut()) {
                Some(bytes) => Ok(&mut bytes[start..start + count]),
                None => Err(FntError::ReadOnly),
            },
            None => Ok(&mut []),
        }
    }

    /// Flushes the current mapping without releasing it.
    pub fn flush(&self) -> FntResult<()> {
        if let Some(m) = &self.mapping {
            m.flush()?;
        }
        Ok(())
    }

    /// Currently mapped `(offset, len)`, if any.
    pub fn mapped_range(&self) -> Option<(u64, usize)> {
        self.mapping.as_ref().map(|_| (self.offset, self.count))
    }

    /// Start of the request within the mapping, remapping if needed.
    /// `None` for empty requests, which never map.
    fn locate(&mut self, offset: u64, count: usize) -> FntResult<Option<usize>> {
        let end = offset + count as u64;
        if self.mapping.is_some() && offset >= self.offset && end <= self.offset + self.count as u64 {
            return Ok(Some((offset - self.offset) as usize));
        }

        let len = self.file.borrow().metadata()?.len();
        if end > len {
            return Err(FntError::OutOfRange { offset, count, len });
        }
        if count == 0 { return Ok(None); }

        self.release()?;
        let map_len = (len - offset).min(count.max(self.min_map_size) as u64) as usize;
        trace!("window remap [{}, {})", offset, offset + map_len as u64);
        self.mapping = Some(map_region(self.file.borrow(), offset, map_len, self.access)?);
        self.offset = offset;
        self.count = map_len;
        Ok(Some(0))
    }

    fn release(&mut self) -> FntResult<()> {
        if let Some(m) = self.mapping.take() {
            m.flush()?;
        }
        self.count = 0;
        Ok(())
    }
}

impl<F: Borrow<File>> Drop for SlidingWindow<F> {
    fn drop(&mut self) {
        let _ = self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn scratch(len: usize) -> File {
        let mut f = tempfile::tempfile().unwrap();
        let data: Vec<u8> = (0..len).map(|i| (i % 251) as u8).collect();
        f.write_all(&data).unwrap();
        f
    }

    #[test]
    fn serves_inner_requests_from_one_mapping() {
        let f = scratch(4096);
        let mut w = SlidingWindow::new(&f, Access::Read, 1024);
        assert_eq!(w.get(10, 4).unwrap(), &[10, 11, 12, 13]);
        assert_eq!(w.mapped_range(), Some((10, 1024)));

        // Inside the current region: no remap
        assert_eq!(w.get(500, 2).unwrap(), &[(500 % 251) as u8, (501 % 251) as u8]);
        assert_eq!(w.mapped_range(), Some((10, 1024)));

        // Outside: remap from the new offset
        w.get(2000, 1).unwrap();
        assert_eq!(w.mapped_range(), Some((2000, 1024)));
    }

    #[test]
    fn mapping_is_clipped_to_file_length() {
        let f = scratch(100);
        let mut w = SlidingWindow::new(&f, Access::Read, 1 << 20);
        w.get(90, 10).unwrap();
        assert_eq!(w.mapped_range(), Some((90, 10)));
    }

    #[test]
    fn out_of_range_is_rejected() {
        let f = scratch(100);
        let mut w = SlidingWindow::new(&f, Access::Read, 16);
        assert!(matches!(w.get(95, 10), Err(FntError::OutOfRange { len: 100, .. })));
        assert!(w.get(100, 0).unwrap().is_empty());
    }

    #[test]
    fn read_only_window_refuses_writes() {
        let f = scratch(100);
        let mut w = SlidingWindow::new(&f, Access::Read, 16);
        assert!(matches!(w.get_mut(0, 4), Err(FntError::ReadOnly)));
    }
}
