//! Heap-backed simulated device memory

use crate::region::{MemoryRegion, RegionBytes};
use std::cell::UnsafeCell;
use std::ptr::NonNull;

/// Zero-filled, word-aligned buffer used as a stand-in for a device window.
///
/// Storage is kept as 32-bit cells so the base address is aligned for
/// register accesses, matching a real BAR. Contents are mutated through
/// shared references, so the type is `Send` but not `Sync`.
pub struct HeapRegion {
    words: Box<[UnsafeCell<u32>]>,
    len: usize,
}

impl std::fmt::Debug for HeapRegion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeapRegion").field("len", &self.len).finish()
    }
}

impl HeapRegion {
    /// Allocate `len` zero bytes.
    #[must_use]
    pub fn new(len: usize) -> Self {
        let words = (0..len.div_ceil(4)).map(|_| UnsafeCell::new(0)).collect();
        tracing::debug!("Allocated heap region: {len} bytes");
        Self { words, len }
    }

    /// Allocate a region holding a copy of `data`.
    #[must_use]
    pub fn from_bytes(data: &[u8]) -> Self {
        let region = Self::new(data.len());
        // SAFETY: region is exactly data.len() bytes long.
        unsafe { region.as_bytes().copy_from_unchecked(0, data) };
        region
    }

    /// Snapshot of the current contents.
    #[must_use]
    pub fn to_vec(&self) -> Vec<u8> {
        let mut out = vec![0u8; self.len];
        // SAFETY: out is exactly len bytes long.
        unsafe { self.as_bytes().copy_to_unchecked(0, &mut out) };
        out
    }
}

impl MemoryRegion for HeapRegion {
    fn len(&self) -> usize {
        self.len
    }

    fn as_bytes(&self) -> RegionBytes<'_> {
        let ptr = NonNull::from(&*self.words).cast::<u8>();
        // SAFETY: the words slice spans at least len bytes and lives as long
        // as &self. Every cell is an UnsafeCell, so writes through the shared
        // borrow are permitted.
        unsafe { RegionBytes::from_raw_parts(ptr, self.len) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_region_is_zeroed() {
        let region = HeapRegion::new(10);
        assert_eq!(region.len(), 10);
        assert_eq!(region.to_vec(), vec![0u8; 10]);
    }

    #[test]
    fn from_bytes_copies() {
        let region = HeapRegion::from_bytes(&[1, 2, 3, 4, 5]);
        assert_eq!(region.to_vec(), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn empty_region() {
        let region = HeapRegion::new(0);
        assert!(region.is_empty());
        assert!(region.as_bytes().read_u8(0).is_err());
        assert!(region.to_vec().is_empty());
    }

    #[test]
    fn short_region_rejects_word() {
        let region = HeapRegion::new(3);
        let bytes = region.as_bytes();
        assert!(format!("{bytes:?}").contains("len: 3"));
        assert!(bytes.read_u32(0).is_err());
    }
}
