//! Backing memory abstraction
//!
//! A [`MemoryRegion`] is one contiguous block of device-addressable memory:
//! a mapped BAR, a UIO window, or a heap buffer simulating one. Typed views
//! ([`Register32`](crate::Register32), [`ConfigBlock`](crate::ConfigBlock),
//! [`FifoControlBlock`](crate::FifoControlBlock)) borrow a region and never
//! own it.
//!
//! Every access goes straight to memory. Nothing is cached, merged or
//! reordered: on real hardware a read can have side effects (clear-on-read
//! event latches), so program order is the access order.

use crate::error::{check_range, check_writable, Result};
use std::cell::UnsafeCell;
use std::marker::PhantomData;
use std::ptr::NonNull;
use std::sync::atomic::{compiler_fence, Ordering};

/// Positioned access to a block of device memory.
///
/// Implementors provide [`len`](Self::len) and [`as_bytes`](Self::as_bytes);
/// the positioned read/write operations are derived from those and are
/// bounds-checked on every call.
pub trait MemoryRegion {
    /// Region length in bytes.
    fn len(&self) -> usize;

    /// Whether the region has zero length.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Raw handle over the full region.
    ///
    /// This is the escape hatch used by typed views to skip the per-access
    /// bounds check of [`read_at`](Self::read_at) / [`write_at`](Self::write_at).
    /// Views validate their range once at construction instead.
    fn as_bytes(&self) -> RegionBytes<'_>;

    /// Whether the region accepts writes.
    ///
    /// Typed views can only be built over writable regions; a read-only
    /// window is accessed through [`read_at`](Self::read_at) and the checked
    /// [`RegionBytes`] readers.
    fn is_writable(&self) -> bool {
        self.as_bytes().is_writable()
    }

    /// Copy `buf.len()` bytes starting at `offset` into `buf`.
    ///
    /// # Errors
    ///
    /// Returns [`RegionError::OutOfRange`](crate::RegionError::OutOfRange) if
    /// `offset + buf.len()` exceeds the region length.
    fn read_at(&self, offset: usize, buf: &mut [u8]) -> Result<usize> {
        let bytes = self.as_bytes();
        check_range(offset, buf.len(), bytes.len())?;
        tracing::trace!("read_at {offset:#x} len={}", buf.len());
        // SAFETY: range validated above.
        unsafe { bytes.copy_to_unchecked(offset, buf) };
        Ok(buf.len())
    }

    /// Copy `data` into the region starting at `offset`.
    ///
    /// # Errors
    ///
    /// Returns [`RegionError::ReadOnly`](crate::RegionError::ReadOnly) if the
    /// region is read-only, or
    /// [`RegionError::OutOfRange`](crate::RegionError::OutOfRange) if
    /// `offset + data.len()` exceeds the region length.
    fn write_at(&self, offset: usize, data: &[u8]) -> Result<usize> {
        let bytes = self.as_bytes();
        check_writable(bytes)?;
        check_range(offset, data.len(), bytes.len())?;
        tracing::trace!("write_at {offset:#x} len={}", data.len());
        // SAFETY: range validated above.
        unsafe { bytes.copy_from_unchecked(offset, data) };
        Ok(data.len())
    }
}

impl<R: MemoryRegion + ?Sized> MemoryRegion for &R {
    fn len(&self) -> usize {
        (**self).len()
    }

    fn as_bytes(&self) -> RegionBytes<'_> {
        (**self).as_bytes()
    }
}

impl MemoryRegion for RegionBytes<'_> {
    fn len(&self) -> usize {
        self.len
    }

    fn as_bytes(&self) -> RegionBytes<'_> {
        *self
    }
}

/// Raw, lifetime-bound handle over a region's bytes.
///
/// Carries the base address and length of the region; it cannot outlive the
/// region it was taken from. Checked accessors validate every offset; the
/// `*_unchecked` accessors leave bounds to the caller.
///
/// Word accesses at 4-byte-aligned addresses are single volatile `u32`
/// loads/stores. Misaligned word accesses fall back to four volatile byte
/// accesses in ascending address order. Bulk copies are fenced so they stay
/// in program order with respect to the volatile accesses around them.
#[derive(Clone, Copy)]
pub struct RegionBytes<'a> {
    ptr: NonNull<u8>,
    len: usize,
    writable: bool,
    _region: PhantomData<&'a UnsafeCell<[u8]>>,
}

impl std::fmt::Debug for RegionBytes<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegionBytes")
            .field("ptr", &format_args!("{:p}", self.ptr))
            .field("len", &self.len)
            .field("writable", &self.writable)
            .finish()
    }
}

impl<'a> RegionBytes<'a> {
    /// Build a handle from a base pointer and length.
    ///
    /// # Safety
    ///
    /// For the whole lifetime `'a`:
    /// - `ptr` must be valid for volatile reads of `len` bytes, and for
    ///   writes unless the handle is immediately marked
    ///   [`read_only`](Self::read_only);
    /// - the memory must tolerate writes through shared references (it is
    ///   either wrapped in `UnsafeCell` or is device memory no Rust reference
    ///   points into).
    pub const unsafe fn from_raw_parts(ptr: NonNull<u8>, len: usize) -> Self {
        Self {
            ptr,
            len,
            writable: true,
            _region: PhantomData,
        }
    }

    /// Mark the handle read-only: checked writers fail with
    /// [`RegionError::ReadOnly`](crate::RegionError::ReadOnly) and views
    /// refuse to bind.
    #[must_use]
    pub const fn read_only(self) -> Self {
        Self {
            writable: false,
            ..self
        }
    }

    /// Whether writes are permitted.
    pub const fn is_writable(&self) -> bool {
        self.writable
    }

    /// Region length in bytes.
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Whether the region has zero length.
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Read one byte.
    ///
    /// # Errors
    ///
    /// Returns an out-of-range error if `offset >= len`.
    pub fn read_u8(&self, offset: usize) -> Result<u8> {
        check_range(offset, 1, self.len)?;
        // SAFETY: range validated above.
        Ok(unsafe { self.read_u8_unchecked(offset) })
    }

    /// Write one byte.
    ///
    /// # Errors
    ///
    /// Returns an error if the handle is read-only or `offset >= len`.
    pub fn write_u8(&self, offset: usize, value: u8) -> Result<()> {
        check_writable(*self)?;
        check_range(offset, 1, self.len)?;
        // SAFETY: range validated above.
        unsafe { self.write_u8_unchecked(offset, value) };
        Ok(())
    }

    /// Read a native-endian 32-bit word.
    ///
    /// # Errors
    ///
    /// Returns an out-of-range error if `offset + 4 > len`.
    pub fn read_u32(&self, offset: usize) -> Result<u32> {
        check_range(offset, 4, self.len)?;
        // SAFETY: range validated above.
        Ok(unsafe { self.read_u32_unchecked(offset) })
    }

    /// Write a native-endian 32-bit word.
    ///
    /// # Errors
    ///
    /// Returns an error if the handle is read-only or `offset + 4 > len`.
    pub fn write_u32(&self, offset: usize, value: u32) -> Result<()> {
        check_writable(*self)?;
        check_range(offset, 4, self.len)?;
        // SAFETY: range validated above.
        unsafe { self.write_u32_unchecked(offset, value) };
        Ok(())
    }

    /// Read one byte without a bounds check.
    ///
    /// # Safety
    ///
    /// `offset < self.len()`.
    #[inline]
    pub unsafe fn read_u8_unchecked(&self, offset: usize) -> u8 {
        // SAFETY: caller guarantees offset < len; ptr valid for len bytes.
        unsafe { self.ptr.as_ptr().add(offset).read_volatile() }
    }

    /// Write one byte without a bounds check.
    ///
    /// # Safety
    ///
    /// `offset < self.len()` and the handle is writable.
    #[inline]
    pub unsafe fn write_u8_unchecked(&self, offset: usize, value: u8) {
        // SAFETY: caller guarantees offset < len; ptr valid for len bytes.
        unsafe { self.ptr.as_ptr().add(offset).write_volatile(value) }
    }

    /// Read a native-endian 32-bit word without a bounds check.
    ///
    /// # Safety
    ///
    /// `offset + 4 <= self.len()`.
    #[inline]
    pub unsafe fn read_u32_unchecked(&self, offset: usize) -> u32 {
        // SAFETY: caller guarantees offset + 4 <= len. The word path is taken
        // only when the address is aligned for u32.
        unsafe {
            let p = self.ptr.as_ptr().add(offset);
            let word = p.cast::<u32>();
            if word.is_aligned() {
                word.read_volatile()
            } else {
                let mut raw = [0u8; 4];
                for (i, b) in raw.iter_mut().enumerate() {
                    *b = p.add(i).read_volatile();
                }
                u32::from_ne_bytes(raw)
            }
        }
    }

    /// Write a native-endian 32-bit word without a bounds check.
    ///
    /// # Safety
    ///
    /// `offset + 4 <= self.len()` and the handle is writable.
    #[inline]
    pub unsafe fn write_u32_unchecked(&self, offset: usize, value: u32) {
        // SAFETY: caller guarantees offset + 4 <= len. The word path is taken
        // only when the address is aligned for u32.
        unsafe {
            let p = self.ptr.as_ptr().add(offset);
            let word = p.cast::<u32>();
            if word.is_aligned() {
                word.write_volatile(value);
            } else {
                for (i, b) in value.to_ne_bytes().into_iter().enumerate() {
                    p.add(i).write_volatile(b);
                }
            }
        }
    }

    /// Copy `src` into the region at `offset` without a bounds check.
    ///
    /// The copy is not reordered with volatile accesses issued before or
    /// after it.
    ///
    /// # Safety
    ///
    /// `offset + src.len() <= self.len()` and the handle is writable.
    pub unsafe fn copy_from_unchecked(&self, offset: usize, src: &[u8]) {
        compiler_fence(Ordering::SeqCst);
        // SAFETY: caller guarantees the range is in bounds. `src` is a Rust
        // slice and no slice ever points into the region, so they cannot
        // overlap. u8 has alignment 1.
        unsafe {
            let dst = self.ptr.as_ptr().add(offset);
            std::ptr::copy_nonoverlapping(src.as_ptr(), dst, src.len());
        }
        compiler_fence(Ordering::SeqCst);
    }

    /// Copy `dst.len()` bytes from the region at `offset` without a bounds check.
    ///
    /// Fenced like [`copy_from_unchecked`](Self::copy_from_unchecked).
    ///
    /// # Safety
    ///
    /// `offset + dst.len() <= self.len()`.
    pub unsafe fn copy_to_unchecked(&self, offset: usize, dst: &mut [u8]) {
        compiler_fence(Ordering::SeqCst);
        // SAFETY: as in copy_from_unchecked.
        unsafe {
            let src = self.ptr.as_ptr().add(offset);
            std::ptr::copy_nonoverlapping(src, dst.as_mut_ptr(), dst.len());
        }
        compiler_fence(Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{HeapRegion, RegionError};

    #[test]
    fn positioned_round_trip() {
        let region = HeapRegion::new(16);
        assert_eq!(region.write_at(4, &[1, 2, 3]).unwrap(), 3);

        let mut buf = [0u8; 5];
        assert_eq!(region.read_at(3, &mut buf).unwrap(), 5);
        assert_eq!(buf, [0, 1, 2, 3, 0]);
    }

    #[test]
    fn positioned_out_of_range() {
        let region = HeapRegion::new(16);
        let err = region.write_at(14, &[0; 3]).unwrap_err();
        assert!(matches!(err, RegionError::OutOfRange { offset: 14, len: 3, limit: 16 }));

        let mut buf = [0u8; 1];
        assert!(region.read_at(16, &mut buf).is_err());
        assert_eq!(region.read_at(16, &mut []).unwrap(), 0);
    }

    #[test]
    fn misaligned_word_access() {
        let region = HeapRegion::new(8);
        let bytes = region.as_bytes();
        bytes.write_u32(1, 0xdead_beef).unwrap();
        assert_eq!(bytes.read_u32(1).unwrap(), 0xdead_beef);

        let expected = 0xdead_beef_u32.to_ne_bytes();
        assert_eq!(&region.to_vec()[1..5], &expected);
        assert_eq!(region.to_vec()[0], 0);
        assert_eq!(region.to_vec()[5], 0);
    }

    #[test]
    fn checked_byte_access() {
        let region = HeapRegion::new(4);
        let bytes = region.as_bytes();
        bytes.write_u8(3, 0x7f).unwrap();
        assert_eq!(bytes.read_u8(3).unwrap(), 0x7f);
        assert!(bytes.read_u8(4).is_err());
        assert!(bytes.write_u32(1, 0).is_err());
    }

    #[test]
    fn bulk_copies_interleave_with_registers_in_program_order() {
        let region = HeapRegion::new(16);
        let bytes = region.as_bytes();

        region.write_at(0, &[0x11; 8]).unwrap();
        bytes.write_u32(4, 0xaabb_ccdd).unwrap();
        region.write_at(6, &[0x22, 0x22]).unwrap();
        bytes.write_u32(0, 0).unwrap();

        let mut expected = [0u8; 16];
        expected[4..8].copy_from_slice(&0xaabb_ccdd_u32.to_ne_bytes());
        expected[6..8].copy_from_slice(&[0x22, 0x22]);
        assert_eq!(region.to_vec(), expected);

        let mut buf = [0u8; 4];
        region.read_at(4, &mut buf).unwrap();
        assert_eq!(u32::from_ne_bytes(buf), bytes.read_u32(4).unwrap());
    }

    #[test]
    fn read_only_handle_rejects_writes() {
        let region = HeapRegion::from_bytes(&[1, 2, 3, 4]);
        let bytes = region.as_bytes().read_only();
        assert!(!bytes.is_writable());
        assert!(matches!(bytes.write_u8(0, 9), Err(RegionError::ReadOnly)));
        assert!(matches!(bytes.write_u32(0, 9), Err(RegionError::ReadOnly)));
        assert_eq!(bytes.read_u8(3).unwrap(), 4);
        assert_eq!(region.to_vec(), vec![1, 2, 3, 4]);
        assert!(region.is_writable());
    }

    #[test]
    fn borrowed_region_forwards() {
        let region = HeapRegion::new(8);
        let by_ref: &HeapRegion = &region;
        by_ref.write_at(0, &[9]).unwrap();
        assert_eq!(MemoryRegion::len(&by_ref), 8);
        assert_eq!(region.to_vec()[0], 9);
    }
}
