//! 32-bit register view

use crate::error::{check_range, check_writable, Result};
use crate::region::{MemoryRegion, RegionBytes};

/// Width of a [`Register32`] in bytes.
pub const REGISTER_WIDTH: usize = 4;

/// One 32-bit hardware register at a fixed offset in a region.
///
/// Holds no value of its own: every [`read`](Self::read) and
/// [`write`](Self::write) goes to the region's bytes at
/// `[offset, offset + 4)`, native-endian. The range is checked once, at
/// construction, so the steady-state accessors carry no bounds check.
///
/// Offsets are expected to be 4-byte aligned but this is not enforced.
#[derive(Clone, Copy)]
pub struct Register32<'r> {
    bytes: RegionBytes<'r>,
    offset: usize,
}

// Debug must not read the register: reads can have side effects.
impl std::fmt::Debug for Register32<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Register32")
            .field("offset", &format_args!("{:#x}", self.offset))
            .finish()
    }
}

impl<'r> Register32<'r> {
    /// Bind a register view at `offset`.
    ///
    /// # Errors
    ///
    /// Returns [`RegionError::ReadOnly`](crate::RegionError::ReadOnly) if the
    /// region is read-only, or
    /// [`RegionError::OutOfRange`](crate::RegionError::OutOfRange) if
    /// `offset + 4` exceeds the region length.
    pub fn new<R: MemoryRegion + ?Sized>(region: &'r R, offset: usize) -> Result<Self> {
        Self::from_bytes(region.as_bytes(), offset)
    }

    pub(crate) fn from_bytes(bytes: RegionBytes<'r>, offset: usize) -> Result<Self> {
        check_writable(bytes)?;
        check_range(offset, REGISTER_WIDTH, bytes.len())?;
        tracing::trace!("Register32 @ {offset:#x}");
        Ok(Self { bytes, offset })
    }

    /// Read the register.
    #[inline]
    pub fn read(&self) -> u32 {
        // SAFETY: offset + 4 <= len was checked in from_bytes.
        unsafe { self.bytes.read_u32_unchecked(self.offset) }
    }

    /// Write the register.
    #[inline]
    pub fn write(&self, value: u32) {
        // SAFETY: offset + 4 <= len and writability were checked in from_bytes.
        unsafe { self.bytes.write_u32_unchecked(self.offset, value) }
    }

    /// Read, transform, write back. Returns the value written.
    ///
    /// Exactly one read followed by one write; not atomic with respect to
    /// the hardware or other threads.
    pub fn modify(&self, f: impl FnOnce(u32) -> u32) -> u32 {
        let value = f(self.read());
        self.write(value);
        value
    }

    /// Set the bits in `mask`.
    pub fn set_bits(&self, mask: u32) -> u32 {
        self.modify(|v| v | mask)
    }

    /// Clear the bits in `mask`.
    pub fn clear_bits(&self, mask: u32) -> u32 {
        self.modify(|v| v & !mask)
    }

    /// Byte offset of the register in its region.
    pub const fn offset(&self) -> usize {
        self.offset
    }
}
