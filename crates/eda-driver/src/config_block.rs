//! ASIC configuration block view
//!
//! A [`ConfigBlock`] is the shift-register configuration image of the ASICs
//! behind one DIF: a fixed-size byte range in the region, sized by a
//! [`ConfigLayout`]. Bytes are moved, never decoded.

use crate::error::{check_range, check_writable, RegionError, Result};
use crate::region::{MemoryRegion, RegionBytes};
use eda_chip::ConfigLayout;

/// Fixed-offset, fixed-capacity byte view over a configuration image.
#[derive(Clone, Copy)]
pub struct ConfigBlock<'r> {
    bytes: RegionBytes<'r>,
    offset: usize,
    capacity: usize,
    layout: ConfigLayout,
}

impl std::fmt::Debug for ConfigBlock<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigBlock")
            .field("offset", &format_args!("{:#x}", self.offset))
            .field("capacity", &self.capacity)
            .field("layout", &self.layout)
            .finish()
    }
}

impl<'r> ConfigBlock<'r> {
    /// Bind a configuration view at `offset` sized by `layout`.
    ///
    /// # Errors
    ///
    /// Returns an error if the layout capacity overflows `usize`, the region
    /// is read-only, or `offset + capacity` exceeds the region length.
    pub fn new<R: MemoryRegion + ?Sized>(
        region: &'r R,
        offset: usize,
        layout: ConfigLayout,
    ) -> Result<Self> {
        let capacity = layout
            .checked_capacity()
            .ok_or(RegionError::CapacityOverflow {
                header_len: layout.header_len,
                num_channels: layout.num_channels,
                bytes_per_channel: layout.bytes_per_channel,
            })?;
        let bytes = region.as_bytes();
        check_writable(bytes)?;
        check_range(offset, capacity, bytes.len())?;

        tracing::debug!(
            "ConfigBlock @ {offset:#x}: {} x {} bytes + {} header = {capacity} bytes",
            layout.num_channels,
            layout.bytes_per_channel,
            layout.header_len,
        );

        Ok(Self {
            bytes,
            offset,
            capacity,
            layout,
        })
    }

    /// Read the byte at `index` within the block.
    ///
    /// # Errors
    ///
    /// Returns [`RegionError::IndexOutOfRange`] if `index >= capacity`.
    pub fn read_byte(&self, index: usize) -> Result<u8> {
        if index >= self.capacity {
            return Err(RegionError::index_out_of_range(index, self.capacity));
        }
        // SAFETY: index < capacity checked above.
        Ok(unsafe { self.read_byte_unchecked(index) })
    }

    /// Read the byte at `index` without a bounds check.
    ///
    /// For tight loops that already know the index is in range; saves one
    /// comparison per byte over [`read_byte`](Self::read_byte).
    ///
    /// # Safety
    ///
    /// `index < self.capacity()`. An index past the block reads adjacent
    /// region memory or, past the region end, is undefined behaviour.
    #[inline]
    pub unsafe fn read_byte_unchecked(&self, index: usize) -> u8 {
        // SAFETY: offset + capacity <= region len (checked in new), and the
        // caller guarantees index < capacity.
        unsafe { self.bytes.read_u8_unchecked(self.offset + index) }
    }

    /// Copy a configuration payload into the block.
    ///
    /// Copies `min(payload.len(), capacity)` bytes starting at the block
    /// offset and returns that count. Excess input is dropped; callers
    /// detect truncation by comparing the count with `payload.len()`.
    ///
    /// The copy lands in program order: register accesses issued before
    /// the call are not moved after it, and those issued after are not
    /// moved before it.
    pub fn write_bulk(&self, payload: &[u8]) -> usize {
        let n = payload.len().min(self.capacity);
        if n < payload.len() {
            tracing::debug!(
                "ConfigBlock @ {:#x}: payload truncated from {} to {n} bytes",
                self.offset,
                payload.len()
            );
        }
        // SAFETY: offset + n <= offset + capacity <= region len.
        unsafe { self.bytes.copy_from_unchecked(self.offset, &payload[..n]) };
        n
    }

    /// Copy the start of the block into `buf`.
    ///
    /// Copies `min(buf.len(), capacity)` bytes and returns that count.
    pub fn read_bulk(&self, buf: &mut [u8]) -> usize {
        let n = buf.len().min(self.capacity);
        // SAFETY: offset + n <= offset + capacity <= region len.
        unsafe { self.bytes.copy_to_unchecked(self.offset, &mut buf[..n]) };
        n
    }

    /// Snapshot of the whole image.
    #[must_use]
    pub fn to_vec(&self) -> Vec<u8> {
        let mut out = vec![0u8; self.capacity];
        self.read_bulk(&mut out);
        out
    }

    /// Block size in bytes.
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Byte offset of the block in its region.
    pub const fn offset(&self) -> usize {
        self.offset
    }

    /// Layout the block was built with.
    pub const fn layout(&self) -> ConfigLayout {
        self.layout
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::HeapRegion;

    const SMALL: ConfigLayout = ConfigLayout::new(2, 3);

    #[test]
    fn capacity_from_layout() {
        let region = HeapRegion::new(64);
        let block = ConfigBlock::new(&region, 0, SMALL).unwrap();
        assert_eq!(block.capacity(), 10);
        assert_eq!(block.layout(), SMALL);
    }

    #[test]
    fn block_past_region_end() {
        let region = HeapRegion::new(64);
        assert!(ConfigBlock::new(&region, 54, SMALL).is_ok());
        let err = ConfigBlock::new(&region, 55, SMALL).unwrap_err();
        assert!(matches!(err, RegionError::OutOfRange { offset: 55, len: 10, limit: 64 }));
    }

    #[test]
    fn overflowing_layout_rejected() {
        let region = HeapRegion::new(64);
        let layout = ConfigLayout::new(usize::MAX, 2);
        assert!(matches!(
            ConfigBlock::new(&region, 0, layout),
            Err(RegionError::CapacityOverflow {
                header_len: 4,
                num_channels: usize::MAX,
                bytes_per_channel: 2,
            })
        ));
    }

    #[test]
    fn read_byte_checked() {
        let region = HeapRegion::new(32);
        let block = ConfigBlock::new(&region, 4, SMALL).unwrap();
        block.write_bulk(&[1, 2, 3]);
        assert_eq!(block.read_byte(2).unwrap(), 3);
        assert_eq!(block.read_byte(9).unwrap(), 0);
        assert!(matches!(
            block.read_byte(10),
            Err(RegionError::IndexOutOfRange { index: 10, len: 10 })
        ));
    }

    #[test]
    fn read_byte_unchecked_matches_checked() {
        let region = HeapRegion::new(32);
        let block = ConfigBlock::new(&region, 4, SMALL).unwrap();
        block.write_bulk(&[9, 8, 7, 6, 5, 4, 3, 2, 1, 0]);
        for i in 0..block.capacity() {
            // SAFETY: i < capacity
            let raw = unsafe { block.read_byte_unchecked(i) };
            assert_eq!(raw, block.read_byte(i).unwrap());
        }
    }

    #[test]
    fn write_bulk_short_payload() {
        let region = HeapRegion::new(16);
        let block = ConfigBlock::new(&region, 2, SMALL).unwrap();
        assert_eq!(block.write_bulk(&[0xaa, 0xbb]), 2);
        assert_eq!(&region.to_vec()[..5], &[0, 0, 0xaa, 0xbb, 0]);
        assert_eq!(block.write_bulk(&[]), 0);
    }

    #[test]
    fn bulk_load_then_trigger_register() {
        // Image load followed by a trigger word that overlaps its tail: the
        // final contents follow program order.
        let region = HeapRegion::new(16);
        let block = ConfigBlock::new(&region, 0, SMALL).unwrap();
        let trigger = crate::Register32::new(&region, 8).unwrap();

        trigger.write(0xffff_ffff);
        assert_eq!(block.write_bulk(&[7; 10]), 10);
        assert_eq!(trigger.read(), u32::from_ne_bytes([7, 7, 0xff, 0xff]));

        trigger.write(1);
        assert_eq!(&block.to_vec()[8..10], &1u32.to_ne_bytes()[..2]);
        assert_eq!(block.read_byte(7).unwrap(), 7);
    }

    #[test]
    fn read_bulk_and_snapshot() {
        let region = HeapRegion::new(16);
        let block = ConfigBlock::new(&region, 0, SMALL).unwrap();
        block.write_bulk(&[1, 2, 3, 4, 5, 6, 7, 8, 9, 10]);

        let mut head = [0u8; 4];
        assert_eq!(block.read_bulk(&mut head), 4);
        assert_eq!(head, [1, 2, 3, 4]);

        let mut big = [0u8; 20];
        assert_eq!(block.read_bulk(&mut big), 10);
        assert_eq!(block.to_vec(), vec![1, 2, 3, 4, 5, 6, 7, 8, 9, 10]);
    }
}
