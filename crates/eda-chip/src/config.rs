//! ASIC configuration image layout.
//!
//! The DIF board loads the slow-control configuration of its HardROC ASICs
//! from a single memory image: a 4-byte header followed by one fixed-size
//! shift-register payload per ASIC.
//!
//! ```text
//! 0x000  header (4 bytes)
//! 0x004  ASIC 0 payload (bytes_per_channel)
//! ...    ASIC n-1 payload
//! ```
//!
//! The bit-level meaning of a payload belongs to a higher layer.

/// Size of the image header in bytes.
pub const HEADER_LEN: usize = 4;

/// Number of HardROC ASICs chained on one DIF.
pub const HARDROC_COUNT: usize = 8;

/// Size of one HardROC configuration payload (872 bits).
pub const HARDROC_CFG_BYTES: usize = 109;

/// Shape of a configuration image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConfigLayout {
    /// Header length in bytes.
    pub header_len: usize,
    /// Number of per-channel payloads.
    pub num_channels: usize,
    /// Size of each payload in bytes.
    pub bytes_per_channel: usize,
}

impl ConfigLayout {
    /// Eight HardROCs, 109 bytes each.
    pub const HARDROC: Self = Self::new(HARDROC_COUNT, HARDROC_CFG_BYTES);

    /// Layout with the standard 4-byte header.
    #[must_use]
    pub const fn new(num_channels: usize, bytes_per_channel: usize) -> Self {
        Self {
            header_len: HEADER_LEN,
            num_channels,
            bytes_per_channel,
        }
    }

    /// Total image size, or `None` if it does not fit in `usize`.
    #[must_use]
    pub const fn checked_capacity(&self) -> Option<usize> {
        match self.num_channels.checked_mul(self.bytes_per_channel) {
            Some(body) => self.header_len.checked_add(body),
            None => None,
        }
    }

    /// Byte offset of channel `channel`'s payload inside the image, or `None`
    /// if the channel is out of range or the offset does not fit in `usize`.
    #[must_use]
    pub const fn channel_offset(&self, channel: usize) -> Option<usize> {
        if channel >= self.num_channels {
            return None;
        }
        match channel.checked_mul(self.bytes_per_channel) {
            Some(rel) => self.header_len.checked_add(rel),
            None => None,
        }
    }
}

impl Default for ConfigLayout {
    fn default() -> Self {
        Self::HARDROC
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hardroc_capacity() {
        assert_eq!(ConfigLayout::HARDROC.checked_capacity(), Some(4 + 8 * 109));
        assert_eq!(ConfigLayout::default(), ConfigLayout::HARDROC);
    }

    #[test]
    fn small_layout_capacity() {
        assert_eq!(ConfigLayout::new(8, 8).checked_capacity(), Some(68));
        assert_eq!(ConfigLayout::new(0, 8).checked_capacity(), Some(HEADER_LEN));
    }

    #[test]
    fn overflowing_layout() {
        assert_eq!(ConfigLayout::new(usize::MAX, 2).checked_capacity(), None);
    }

    #[test]
    fn channel_offsets() {
        let layout = ConfigLayout::new(8, 8);
        assert_eq!(layout.channel_offset(0), Some(4));
        assert_eq!(layout.channel_offset(7), Some(60));
        assert_eq!(layout.channel_offset(8), None);
    }

    #[test]
    fn overflowing_channel_offset() {
        let layout = ConfigLayout::new(usize::MAX, 2);
        assert_eq!(layout.channel_offset(usize::MAX - 1), None);
        assert_eq!(layout.channel_offset(3), Some(10));
    }
}
