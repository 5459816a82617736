//! Error types for register access

use crate::region::RegionBytes;
use thiserror::Error;

/// Result type alias for register access operations
pub type Result<T> = std::result::Result<T, RegionError>;

/// Errors that can occur while building views over a memory region
#[derive(Debug, Error)]
pub enum RegionError {
    /// Byte range does not fit inside the backing region
    #[error("Range out of bounds: offset={offset:#x}, size={len}, limit={limit:#x}")]
    OutOfRange {
        /// Start of the requested range
        offset: usize,
        /// Length of the requested range
        len: usize,
        /// Length of the backing region
        limit: usize,
    },

    /// Index outside a view's addressable range
    #[error("Index {index} out of range (view has {len} entries)")]
    IndexOutOfRange {
        /// Requested index
        index: usize,
        /// Number of addressable entries
        len: usize,
    },

    /// Offset arithmetic overflowed `usize`
    #[error("Range arithmetic overflow: offset={offset:#x}, size={len}")]
    LayoutOverflow {
        /// Start of the requested range
        offset: usize,
        /// Length of the requested range
        len: usize,
    },

    /// Configuration layout size does not fit in `usize`
    #[error("Configuration layout overflows: {header_len} + {num_channels} x {bytes_per_channel} bytes")]
    CapacityOverflow {
        /// Header length in bytes
        header_len: usize,
        /// Number of per-channel payloads
        num_channels: usize,
        /// Size of each payload in bytes
        bytes_per_channel: usize,
    },

    /// Write attempted on a read-only region
    #[error("Memory region is read-only")]
    ReadOnly,

    /// Backing region has zero length
    #[error("Memory region is empty")]
    EmptyRegion,

    /// I/O error opening a backing file
    #[error("I/O error: {source}")]
    Io {
        /// Underlying I/O error
        #[from]
        source: std::io::Error,
    },

    /// Mapping the backing file failed
    #[error("Failed to map region: {reason}")]
    MapFailed {
        /// Reason for failure
        reason: String,
    },
}

impl RegionError {
    /// Create an out-of-range error
    pub const fn out_of_range(offset: usize, len: usize, limit: usize) -> Self {
        Self::OutOfRange { offset, len, limit }
    }

    /// Create an index-out-of-range error
    pub const fn index_out_of_range(index: usize, len: usize) -> Self {
        Self::IndexOutOfRange { index, len }
    }

    /// Create a map failed error
    pub fn map_failed(reason: impl Into<String>) -> Self {
        Self::MapFailed {
            reason: reason.into(),
        }
    }
}

/// Validate that `bytes` accepts writes.
pub(crate) fn check_writable(bytes: RegionBytes<'_>) -> Result<()> {
    if bytes.is_writable() {
        Ok(())
    } else {
        Err(RegionError::ReadOnly)
    }
}

/// Validate that `[offset, offset + len)` lies inside a region of `limit` bytes.
pub(crate) fn check_range(offset: usize, len: usize, limit: usize) -> Result<()> {
    let end = offset
        .checked_add(len)
        .ok_or(RegionError::LayoutOverflow { offset, len })?;
    if end > limit {
        return Err(RegionError::out_of_range(offset, len, limit));
    }
    Ok(())
}
