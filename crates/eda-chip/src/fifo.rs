//! Register map of the Altera Avalon streaming FIFO core.
//!
//! The core exposes its control/status interface as six consecutive 32-bit
//! words. Word indices come from `altera_avalon_fifo_regs.h`:
//!
//! ```text
//! word  byte  name          access  meaning
//! ────  ────  ────────────  ──────  ─────────────────────────────────────
//!  0    0x00  LEVEL         RO      current fill level (words)
//!  1    0x04  STATUS        RO      live condition flags
//!  2    0x08  EVENT         RW1C    latched event flags
//!  3    0x0c  IENABLE       RW      interrupt enable mask
//!  4    0x10  ALMOSTFULL    RW      almost-full threshold
//!  5    0x14  ALMOSTEMPTY   RW      almost-empty threshold
//! ```
//!
//! The order is part of the hardware contract and must not change.

/// The six registers of a FIFO control block, in register-map order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum FifoReg {
    /// Current FIFO fill count.
    Level = 0,
    /// Condition flags (see [`status`]).
    Status = 1,
    /// Latched event flags (see [`event`]). Hardware may clear on read.
    Event = 2,
    /// Interrupt enable mask (see [`ienable`]).
    IEnable = 3,
    /// Almost-full threshold level.
    AlmostFull = 4,
    /// Almost-empty threshold level.
    AlmostEmpty = 5,
}

impl FifoReg {
    /// Number of registers in a control block.
    pub const COUNT: usize = 6;

    /// All registers, in register-map order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Level,
        Self::Status,
        Self::Event,
        Self::IEnable,
        Self::AlmostFull,
        Self::AlmostEmpty,
    ];

    /// Position of this register in [`FifoReg::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Register for a position in [`FifoReg::ALL`], if in range.
    #[must_use]
    pub const fn from_index(index: usize) -> Option<Self> {
        if index < Self::COUNT {
            Some(Self::ALL[index])
        } else {
            None
        }
    }

    /// Register name as spelled in the vendor header.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Level => "LEVEL",
            Self::Status => "STATUS",
            Self::Event => "EVENT",
            Self::IEnable => "IENABLE",
            Self::AlmostFull => "ALMOSTFULL",
            Self::AlmostEmpty => "ALMOSTEMPTY",
        }
    }
}

/// Versioned table mapping each [`FifoReg`] to a word index.
///
/// Passed explicitly to the driver's control-block constructor so that
/// alternate layouts (other core revisions, test fixtures) can be swapped in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FifoRegisterMap {
    /// Human-readable revision tag.
    pub version: &'static str,
    /// Width of one register slot in bytes.
    pub register_width: usize,
    /// Word index of each register, indexed by [`FifoReg::index`].
    pub word_index: [usize; FifoReg::COUNT],
}

impl FifoRegisterMap {
    /// Layout of the Altera Avalon FIFO core CSR slave.
    pub const ALTERA_AVALON_FIFO: Self = Self {
        version: "altera_avalon_fifo",
        register_width: 4,
        word_index: [0, 1, 2, 3, 4, 5],
    };

    /// Byte offset of `reg` relative to the block base, or `None` if it does
    /// not fit in `usize`.
    #[must_use]
    pub const fn byte_offset(&self, reg: FifoReg) -> Option<usize> {
        self.word_index[reg.index()].checked_mul(self.register_width)
    }
}

impl Default for FifoRegisterMap {
    fn default() -> Self {
        Self::ALTERA_AVALON_FIFO
    }
}

/// STATUS register bit definitions.
pub mod status {
    /// FIFO is full.
    pub const FULL: u32 = 1 << 0;
    /// FIFO is empty.
    pub const EMPTY: u32 = 1 << 1;
    /// Fill level at or above the almost-full threshold.
    pub const ALMOSTFULL: u32 = 1 << 2;
    /// Fill level at or below the almost-empty threshold.
    pub const ALMOSTEMPTY: u32 = 1 << 3;
    /// Write attempted while full.
    pub const OVERFLOW: u32 = 1 << 4;
    /// Read attempted while empty.
    pub const UNDERFLOW: u32 = 1 << 5;
    /// All defined bits.
    pub const ALL: u32 = FULL | EMPTY | ALMOSTFULL | ALMOSTEMPTY | OVERFLOW | UNDERFLOW;
}

/// EVENT register bit definitions. Write 1 to clear.
pub mod event {
    pub use super::status::{
        ALL, ALMOSTEMPTY, ALMOSTFULL, EMPTY, FULL, OVERFLOW, UNDERFLOW,
    };
}

/// IENABLE register bit definitions.
pub mod ienable {
    pub use super::status::{
        ALL, ALMOSTEMPTY, ALMOSTFULL, EMPTY, FULL, OVERFLOW, UNDERFLOW,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn altera_layout_is_contiguous() {
        let map = FifoRegisterMap::ALTERA_AVALON_FIFO;
        let offsets: Vec<Option<usize>> =
            FifoReg::ALL.iter().map(|&r| map.byte_offset(r)).collect();
        assert_eq!(
            offsets,
            vec![Some(0x00), Some(0x04), Some(0x08), Some(0x0c), Some(0x10), Some(0x14)]
        );
    }

    #[test]
    fn oversized_word_index_has_no_offset() {
        let map = FifoRegisterMap {
            version: "test-huge",
            register_width: 4,
            word_index: [usize::MAX, 1, 2, 3, 4, 5],
        };
        assert_eq!(map.byte_offset(FifoReg::Level), None);
        assert_eq!(map.byte_offset(FifoReg::Status), Some(4));
    }

    #[test]
    fn index_round_trips_through_enum() {
        for (i, reg) in FifoReg::ALL.iter().enumerate() {
            assert_eq!(reg.index(), i);
            assert_eq!(FifoReg::from_index(i), Some(*reg));
        }
        assert_eq!(FifoReg::from_index(FifoReg::COUNT), None);
    }

    #[test]
    fn status_bits_distinct() {
        assert_eq!(status::ALL, 0x3f);
        assert_eq!(event::OVERFLOW, status::OVERFLOW);
        assert_eq!(ienable::EMPTY, 0x02);
    }

    #[test]
    fn default_map_is_altera() {
        assert_eq!(FifoRegisterMap::default(), FifoRegisterMap::ALTERA_AVALON_FIFO);
        assert_eq!(FifoReg::AlmostEmpty.name(), "ALMOSTEMPTY");
    }
}
