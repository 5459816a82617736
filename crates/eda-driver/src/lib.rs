//! Register access layer for the EDA DAQ board.
//!
//! Higher-level acquisition code reads and writes hardware state (FPGA FIFO
//! controllers, ASIC configuration shift-registers) through typed views over
//! a flat byte region standing in for the device address space.
//!
//! # Layers
//!
//! ```text
//! FifoControlBlock ── six Register32 at base + i*4
//! Register32       ── one u32 word, range checked once
//! ConfigBlock      ── header + N × M byte configuration image
//!        │
//! MemoryRegion     ── HeapRegion (simulated) | MmapRegion (device / file)
//! ```
//!
//! Views borrow the region and cannot outlive it. Accesses are volatile,
//! in program order, and unsynchronized: one owner per device.
//!
//! # Quick start
//!
//! ```
//! use eda_driver::{ConfigBlock, FifoControlBlock, HeapRegion};
//! use eda_driver::chip::{ConfigLayout, FifoReg, FifoRegisterMap};
//!
//! # fn main() -> eda_driver::Result<()> {
//! let region = HeapRegion::new(1024);
//!
//! let fifo = FifoControlBlock::new(&region, 0, &FifoRegisterMap::ALTERA_AVALON_FIFO)?;
//! fifo.write(FifoReg::AlmostFull, 4000);
//! assert_eq!(fifo.get(FifoReg::AlmostFull.index()), 4000);
//!
//! let cfg = ConfigBlock::new(&region, 512, ConfigLayout::new(8, 8))?;
//! assert_eq!(cfg.write_bulk(&[0xff; 100]), 68);
//! assert_eq!(cfg.read_byte(67)?, 0xff);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod backends;
mod config_block;
mod error;
mod fifo;
mod region;
mod register;

/// Hardware model (re-exported from eda-chip).
pub use eda_chip as chip;

pub use backends::{HeapRegion, MmapRegion};
pub use config_block::ConfigBlock;
pub use error::{RegionError, Result};
pub use fifo::FifoControlBlock;
pub use region::{MemoryRegion, RegionBytes};
pub use register::{Register32, REGISTER_WIDTH};

/// Commonly used types.
pub mod prelude {
    pub use crate::chip::{ConfigLayout, FifoReg, FifoRegisterMap};
    pub use crate::{
        ConfigBlock, FifoControlBlock, HeapRegion, MemoryRegion, MmapRegion, Register32,
        RegionError, Result,
    };
}
