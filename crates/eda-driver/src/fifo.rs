//! FIFO control block
//!
//! Six [`Register32`] views laid out per a [`FifoRegisterMap`]: LEVEL,
//! STATUS, EVENT, IENABLE, ALMOSTFULL, ALMOSTEMPTY. Pure addressing; the
//! values are never interpreted here.

use crate::error::{RegionError, Result};
use crate::region::MemoryRegion;
use crate::register::Register32;
use eda_chip::{FifoReg, FifoRegisterMap};

/// Control/status interface of one streaming FIFO core.
#[derive(Debug, Clone, Copy)]
pub struct FifoControlBlock<'r> {
    base: usize,
    regs: [Register32<'r>; FifoReg::COUNT],
}

impl<'r> FifoControlBlock<'r> {
    /// Bind the six registers of a FIFO core whose CSR slave starts at `base`.
    ///
    /// # Errors
    ///
    /// Returns an error if any register falls outside the region.
    pub fn new<R: MemoryRegion + ?Sized>(
        region: &'r R,
        base: usize,
        map: &FifoRegisterMap,
    ) -> Result<Self> {
        let bytes = region.as_bytes();
        let reg = |r: FifoReg| -> Result<Register32<'r>> {
            let offset = map
                .byte_offset(r)
                .and_then(|rel| rel.checked_add(base))
                .ok_or(RegionError::LayoutOverflow {
                    offset: base,
                    len: map.register_width,
                })?;
            Register32::from_bytes(bytes, offset)
        };

        let regs = [
            reg(FifoReg::Level)?,
            reg(FifoReg::Status)?,
            reg(FifoReg::Event)?,
            reg(FifoReg::IEnable)?,
            reg(FifoReg::AlmostFull)?,
            reg(FifoReg::AlmostEmpty)?,
        ];

        tracing::debug!("FifoControlBlock @ {base:#x} ({})", map.version);

        Ok(Self { base, regs })
    }

    /// Read register `index` (position in [`FifoReg::ALL`]).
    ///
    /// # Panics
    ///
    /// Panics if `index >= 6`.
    pub fn get(&self, index: usize) -> u32 {
        self.slot(index).read()
    }

    /// Write register `index` (position in [`FifoReg::ALL`]).
    ///
    /// # Panics
    ///
    /// Panics if `index >= 6`.
    pub fn set(&self, index: usize, value: u32) {
        self.slot(index).write(value);
    }

    /// Read register `index`, or fail if it is out of range.
    ///
    /// # Errors
    ///
    /// Returns [`RegionError::IndexOutOfRange`] if `index >= 6`.
    pub fn try_get(&self, index: usize) -> Result<u32> {
        self.regs
            .get(index)
            .map(Register32::read)
            .ok_or(RegionError::index_out_of_range(index, FifoReg::COUNT))
    }

    /// Write register `index`, or fail if it is out of range.
    ///
    /// # Errors
    ///
    /// Returns [`RegionError::IndexOutOfRange`] if `index >= 6`.
    pub fn try_set(&self, index: usize, value: u32) -> Result<()> {
        let reg = self
            .regs
            .get(index)
            .ok_or(RegionError::index_out_of_range(index, FifoReg::COUNT))?;
        reg.write(value);
        Ok(())
    }

    /// Read a register by name.
    pub fn read(&self, reg: FifoReg) -> u32 {
        self.regs[reg.index()].read()
    }

    /// Write a register by name.
    pub fn write(&self, reg: FifoReg, value: u32) {
        self.regs[reg.index()].write(value);
    }

    /// The underlying register view.
    pub const fn register(&self, reg: FifoReg) -> Register32<'r> {
        self.regs[reg as usize]
    }

    /// Base offset of the block in its region.
    pub const fn base(&self) -> usize {
        self.base
    }

    fn slot(&self, index: usize) -> &Register32<'r> {
        match self.regs.get(index) {
            Some(reg) => reg,
            None => panic!(
                "FIFO register index {index} out of range (block has {} registers)",
                FifoReg::COUNT
            ),
        }
    }
}
