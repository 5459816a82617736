//! Drive a FIFO control block and load an ASIC configuration image
//!
//! Uses a heap region by default. Pass a device node (e.g. `/dev/uio0`) and
//! a window size to run against real hardware:
//!
//! ```text
//! cargo run -p eda-driver --example fifo_poll -- /dev/uio0 0x1000
//! ```

use anyhow::{Context, Result};
use eda_driver::chip::fifo::status;
use eda_driver::prelude::*;

const FIFO_BASE: usize = 0x000;
const CFG_BASE: usize = 0x400;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("eda_driver=debug")
        .init();

    let mut args = std::env::args().skip(1);
    match (args.next(), args.next()) {
        (Some(path), Some(len)) => {
            let len = parse_len(&len)?;
            let region = MmapRegion::open(&path, len)
                .with_context(|| format!("mapping {path}"))?;
            run(&region)
        }
        _ => run(&HeapRegion::new(0x1000)),
    }
}

fn parse_len(s: &str) -> Result<usize> {
    let n = match s.strip_prefix("0x") {
        Some(hex) => usize::from_str_radix(hex, 16)?,
        None => s.parse()?,
    };
    Ok(n)
}

fn run(region: &dyn MemoryRegion) -> Result<()> {
    let fifo = FifoControlBlock::new(region, FIFO_BASE, &FifoRegisterMap::ALTERA_AVALON_FIFO)?;

    fifo.write(FifoReg::AlmostFull, 0x3f0);
    fifo.write(FifoReg::AlmostEmpty, 0x10);
    fifo.write(FifoReg::IEnable, status::ALMOSTFULL | status::OVERFLOW);

    for reg in FifoReg::ALL {
        println!("{:<12} = {:#010x}", reg.name(), fifo.read(reg));
    }

    let st = fifo.read(FifoReg::Status);
    if st & status::EMPTY != 0 {
        println!("FIFO empty");
    }

    let cfg = ConfigBlock::new(region, CFG_BASE, ConfigLayout::HARDROC)?;
    let image = vec![0u8; cfg.capacity()];
    let n = cfg.write_bulk(&image);
    println!("Loaded {n} of {} configuration bytes", image.len());

    Ok(())
}
