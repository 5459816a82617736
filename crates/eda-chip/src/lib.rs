//! Hardware model for the EDA DAQ board.
//!
//! This crate has **no dependencies** and **no hardware access**. It only
//! describes the silicon and IP cores the driver talks to: the register map
//! of the vendor streaming-FIFO core sitting on the FPGA Avalon bus, and the
//! layout of the ASIC configuration image loaded into shift-register memory.
//!
//! # Crate organisation
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`fifo`] | FIFO IP core register map (versioned table) and status/event bits |
//! | [`config`] | ASIC configuration image layout (header + per-ASIC payload) |

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod fifo;

pub use config::ConfigLayout;
pub use fifo::{FifoReg, FifoRegisterMap};
