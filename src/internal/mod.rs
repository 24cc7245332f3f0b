//! Internal Implementation Details
//!
//! This module contains implementation details that are not part of the public API.
//! Types in this module may change without notice between minor versions.
//!
//! # Contents
//!
//! - [`register`]: Memory-mapped register definitions and the access trait
//! - [`constants`]: Internal constants and magic numbers
//! - [`dma`]: Descriptor rings, receive walk, transmit path, timestamp correlator
//! - [`phy_regs`]: IEEE 802.3 Clause 22 PHY register definitions

pub mod constants;
pub(crate) mod dma;
pub(crate) mod phy_regs;
pub mod register;
