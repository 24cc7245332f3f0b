//! STM32H7 Ethernet MAC Driver
//!
//! A `no_std`, `no_alloc` driver for the Ethernet MAC and DMA of the STM32H7,
//! built on the Synopsys DesignWare Ethernet QoS IP core.
//!
//! The driver owns both descriptor rings and their buffers, delivers received
//! frames and transmit timestamps through a single [`EventHandler`], and
//! drives the IEEE 1588 timestamp unit through [`Ptp`].
//!
//! # Architecture
//!
//! 1. **Driver** ([`driver`]): [`Emac`], configuration, events, interrupt
//!    dispatch, link monitoring and the PTP clock
//! 2. **HAL** ([`hal`]): MDIO station management and the software reset
//! 3. **PHY** ([`phy`]): the [`LinkSource`] collaborator and a Clause 22
//!    [`GenericPhy`]
//!
//! Register access goes through [`RegisterAccess`]; [`Mmio`] is the volatile
//! hardware implementation.
//!
//! # Features
//!
//! - `defmt`: defmt formatting for public types and driver diagnostics
//! - `log`: warnings for dropped frames and stray interrupts via `log`
//! - `critical-section`: [`sync::CriticalSectionCell`] for sharing a handler
//!   with the interrupt
//!
//! # Example
//!
//! ```ignore
//! use ph_stm32h7_mac::{Emac, EmacConfig, LinkMonitor, Mmio, TxOptions};
//! use ph_stm32h7_mac::phy::GenericPhy;
//!
//! // Rings and buffers must be in DMA-accessible RAM (AXI SRAM or SRAM1-3)
//! #[unsafe(link_section = ".axisram")]
//! static EMAC: Emac<Mmio, 4, 4, 1536> = Emac::new(unsafe { Mmio::eth1() });
//!
//! let config = EmacConfig::new().with_mac_address([0x02, 0x00, 0x00, 0x12, 0x34, 0x56]);
//! EMAC.init(&config, &mut delay)?;
//!
//! let mut phy = GenericPhy::new(EMAC.mdio(&mut delay), 0)?;
//! let mut monitor = LinkMonitor::new();
//! monitor.poll(&EMAC, &mut phy, &mut handler)?;
//!
//! EMAC.start()?;
//! EMAC.transmit(&frame, TxOptions::new())?;
//! ```
//!
//! # Memory Requirements
//!
//! Each ring slot holds a 16-byte descriptor, its software extension and one
//! `BUF`-byte buffer; [`Emac::memory_usage`] reports the total for a given
//! instantiation.

#![no_std]
#![deny(missing_docs)]
#![allow(unsafe_code)]
#![deny(unsafe_op_in_unsafe_fn)]
// Clippy lint levels live here; thresholds and config are in Cargo.toml.
#![deny(clippy::correctness)]
#![warn(
    clippy::suspicious,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::cloned_instead_of_copied,
    clippy::explicit_iter_loop,
    clippy::implicit_clone,
    clippy::inconsistent_struct_constructor,
    clippy::manual_assert,
    clippy::manual_let_else,
    clippy::match_same_arms,
    clippy::needless_pass_by_value,
    clippy::semicolon_if_nothing_returned,
    clippy::uninlined_format_args,
    clippy::unnested_or_patterns,
    clippy::std_instead_of_core,
    clippy::std_instead_of_alloc,
    clippy::alloc_instead_of_core
)]
#![allow(
    clippy::mod_module_files,
    clippy::self_named_module_files,
    clippy::similar_names,
    clippy::too_many_arguments,
    clippy::struct_excessive_bools,
    clippy::fn_params_excessive_bools,
    clippy::type_complexity,
    clippy::must_use_candidate,
    clippy::assertions_on_constants,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss,
    clippy::cast_lossless,
    clippy::panic_in_result_fn,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::module_name_repetitions,
    clippy::wildcard_imports,
    clippy::items_after_statements
)]

// =============================================================================
// Modules
// =============================================================================

pub mod driver;
pub mod hal;
pub mod phy;

// Internal implementation details (pub(crate) only)
mod internal;

#[cfg(feature = "critical-section")]
#[cfg_attr(docsrs, doc(cfg(feature = "critical-section")))]
pub mod sync;

// Test utilities (only available during testing)
#[cfg(test)]
pub(crate) mod testing;

/// Frame, buffer, timing and PTP constants
pub mod constants {
    pub use crate::internal::constants::*;
}

// =============================================================================
// Re-exports
// =============================================================================

pub use driver::config::{DmaBurstLen, Duplex, EmacConfig, MdcClockRange, Speed, State};
pub use driver::emac::Emac;
pub use driver::error::{
    ConfigError, ConfigResult, DmaError, DmaResult, Error, IoError, IoResult, Result,
};
pub use driver::event::{
    Disposition, Event, EventHandler, RxFrame, TimestampCallback, TimestampRequest, TxOptions,
    TxTimestamp,
};
pub use driver::interrupt::InterruptStatus;
pub use driver::link::{LinkMonitor, LinkProperties};
pub use driver::ptp::{PpsFrequency, Ptp, TimeDirection, Timestamp};

pub use hal::{MdioBus, MdioController};
pub use internal::dma::RingStatus;
pub use internal::register::dma::DmaStatus;
pub use internal::register::{ETH_BASE, Mmio, RegisterAccess};
pub use phy::{GenericPhy, LinkSource};

/// Low-level register accessors for advanced use.
///
/// These are intentionally separated from the primary facade. Most users should
/// prefer the safe driver APIs instead of touching registers directly.
///
/// # Safety
///
/// Direct register access bypasses driver invariants. Use only if you fully
/// understand the Ethernet QoS hardware and accept responsibility for correct
/// sequencing and synchronization.
pub mod unsafe_registers {
    pub use crate::internal::register::dma::DmaRegs;
    pub use crate::internal::register::mac::MacRegs;
    pub use crate::internal::register::mtl::MtlRegs;
    pub use crate::internal::register::ptp::PtpRegs;
}
