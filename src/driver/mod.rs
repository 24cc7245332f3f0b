//! Core driver components for the STM32H7 Ethernet peripheral.
//!
//! - [`config`] - Configuration types and builder patterns
//! - [`error`] - Error types and result aliases
//! - [`emac`] - The driver instance: bring-up, data path, interrupt dispatch
//! - [`event`] - Events delivered to the application and transmit options
//! - [`interrupt`] - Status returned by the interrupt dispatcher
//! - [`link`] - Link state reporting
//! - [`ptp`] - IEEE 1588 timestamp unit control
//!
//! # Example
//!
//! ```ignore
//! use ph_stm32h7_mac::driver::{EmacConfig, MdcClockRange};
//!
//! let config = EmacConfig::new()
//!     .with_mac_address([0x02, 0x00, 0x00, 0x00, 0x00, 0x01])
//!     .with_mdc_clock(MdcClockRange::from_hclk(200_000_000));
//! ```

pub mod config;
pub mod emac;
pub mod error;
pub mod event;
pub mod interrupt;
pub mod link;
pub mod ptp;

pub use config::{DmaBurstLen, Duplex, EmacConfig, MdcClockRange, Speed, State};
pub use emac::Emac;
pub use error::{ConfigError, ConfigResult, DmaError, DmaResult, Error, IoError, IoResult, Result};
pub use event::{
    Disposition, Event, EventHandler, RxFrame, TimestampCallback, TimestampRequest, TxOptions,
    TxTimestamp,
};
pub use interrupt::InterruptStatus;
pub use link::{LinkMonitor, LinkProperties};
pub use ptp::{PpsFrequency, Ptp, TimeDirection, Timestamp};
