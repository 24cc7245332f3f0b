//! DMA Engine
//!
//! Descriptor rings, the buffer arena and the three data paths that run over
//! them. All memory is statically allocated using const generics.
//!
//! # Architecture
//!
//! - [`DmaEngine`]: owns both rings, the buffers and the transmit counters
//! - [`DescriptorRing`]: fixed-length circular array of descriptor slots
//! - receive walk (`process_received`), transmit submission (`transmit`) and
//!   timestamp correlation (`process_completions`) are implemented on the
//!   engine in their own modules
//!
//! # Example
//!
//! ```ignore
//! use ph_stm32h7_mac::internal::dma::DmaEngine;
//!
//! // 4 RX and 4 TX descriptors, 1536 byte buffers
//! static DMA: DmaEngine<4, 4, 1536> = DmaEngine::new();
//! ```

pub mod descriptor;
mod completion;
mod engine;
mod receive;
mod ring;
mod status;
mod transmit;

#[cfg(test)]
pub(crate) mod sim;

pub use engine::DmaEngine;
pub(crate) use engine::Guard;
pub use ring::DescriptorRing;
pub use status::RingStatus;
