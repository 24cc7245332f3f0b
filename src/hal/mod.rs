//! Hardware Abstraction Layer
//!
//! Higher-level operations over the raw registers used during bring-up and
//! by PHY collaborators.
//!
//! # Modules
//!
//! - [`mdio`]: MDIO bus for PHY communication
//! - [`reset`]: Software reset of the Ethernet peripheral
//!
//! # Delay Integration
//!
//! All types that require delays use `embedded_hal::delay::DelayNs` directly.
//! Pass any delay implementation from your HAL (e.g. `cortex_m::delay::Delay`).

pub mod mdio;
pub mod reset;

// Re-export commonly used types
pub use mdio::{MdioBus, MdioController};
pub use reset::ResetController;
