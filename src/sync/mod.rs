//! Sharing a handler between thread mode and the Ethernet interrupt.
//!
//! Requires the `critical-section` feature; the implementation comes from
//! the HAL or runtime crate (e.g. `cortex-m` with `critical-section-single-core`).
//!
//! # Example
//!
//! ```ignore
//! use ph_stm32h7_mac::sync::CriticalSectionCell;
//!
//! static HANDLER: CriticalSectionCell<MyHandler> = CriticalSectionCell::new(MyHandler::new());
//!
//! #[interrupt]
//! fn ETH() {
//!     EMAC.on_interrupt(&mut &HANDLER);
//! }
//!
//! // thread mode
//! monitor.poll(&EMAC, &mut phy, &mut &HANDLER)?;
//! EMAC.process_received(&mut &HANDLER);
//! ```

mod primitives;

pub use primitives::CriticalSectionCell;
