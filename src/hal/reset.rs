//! Reset Controller HAL
//!
//! DMA software reset (DMAMR.SWR), which also resets the MAC and MTL logic.

use embedded_hal::delay::DelayNs;

use crate::driver::error::{ConfigError, ConfigResult};
use crate::internal::constants::{RESET_POLL_INTERVAL_US, SOFT_RESET_TIMEOUT_MS};
use crate::internal::register::RegisterAccess;
use crate::internal::register::dma::DmaRegs;

/// Reset controller for the Ethernet peripheral
#[derive(Debug)]
pub struct ResetController<'a, A: RegisterAccess, D: DelayNs> {
    regs: &'a A,
    delay: D,
    timeout_ms: u32,
}

impl<'a, A: RegisterAccess, D: DelayNs> ResetController<'a, A, D> {
    /// Create a reset controller with the default timeout
    pub fn new(regs: &'a A, delay: D) -> Self {
        Self::with_timeout(regs, delay, SOFT_RESET_TIMEOUT_MS)
    }

    /// Create a reset controller with a custom timeout
    pub fn with_timeout(regs: &'a A, delay: D, timeout_ms: u32) -> Self {
        Self {
            regs,
            delay,
            timeout_ms,
        }
    }

    /// Perform a software reset and wait for SWR to self-clear.
    ///
    /// The wait is bounded by the timeout; the PHY must be supplying the
    /// RMII/MII clocks or the reset never completes.
    pub fn soft_reset(&mut self) -> ConfigResult<()> {
        let dma = DmaRegs(self.regs);
        dma.start_reset();

        let max_iterations = (self.timeout_ms * 1000) / RESET_POLL_INTERVAL_US;
        for _ in 0..max_iterations {
            if dma.is_reset_complete() {
                return Ok(());
            }
            self.delay.delay_us(RESET_POLL_INTERVAL_US);
        }
        Err(ConfigError::ResetFailed)
    }

    /// Check if a reset is currently in progress
    pub fn is_reset_in_progress(&self) -> bool {
        !DmaRegs(self.regs).is_reset_complete()
    }

    /// Configured timeout
    pub fn timeout_ms(&self) -> u32 {
        self.timeout_ms
    }
}
