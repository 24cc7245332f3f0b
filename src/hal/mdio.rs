//! MDIO (Management Data Input/Output) HAL
//!
//! Clause 22 PHY register access through the MAC's MDIO address and data
//! registers (MACMDIOAR / MACMDIODR).

use embedded_hal::delay::DelayNs;

use crate::driver::error::{ConfigError, IoError, Result};
use crate::internal::constants::{MAX_PHY_ADDR, MAX_PHY_REG};
use crate::internal::register::RegisterAccess;
use crate::internal::register::mac::{
    MACMDIOAR_CR_MASK, MACMDIOAR_GOC_READ, MACMDIOAR_GOC_SHIFT, MACMDIOAR_GOC_WRITE,
    MACMDIOAR_MB, MACMDIOAR_PA_MASK, MACMDIOAR_PA_SHIFT, MACMDIOAR_RDA_MASK,
    MACMDIOAR_RDA_SHIFT, MACMDIODR_MD_MASK, MacRegs,
};

/// Default MDIO operation timeout in microseconds
pub const MDIO_TIMEOUT_US: u32 = 1_000;

/// Busy poll interval in microseconds
const MDIO_POLL_US: u32 = 10;

// =============================================================================
// MDIO Bus Trait
// =============================================================================

/// Trait for MDIO bus operations
///
/// PHY logic is written against this trait so it can run over the MAC's
/// MDIO controller or a mock.
pub trait MdioBus {
    /// Read a PHY register
    fn read(&mut self, phy_addr: u8, reg_addr: u8) -> Result<u16>;

    /// Write a PHY register
    fn write(&mut self, phy_addr: u8, reg_addr: u8, value: u16) -> Result<()>;

    /// Check if the MDIO bus is busy
    fn is_busy(&self) -> bool;
}

// =============================================================================
// MDIO Controller
// =============================================================================

/// MDIO controller over the MAC registers.
///
/// The MDC clock range is programmed once by `Emac::init` and preserved on
/// every access.
#[derive(Debug)]
pub struct MdioController<'a, A: RegisterAccess, D: DelayNs> {
    regs: &'a A,
    delay: D,
    timeout_us: u32,
}

impl<'a, A: RegisterAccess, D: DelayNs> MdioController<'a, A, D> {
    /// Create a controller over `regs`
    pub fn new(regs: &'a A, delay: D) -> Self {
        Self {
            regs,
            delay,
            timeout_us: MDIO_TIMEOUT_US,
        }
    }

    /// Set the completion timeout
    #[must_use]
    pub fn with_timeout_us(mut self, timeout_us: u32) -> Self {
        self.timeout_us = timeout_us;
        self
    }

    fn mac(&self) -> MacRegs<'a, A> {
        MacRegs(self.regs)
    }

    fn check_addresses(phy_addr: u8, reg_addr: u8) -> Result<()> {
        if phy_addr > MAX_PHY_ADDR {
            return Err(ConfigError::InvalidPhyAddress.into());
        }
        if reg_addr > MAX_PHY_REG {
            return Err(ConfigError::InvalidConfig.into());
        }
        Ok(())
    }

    fn wait_not_busy(&mut self) -> Result<()> {
        let mut elapsed = 0u32;
        while self.mac().is_mdio_busy() {
            if elapsed >= self.timeout_us {
                return Err(IoError::Timeout.into());
            }
            self.delay.delay_us(MDIO_POLL_US);
            elapsed += MDIO_POLL_US;
        }
        Ok(())
    }

    /// Start an operation: keep CR, set PA/RDA/GOC and the busy bit
    fn start(&self, phy_addr: u8, reg_addr: u8, goc: u32) {
        let clock = self.mac().mdio_address() & MACMDIOAR_CR_MASK;
        let address = clock
            | ((u32::from(phy_addr) << MACMDIOAR_PA_SHIFT) & MACMDIOAR_PA_MASK)
            | ((u32::from(reg_addr) << MACMDIOAR_RDA_SHIFT) & MACMDIOAR_RDA_MASK)
            | (goc << MACMDIOAR_GOC_SHIFT)
            | MACMDIOAR_MB;
        self.mac().set_mdio_address(address);
    }
}

impl<A: RegisterAccess, D: DelayNs> MdioBus for MdioController<'_, A, D> {
    fn read(&mut self, phy_addr: u8, reg_addr: u8) -> Result<u16> {
        Self::check_addresses(phy_addr, reg_addr)?;
        if self.is_busy() {
            return Err(IoError::PhyError.into());
        }
        self.start(phy_addr, reg_addr, MACMDIOAR_GOC_READ);
        self.wait_not_busy()?;
        Ok((self.mac().mdio_data() & MACMDIODR_MD_MASK) as u16)
    }

    fn write(&mut self, phy_addr: u8, reg_addr: u8, value: u16) -> Result<()> {
        Self::check_addresses(phy_addr, reg_addr)?;
        if self.is_busy() {
            return Err(IoError::PhyError.into());
        }
        self.mac().set_mdio_data(u32::from(value));
        self.start(phy_addr, reg_addr, MACMDIOAR_GOC_WRITE);
        self.wait_not_busy()
    }

    fn is_busy(&self) -> bool {
        self.mac().is_mdio_busy()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
