//! Generic IEEE 802.3 Clause 22 PHY
//!
//! Reads link state from BMSR and the resolved speed/duplex from BMCR. Works
//! for any PHY that reflects the negotiated mode in BMCR; PHYs that report
//! it only in a vendor status register need their own [`LinkSource`].

use crate::driver::config::{Duplex, Speed};
use crate::driver::error::{ConfigError, Result};
use crate::driver::link::LinkProperties;
use crate::hal::mdio::MdioBus;
use crate::internal::constants::MAX_PHY_ADDR;
use crate::internal::phy_regs::{BMCR, BMSR, Bmcr, Bmsr, PHYIDR1, PHYIDR2};
use crate::phy::LinkSource;

/// Clause 22 PHY at a fixed address on an MDIO bus
#[derive(Debug)]
pub struct GenericPhy<M: MdioBus> {
    mdio: M,
    addr: u8,
}

impl<M: MdioBus> GenericPhy<M> {
    /// Create a PHY handle at `addr` (0-31)
    pub fn new(mdio: M, addr: u8) -> Result<Self> {
        if addr > MAX_PHY_ADDR {
            return Err(ConfigError::InvalidPhyAddress.into());
        }
        Ok(Self { mdio, addr })
    }

    /// PHY address on the bus
    pub fn address(&self) -> u8 {
        self.addr
    }

    /// Borrow the underlying bus
    pub fn mdio(&mut self) -> &mut M {
        &mut self.mdio
    }

    /// Read the 32-bit PHY identifier (PHYIDR1 << 16 | PHYIDR2)
    pub fn phy_id(&mut self) -> Result<u32> {
        let high = self.mdio.read(self.addr, PHYIDR1)?;
        let low = self.mdio.read(self.addr, PHYIDR2)?;
        Ok((u32::from(high) << 16) | u32::from(low))
    }

    /// Check the link status bit.
    ///
    /// BMSR latches link failures low, so the first read clears a stale
    /// failure and the second reports the current state.
    pub fn is_link_up(&mut self) -> Result<bool> {
        self.mdio.read(self.addr, BMSR)?;
        let bmsr = Bmsr::from_bits_retain(self.mdio.read(self.addr, BMSR)?);
        Ok(bmsr.contains(Bmsr::LINK_STATUS))
    }
}

impl<M: MdioBus> LinkSource for GenericPhy<M> {
    fn read_link_status(&mut self) -> Result<LinkProperties> {
        if !self.is_link_up()? {
            return Ok(LinkProperties::default());
        }
        let bmcr = Bmcr::from_bits_retain(self.mdio.read(self.addr, BMCR)?);
        let speed = if bmcr.contains(Bmcr::SPEED_100) {
            Speed::Mbps100
        } else {
            Speed::Mbps10
        };
        let duplex = if bmcr.contains(Bmcr::DUPLEX_FULL) {
            Duplex::Full
        } else {
            Duplex::Half
        };
        Ok(LinkProperties::link_up(speed, duplex))
    }
}
