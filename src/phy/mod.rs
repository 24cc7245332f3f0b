//! PHY collaborator interface
//!
//! The driver never talks to a PHY on its own. Link state is pulled through
//! [`LinkSource`], which a board crate implements for its PHY, or which
//! [`GenericPhy`] implements for any Clause 22 PHY over an
//! [`MdioBus`](crate::hal::MdioBus).
//!
//! # Example
//!
//! ```ignore
//! use ph_stm32h7_mac::phy::GenericPhy;
//!
//! let mdio = emac.mdio(delay);
//! let mut phy = GenericPhy::new(mdio, 0)?;
//! monitor.poll(&emac, &mut phy, &mut handler)?;
//! ```

pub mod generic;

pub use generic::GenericPhy;

use crate::driver::error::Result;
use crate::driver::link::LinkProperties;

/// Source of the current link state
pub trait LinkSource {
    /// Read link up/down, speed and duplex
    fn read_link_status(&mut self) -> Result<LinkProperties>;
}

impl<T: LinkSource + ?Sized> LinkSource for &mut T {
    fn read_link_status(&mut self) -> Result<LinkProperties> {
        (**self).read_link_status()
    }
}
