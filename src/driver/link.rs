//! Link state reporting.
//!
//! [`LinkMonitor`] polls a [`LinkSource`] and reports up/down transitions
//! as [`Event::LinkChanged`], applying the negotiated speed and duplex to
//! the MAC when the link comes up.

#[cfg(feature = "defmt")]
use defmt::info;

use crate::driver::config::{Duplex, Speed};
use crate::driver::emac::Emac;
use crate::driver::error::Result;
use crate::driver::event::{Event, EventHandler};
use crate::internal::register::RegisterAccess;
use crate::phy::LinkSource;

/// Link state as reported by the PHY
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinkProperties {
    /// Link is established
    pub up: bool,
    /// Negotiated speed (meaningful when up)
    pub speed: Speed,
    /// Negotiated duplex (meaningful when up)
    pub duplex: Duplex,
}

impl LinkProperties {
    /// Link established at `speed` and `duplex`
    #[must_use]
    pub const fn link_up(speed: Speed, duplex: Duplex) -> Self {
        Self {
            up: true,
            speed,
            duplex,
        }
    }

    /// Link rate in Mbit/s
    #[must_use]
    pub const fn speed_mbps(&self) -> u32 {
        self.speed.mbps()
    }

    /// Check for full duplex
    #[must_use]
    pub const fn is_full_duplex(&self) -> bool {
        matches!(self.duplex, Duplex::Full)
    }
}

/// Tracks the last reported link state.
#[derive(Debug, Default)]
pub struct LinkMonitor {
    last: Option<LinkProperties>,
}

impl LinkMonitor {
    /// Create a monitor that reports on its first poll
    #[must_use]
    pub const fn new() -> Self {
        Self { last: None }
    }

    /// Last reported state, `None` before the first poll
    pub fn current(&self) -> Option<LinkProperties> {
        self.last
    }

    /// Read the link state and report a change.
    ///
    /// On the first poll, or when the link goes up or down, the new state is
    /// delivered as [`Event::LinkChanged`]; when it is up the speed and
    /// duplex are written to the MAC first. A link-down report carries the
    /// speed and duplex of the link that was lost. Returns whether a change
    /// was reported.
    pub fn poll<A, P, H, const RX: usize, const TX: usize, const BUF: usize>(
        &mut self,
        emac: &Emac<A, RX, TX, BUF>,
        phy: &mut P,
        handler: &mut H,
    ) -> Result<bool>
    where
        A: RegisterAccess,
        P: LinkSource + ?Sized,
        H: EventHandler + ?Sized,
    {
        let mut link = phy.read_link_status()?;
        if self.last.is_some_and(|last| last.up == link.up) {
            return Ok(false);
        }

        if link.up {
            emac.set_speed_duplex(link.speed, link.duplex);
        } else if let Some(last) = self.last {
            link.speed = last.speed;
            link.duplex = last.duplex;
        }
        #[cfg(feature = "defmt")]
        info!("link {}", link);
        self.last = Some(link);
        handler.on_event(Event::LinkChanged(link));
        Ok(true)
    }
}
