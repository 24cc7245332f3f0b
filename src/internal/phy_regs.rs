//! IEEE 802.3 Clause 22 PHY Register Definitions
//!
//! Only the basic control and status registers are needed: the driver reads
//! link state, speed and duplex, and leaves vendor registers to the PHY
//! collaborator.

use bitflags::bitflags;

/// Basic Mode Control Register address
pub const BMCR: u8 = 0;
/// Basic Mode Status Register address
pub const BMSR: u8 = 1;
/// PHY Identifier 1 register address
pub const PHYIDR1: u8 = 2;
/// PHY Identifier 2 register address
pub const PHYIDR2: u8 = 3;

bitflags! {
    /// Basic Mode Control Register bits
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Bmcr: u16 {
        /// Soft reset (self-clearing)
        const RESET = 1 << 15;
        /// Loopback mode
        const LOOPBACK = 1 << 14;
        /// Speed select (100 Mbps if set)
        const SPEED_100 = 1 << 13;
        /// Auto-negotiation enable
        const AN_ENABLE = 1 << 12;
        /// Power down
        const POWER_DOWN = 1 << 11;
        /// Isolate PHY from the MII
        const ISOLATE = 1 << 10;
        /// Restart auto-negotiation (self-clearing)
        const AN_RESTART = 1 << 9;
        /// Full duplex
        const DUPLEX_FULL = 1 << 8;
    }
}

bitflags! {
    /// Basic Mode Status Register bits
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Bmsr: u16 {
        /// 100BASE-TX full duplex capable
        const TX_FD_CAPABLE = 1 << 14;
        /// 100BASE-TX half duplex capable
        const TX_HD_CAPABLE = 1 << 13;
        /// 10BASE-T full duplex capable
        const T10_FD_CAPABLE = 1 << 12;
        /// 10BASE-T half duplex capable
        const T10_HD_CAPABLE = 1 << 11;
        /// Auto-negotiation complete
        const AN_COMPLETE = 1 << 5;
        /// Remote fault detected
        const REMOTE_FAULT = 1 << 4;
        /// Auto-negotiation ability
        const AN_ABILITY = 1 << 3;
        /// Link status (latched low)
        const LINK_STATUS = 1 << 2;
        /// Jabber condition detected
        const JABBER_DETECT = 1 << 1;
        /// Extended register capabilities
        const EXT_CAPABLE = 1 << 0;
    }
}
