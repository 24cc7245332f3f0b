//! MAC Core Register Definitions
//!
//! Configuration, packet filter, MDIO station management and the primary MAC
//! address registers.

use super::{RegisterAccess, reg_bit_ops, reg_rw};

// =============================================================================
// Register Offsets
// =============================================================================

/// MAC Configuration Register offset
pub const MACCR_OFFSET: usize = 0x0000;
/// MAC Packet Filtering Register offset
pub const MACPFR_OFFSET: usize = 0x0008;
/// MDIO Address Register offset
pub const MACMDIOAR_OFFSET: usize = 0x0200;
/// MDIO Data Register offset
pub const MACMDIODR_OFFSET: usize = 0x0204;
/// MAC Address 0 High Register offset
pub const MACA0HR_OFFSET: usize = 0x0300;
/// MAC Address 0 Low Register offset
pub const MACA0LR_OFFSET: usize = 0x0304;

// =============================================================================
// MAC Configuration Register (MACCR) Bits
// =============================================================================

/// Receiver Enable
pub const MACCR_RE: u32 = 1 << 0;
/// Transmitter Enable
pub const MACCR_TE: u32 = 1 << 1;
/// Duplex Mode (1 = full duplex)
pub const MACCR_DM: u32 = 1 << 13;
/// Speed (1 = 100 Mbps, 0 = 10 Mbps)
pub const MACCR_FES: u32 = 1 << 14;
/// Checksum Offload - IPv4 header and TCP/UDP/ICMP payload checksum checking
pub const MACCR_IPC: u32 = 1 << 27;

// =============================================================================
// Packet Filter Register (MACPFR) Bits
// =============================================================================

/// Promiscuous Mode
pub const MACPFR_PR: u32 = 1 << 0;
/// Pass All Multicast
pub const MACPFR_PM: u32 = 1 << 4;
/// Hash or Perfect Filter
pub const MACPFR_HPF: u32 = 1 << 10;

// =============================================================================
// MDIO Address Register (MACMDIOAR) Bits
// =============================================================================

/// MII Busy
pub const MACMDIOAR_MB: u32 = 1 << 0;
/// MII Operation Command shift (2 bits)
pub const MACMDIOAR_GOC_SHIFT: u32 = 2;
/// MII Operation Command mask
pub const MACMDIOAR_GOC_MASK: u32 = 0b11 << 2;
/// Operation command for a register read
pub const MACMDIOAR_GOC_READ: u32 = 0b11;
/// Operation command for a register write
pub const MACMDIOAR_GOC_WRITE: u32 = 0b01;
/// CSR Clock Range shift (4 bits)
pub const MACMDIOAR_CR_SHIFT: u32 = 8;
/// CSR Clock Range mask
pub const MACMDIOAR_CR_MASK: u32 = 0xF << 8;
/// Register/Device Address shift (5 bits)
pub const MACMDIOAR_RDA_SHIFT: u32 = 16;
/// Register/Device Address mask
pub const MACMDIOAR_RDA_MASK: u32 = 0x1F << 16;
/// Physical Layer Address shift (5 bits)
pub const MACMDIOAR_PA_SHIFT: u32 = 21;
/// Physical Layer Address mask
pub const MACMDIOAR_PA_MASK: u32 = 0x1F << 21;

/// MDIO Data mask (16 bits)
pub const MACMDIODR_MD_MASK: u32 = 0xFFFF;

// =============================================================================
// Register Block View
// =============================================================================

/// MAC core register block view.
#[derive(Debug, Clone, Copy)]
pub struct MacRegs<'a, A: RegisterAccess>(pub &'a A);

impl<A: RegisterAccess> MacRegs<'_, A> {
    reg_rw!(config, set_config, MACCR_OFFSET, "MAC Configuration register");
    reg_rw!(packet_filter, set_packet_filter, MACPFR_OFFSET, "MAC Packet Filter register");
    reg_rw!(mdio_address, set_mdio_address, MACMDIOAR_OFFSET, "MDIO Address register");
    reg_rw!(mdio_data, set_mdio_data, MACMDIODR_OFFSET, "MDIO Data register");

    reg_bit_ops!(enable_tx, disable_tx, MACCR_OFFSET, MACCR_TE, "MAC transmitter", "Enable", "Disable");
    reg_bit_ops!(enable_rx, disable_rx, MACCR_OFFSET, MACCR_RE, "MAC receiver", "Enable", "Disable");

    /// Check whether the MDIO interface is busy
    #[inline(always)]
    pub fn is_mdio_busy(&self) -> bool {
        (self.0.read(MACMDIOAR_OFFSET) & MACMDIOAR_MB) != 0
    }

    /// Program the primary MAC address
    pub fn set_mac_address(&self, addr: &[u8; 6]) {
        let high = u32::from(addr[4]) | (u32::from(addr[5]) << 8);
        let low = u32::from(addr[0])
            | (u32::from(addr[1]) << 8)
            | (u32::from(addr[2]) << 16)
            | (u32::from(addr[3]) << 24);
        // The low word write latches the address, so the high word goes first
        self.0.write(MACA0HR_OFFSET, high);
        self.0.write(MACA0LR_OFFSET, low);
    }

    /// Read the primary MAC address
    #[must_use]
    pub fn mac_address(&self) -> [u8; 6] {
        let high = self.0.read(MACA0HR_OFFSET);
        let low = self.0.read(MACA0LR_OFFSET);
        [
            low as u8,
            (low >> 8) as u8,
            (low >> 16) as u8,
            (low >> 24) as u8,
            high as u8,
            (high >> 8) as u8,
        ]
    }

    /// Apply speed and duplex bits (FES/DM), preserving the rest of MACCR
    pub fn set_speed_duplex(&self, fast: bool, full_duplex: bool) {
        self.0.modify(MACCR_OFFSET, |mut v| {
            v &= !(MACCR_FES | MACCR_DM);
            if fast {
                v |= MACCR_FES;
            }
            if full_duplex {
                v |= MACCR_DM;
            }
            v
        });
    }
}
