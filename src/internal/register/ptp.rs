//! IEEE 1588 Timestamp Unit Register Definitions
//!
//! System time, frequency addend, auxiliary snapshot and PPS output registers.
//! Several MACTSCR command bits are self-clearing: software sets them to
//! latch a value into the timestamp unit and polls until hardware clears them.

use super::{RegisterAccess, reg_ro, reg_rw};

// =============================================================================
// Register Offsets
// =============================================================================

/// Timestamp Control Register offset
pub const MACTSCR_OFFSET: usize = 0x0B00;
/// Sub-second Increment Register offset
pub const MACSSIR_OFFSET: usize = 0x0B04;
/// System Time Seconds Register offset
pub const MACSTSR_OFFSET: usize = 0x0B08;
/// System Time Nanoseconds Register offset
pub const MACSTNR_OFFSET: usize = 0x0B0C;
/// System Time Seconds Update Register offset
pub const MACSTSUR_OFFSET: usize = 0x0B10;
/// System Time Nanoseconds Update Register offset
pub const MACSTNUR_OFFSET: usize = 0x0B14;
/// Timestamp Addend Register offset
pub const MACTSAR_OFFSET: usize = 0x0B18;
/// Timestamp Status Register offset
pub const MACTSSR_OFFSET: usize = 0x0B20;
/// Auxiliary Control Register offset
pub const MACACR_OFFSET: usize = 0x0B40;
/// Auxiliary Timestamp Nanoseconds Register offset
pub const MACATSNR_OFFSET: usize = 0x0B48;
/// Auxiliary Timestamp Seconds Register offset
pub const MACATSSR_OFFSET: usize = 0x0B4C;
/// PPS Control Register offset
pub const MACPPSCR_OFFSET: usize = 0x0B70;
/// PPS Target Time Seconds Register offset
pub const MACPPSTTSR_OFFSET: usize = 0x0B80;
/// PPS Target Time Nanoseconds Register offset
pub const MACPPSTTNR_OFFSET: usize = 0x0B84;
/// PPS Interval Register offset
pub const MACPPSIR_OFFSET: usize = 0x0B88;
/// PPS Width Register offset
pub const MACPPSWR_OFFSET: usize = 0x0B8C;

// =============================================================================
// Timestamp Control Register (MACTSCR) Bits
// =============================================================================

/// Enable Timestamp
pub const MACTSCR_TSENA: u32 = 1 << 0;
/// Fine or Coarse Timestamp Update (1 = fine)
pub const MACTSCR_TSCFUPDT: u32 = 1 << 1;
/// Initialize Timestamp (self-clearing)
pub const MACTSCR_TSINIT: u32 = 1 << 2;
/// Update Timestamp (self-clearing)
pub const MACTSCR_TSUPDT: u32 = 1 << 3;
/// Update Addend Register (self-clearing)
pub const MACTSCR_TSADDREG: u32 = 1 << 5;
/// Timestamp Digital or Binary Rollover Control (1 = digital, 999_999_999 ns)
pub const MACTSCR_TSCTRLSSR: u32 = 1 << 9;
/// Enable PTP Packet Processing for Version 2 Format
pub const MACTSCR_TSVER2ENA: u32 = 1 << 10;
/// Enable Processing of PTP over Ethernet Packets
pub const MACTSCR_TSIPENA: u32 = 1 << 11;
/// Enable Processing of PTP Packets Sent over IPv4-UDP
pub const MACTSCR_TSIPV4ENA: u32 = 1 << 13;
/// Select PTP packets for Taking Snapshots shift (2 bits)
pub const MACTSCR_SNAPTYPSEL_SHIFT: u32 = 16;

/// Value written to MACTSCR when timestamping is enabled
pub const MACTSCR_ENABLE: u32 = (0b01 << MACTSCR_SNAPTYPSEL_SHIFT)
    | MACTSCR_TSIPV4ENA
    | MACTSCR_TSIPENA
    | MACTSCR_TSVER2ENA
    | MACTSCR_TSENA
    | MACTSCR_TSCTRLSSR;

// =============================================================================
// Sub-second increment, update and status fields
// =============================================================================

/// Sub-second Increment Value shift (8 bits)
pub const MACSSIR_SSINC_SHIFT: u32 = 16;
/// Sub-second Increment Value mask
pub const MACSSIR_SSINC_MASK: u32 = 0xFF << 16;

/// Add or Subtract Time (1 = subtract)
pub const MACSTNUR_ADDSUB: u32 = 1 << 31;

/// Number of Auxiliary Timestamp Snapshots shift (5 bits)
pub const MACTSSR_ATSNS_SHIFT: u32 = 25;
/// Number of Auxiliary Timestamp Snapshots mask (after shift)
pub const MACTSSR_ATSNS_MASK: u32 = 0x1F;

/// Auxiliary Snapshot FIFO Clear
pub const MACACR_ATSFC: u32 = 1 << 0;
/// Auxiliary Snapshot 0 Enable shift (channels 0-3 follow)
pub const MACACR_ATSEN_SHIFT: u32 = 4;

// =============================================================================
// PPS Control Register (MACPPSCR) Fields
// =============================================================================

/// Flexible PPS Output mode command field mask
pub const MACPPSCR_PPSCTRL_MASK: u32 = 0x0F;
/// Flexible PPS Output Mode Enable (pulse train mode)
pub const MACPPSCR_PPSEN0: u32 = 1 << 4;
/// Target Time Register Mode: no interrupt, start or stop PPS only
pub const MACPPSCR_TRGTMODSEL_NO_INTERRUPT: u32 = 0b11 << 5;
/// Command: start pulse train at the target time
pub const PPSCMD_START_PULSE_TRAIN: u32 = 0b0010;
/// Command: stop pulse train immediately
pub const PPSCMD_STOP_IMMEDIATELY: u32 = 0b0101;

// =============================================================================
// Register Block View
// =============================================================================

/// Timestamp unit register block view.
#[derive(Debug, Clone, Copy)]
pub struct PtpRegs<'a, A: RegisterAccess>(pub &'a A);

impl<A: RegisterAccess> PtpRegs<'_, A> {
    reg_rw!(control, set_control, MACTSCR_OFFSET, "Timestamp Control register");
    reg_rw!(subsecond_increment, set_subsecond_increment, MACSSIR_OFFSET, "Sub-second Increment register");
    reg_rw!(seconds_update, set_seconds_update, MACSTSUR_OFFSET, "System Time Seconds Update register");
    reg_rw!(nanoseconds_update, set_nanoseconds_update, MACSTNUR_OFFSET, "System Time Nanoseconds Update register");
    reg_rw!(addend, set_addend, MACTSAR_OFFSET, "Timestamp Addend register");
    reg_rw!(aux_control, set_aux_control, MACACR_OFFSET, "Auxiliary Control register");
    reg_rw!(pps_control, set_pps_control, MACPPSCR_OFFSET, "PPS Control register");
    reg_rw!(pps_target_seconds, set_pps_target_seconds, MACPPSTTSR_OFFSET, "PPS Target Time Seconds");
    reg_rw!(pps_target_nanoseconds, set_pps_target_nanoseconds, MACPPSTTNR_OFFSET, "PPS Target Time Nanoseconds");
    reg_rw!(pps_interval, set_pps_interval, MACPPSIR_OFFSET, "PPS Interval register");
    reg_rw!(pps_width, set_pps_width, MACPPSWR_OFFSET, "PPS Width register");

    reg_ro!(system_seconds, MACSTSR_OFFSET, "System Time Seconds");
    reg_ro!(system_nanoseconds, MACSTNR_OFFSET, "System Time Nanoseconds");
    reg_ro!(status, MACTSSR_OFFSET, "Timestamp Status register");
    reg_ro!(aux_nanoseconds, MACATSNR_OFFSET, "Auxiliary Timestamp Nanoseconds");
    reg_ro!(aux_seconds, MACATSSR_OFFSET, "Auxiliary Timestamp Seconds");

    /// Check whether any of `bits` is still set in MACTSCR
    #[inline(always)]
    pub fn control_pending(&self, bits: u32) -> bool {
        (self.0.read(MACTSCR_OFFSET) & bits) != 0
    }

    /// Check whether a PPS command is still being processed
    #[inline(always)]
    pub fn pps_command_pending(&self) -> bool {
        (self.0.read(MACPPSCR_OFFSET) & MACPPSCR_PPSCTRL_MASK) != 0
    }
}
