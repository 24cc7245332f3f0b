//! MTL (MAC Transaction Layer) Register Definitions
//!
//! Queue operating modes for the single TX and RX queue.

use super::{RegisterAccess, reg_rw};

/// TX Queue Operating Mode Register offset
pub const MTLTQOMR_OFFSET: usize = 0x0D00;
/// RX Queue Operating Mode Register offset
pub const MTLRQOMR_OFFSET: usize = 0x0D30;

/// Transmit Store and Forward
pub const MTLTQOMR_TSF: u32 = 1 << 1;
/// TX Queue Enable field shift (2 bits, 0b10 = enabled)
pub const MTLTQOMR_TXQEN_SHIFT: u32 = 2;
/// TX Queue Enable value
pub const MTLTQOMR_TXQEN_ENABLED: u32 = 0b10 << 2;
/// TX Queue Size shift (in 256 byte blocks minus one)
pub const MTLTQOMR_TQS_SHIFT: u32 = 16;
/// TX Queue Size for 2048 bytes
pub const MTLTQOMR_TQS_2K: u32 = 0b111 << 16;

/// Receive Queue Store and Forward
pub const MTLRQOMR_RSF: u32 = 1 << 5;

/// Value written to MTLTQOMR during bring-up
pub const MTLTQOMR_DEFAULT: u32 = MTLTQOMR_TQS_2K | MTLTQOMR_TSF | MTLTQOMR_TXQEN_ENABLED;

/// MTL register block view.
#[derive(Debug, Clone, Copy)]
pub struct MtlRegs<'a, A: RegisterAccess>(pub &'a A);

impl<A: RegisterAccess> MtlRegs<'_, A> {
    reg_rw!(tx_queue_mode, set_tx_queue_mode, MTLTQOMR_OFFSET, "TX Queue Operating Mode");
    reg_rw!(rx_queue_mode, set_rx_queue_mode, MTLRQOMR_OFFSET, "RX Queue Operating Mode");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tx_queue_default_matches_hardware_layout() {
        assert_eq!(MTLTQOMR_DEFAULT, 0x0007_000A);
    }
}
