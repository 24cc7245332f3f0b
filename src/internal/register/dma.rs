//! DMA Controller Register Definitions
//!
//! The DMA channel moves frames between the MTL queues and system memory using
//! descriptor rings. The STM32H7 has a single channel (channel 0).

use bitflags::bitflags;

use super::{RegisterAccess, reg_bit_check_clear, reg_bit_ops, reg_ro, reg_rw};

// =============================================================================
// Register Offsets
// =============================================================================

/// DMA Mode Register offset
pub const DMAMR_OFFSET: usize = 0x1000;
/// DMA System Bus Mode Register offset
pub const DMASBMR_OFFSET: usize = 0x1004;
/// Channel Control Register offset
pub const DMACCR_OFFSET: usize = 0x1100;
/// Channel Transmit Control Register offset
pub const DMACTCR_OFFSET: usize = 0x1104;
/// Channel Receive Control Register offset
pub const DMACRCR_OFFSET: usize = 0x1108;
/// Channel TX Descriptor List Address Register offset
pub const DMACTDLAR_OFFSET: usize = 0x1114;
/// Channel RX Descriptor List Address Register offset
pub const DMACRDLAR_OFFSET: usize = 0x111C;
/// Channel TX Descriptor Tail Pointer Register offset
pub const DMACTDTPR_OFFSET: usize = 0x1120;
/// Channel RX Descriptor Tail Pointer Register offset
pub const DMACRDTPR_OFFSET: usize = 0x1128;
/// Channel TX Descriptor Ring Length Register offset
pub const DMACTDRLR_OFFSET: usize = 0x112C;
/// Channel RX Descriptor Ring Length Register offset
pub const DMACRDRLR_OFFSET: usize = 0x1130;
/// Channel Interrupt Enable Register offset
pub const DMACIER_OFFSET: usize = 0x1134;
/// Channel Current Application Transmit Descriptor Register offset (read-only)
pub const DMACCATDR_OFFSET: usize = 0x1144;
/// Channel Current Application Receive Descriptor Register offset (read-only)
pub const DMACCARDR_OFFSET: usize = 0x114C;
/// Channel Status Register offset (write-1-to-clear)
pub const DMACSR_OFFSET: usize = 0x1160;

// =============================================================================
// DMA Mode Register (DMAMR) Bits
// =============================================================================

/// Software Reset - resets MAC and DMA logic, cleared automatically
pub const DMAMR_SWR: u32 = 1 << 0;

// =============================================================================
// Channel Control Register (DMACCR) Bits
// =============================================================================

/// Descriptor Skip Length shift (32-bit words skipped between descriptors)
pub const DMACCR_DSL_SHIFT: u32 = 18;
/// Descriptor Skip Length mask (3 bits)
pub const DMACCR_DSL_MASK: u32 = 0b111 << 18;
/// Largest representable descriptor skip length in words
pub const DMACCR_DSL_MAX: u32 = 0b111;

// =============================================================================
// Channel Transmit Control Register (DMACTCR) Bits
// =============================================================================

/// Start or Stop Transmission Command
pub const DMACTCR_ST: u32 = 1 << 0;
/// Operate on Second Packet
pub const DMACTCR_OSF: u32 = 1 << 4;
/// Transmit Programmable Burst Length shift
pub const DMACTCR_TPBL_SHIFT: u32 = 16;
/// Transmit Programmable Burst Length mask
pub const DMACTCR_TPBL_MASK: u32 = 0x3F << 16;

// =============================================================================
// Channel Receive Control Register (DMACRCR) Bits
// =============================================================================

/// Start or Stop Receive
pub const DMACRCR_SR: u32 = 1 << 0;
/// Receive Buffer Size shift (bits 14:1)
pub const DMACRCR_RBSZ_SHIFT: u32 = 1;
/// Receive Buffer Size mask
pub const DMACRCR_RBSZ_MASK: u32 = 0x3FFF << 1;
/// Receive Programmable Burst Length shift
pub const DMACRCR_RPBL_SHIFT: u32 = 16;
/// Receive Programmable Burst Length mask
pub const DMACRCR_RPBL_MASK: u32 = 0x3F << 16;

/// Ring length registers hold `len - 1` in 10 bits
pub const RING_LEN_MASK: u32 = 0x3FF;

// =============================================================================
// Channel Status (DMACSR) / Interrupt Enable (DMACIER)
// =============================================================================

bitflags! {
    /// Channel status flags (DMACSR).
    ///
    /// Every flag is write-1-to-clear. DMACIER uses the same bit positions for
    /// the matching enables, so the same type describes both registers.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct DmaStatus: u32 {
        /// Transmit Interrupt - a frame with IOC set was transmitted
        const TI = 1 << 0;
        /// Transmit Process Stopped
        const TPS = 1 << 1;
        /// Transmit Buffer Unavailable
        const TBU = 1 << 2;
        /// Receive Interrupt - a frame was received into a descriptor with IOC
        const RI = 1 << 6;
        /// Receive Buffer Unavailable
        const RBU = 1 << 7;
        /// Receive Process Stopped
        const RPS = 1 << 8;
        /// Receive Watchdog Timeout
        const RWT = 1 << 9;
        /// Early Transmit Interrupt
        const ETI = 1 << 10;
        /// Early Receive Interrupt
        const ERI = 1 << 11;
        /// Fatal Bus Error
        const FBE = 1 << 12;
        /// Context Descriptor Error
        const CDE = 1 << 13;
        /// Abnormal Interrupt Summary
        const AIS = 1 << 14;
        /// Normal Interrupt Summary
        const NIS = 1 << 15;
    }
}

impl DmaStatus {
    /// Causes summarized by the abnormal summary bit
    pub const ABNORMAL: Self = Self::TPS
        .union(Self::TBU)
        .union(Self::RBU)
        .union(Self::RPS)
        .union(Self::RWT)
        .union(Self::ETI)
        .union(Self::FBE)
        .union(Self::CDE);

    /// Conditions that indicate lost traffic or a halted channel
    pub const ERRORS: Self = Self::TPS
        .union(Self::RBU)
        .union(Self::RPS)
        .union(Self::FBE)
        .union(Self::CDE);
}

/// Interrupt enables written to DMACIER by `start()`
pub const DMACIER_DEFAULT: DmaStatus = DmaStatus::NIS.union(DmaStatus::RI).union(DmaStatus::TI);

// =============================================================================
// Register Block View
// =============================================================================

/// DMA register block view over a register accessor.
#[derive(Debug, Clone, Copy)]
pub struct DmaRegs<'a, A: RegisterAccess>(pub &'a A);

impl<A: RegisterAccess> DmaRegs<'_, A> {
    reg_rw!(mode, set_mode, DMAMR_OFFSET, "DMA Mode register");
    reg_rw!(channel_control, set_channel_control, DMACCR_OFFSET, "Channel Control register");
    reg_rw!(tx_control, set_tx_control, DMACTCR_OFFSET, "Channel TX Control register");
    reg_rw!(rx_control, set_rx_control, DMACRCR_OFFSET, "Channel RX Control register");
    reg_rw!(tx_desc_list_addr, set_tx_desc_list_addr, DMACTDLAR_OFFSET, "TX Descriptor List Address");
    reg_rw!(rx_desc_list_addr, set_rx_desc_list_addr, DMACRDLAR_OFFSET, "RX Descriptor List Address");
    reg_rw!(tx_tail_pointer, set_tx_tail_pointer, DMACTDTPR_OFFSET, "TX Descriptor Tail Pointer");
    reg_rw!(rx_tail_pointer, set_rx_tail_pointer, DMACRDTPR_OFFSET, "RX Descriptor Tail Pointer");
    reg_rw!(tx_ring_length, set_tx_ring_length, DMACTDRLR_OFFSET, "TX Descriptor Ring Length");
    reg_rw!(rx_ring_length, set_rx_ring_length, DMACRDRLR_OFFSET, "RX Descriptor Ring Length");

    reg_ro!(current_tx_desc, DMACCATDR_OFFSET, "Current Application TX Descriptor address");
    reg_ro!(current_rx_desc, DMACCARDR_OFFSET, "Current Application RX Descriptor address");

    reg_bit_ops!(start_tx, stop_tx, DMACTCR_OFFSET, DMACTCR_ST, "TX DMA", "Start", "Stop");
    reg_bit_ops!(start_rx, stop_rx, DMACRCR_OFFSET, DMACRCR_SR, "RX DMA", "Start", "Stop");

    reg_bit_check_clear!(is_reset_complete, DMAMR_OFFSET, DMAMR_SWR,
                         "Check if software reset is complete");

    /// Request a software reset of the MAC and DMA
    #[inline(always)]
    pub fn start_reset(&self) {
        self.0.set_bits(DMAMR_OFFSET, DMAMR_SWR);
    }

    /// Read the channel status flags
    #[inline(always)]
    pub fn status(&self) -> DmaStatus {
        DmaStatus::from_bits_retain(self.0.read(DMACSR_OFFSET))
    }

    /// Acknowledge status flags (write-1-to-clear)
    #[inline(always)]
    pub fn clear_status(&self, flags: DmaStatus) {
        self.0.write(DMACSR_OFFSET, flags.bits());
    }

    /// Read the interrupt enables
    #[inline(always)]
    pub fn interrupt_enable(&self) -> DmaStatus {
        DmaStatus::from_bits_retain(self.0.read(DMACIER_OFFSET))
    }

    /// Write the interrupt enables
    #[inline(always)]
    pub fn set_interrupt_enable(&self, flags: DmaStatus) {
        self.0.write(DMACIER_OFFSET, flags.bits());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockRegisters;

    #[test]
    fn status_bit_positions() {
        assert_eq!(DmaStatus::TI.bits(), 0x0001);
        assert_eq!(DmaStatus::RI.bits(), 0x0040);
        assert_eq!(DmaStatus::FBE.bits(), 0x1000);
        assert_eq!(DmaStatus::AIS.bits(), 0x4000);
        assert_eq!(DmaStatus::NIS.bits(), 0x8000);
    }

    #[test]
    fn default_enables_cover_rx_tx_and_summary() {
        assert_eq!(DMACIER_DEFAULT.bits(), 0x8041);
    }

    #[test]
    fn status_keeps_unknown_bits() {
        let regs = MockRegisters::new();
        regs.preset(DMACSR_OFFSET, (1 << 16) | DmaStatus::RI.bits());
        let status = DmaRegs(&regs).status();
        assert!(status.contains(DmaStatus::RI));
        assert_eq!(status.bits() & (1 << 16), 1 << 16);
    }

    #[test]
    fn clear_status_is_write_one_to_clear() {
        let regs = MockRegisters::new();
        regs.preset(DMACSR_OFFSET, (DmaStatus::RI | DmaStatus::TI | DmaStatus::NIS).bits());
        DmaRegs(&regs).clear_status(DmaStatus::RI);
        assert_eq!(DmaRegs(&regs).status(), DmaStatus::TI | DmaStatus::NIS);
    }

    #[test]
    fn start_stop_tx_rx() {
        let regs = MockRegisters::new();
        let dma = DmaRegs(&regs);
        dma.start_tx();
        dma.start_rx();
        assert_eq!(dma.tx_control() & DMACTCR_ST, DMACTCR_ST);
        assert_eq!(dma.rx_control() & DMACRCR_SR, DMACRCR_SR);
        dma.stop_tx();
        dma.stop_rx();
        assert_eq!(dma.tx_control() & DMACTCR_ST, 0);
        assert_eq!(dma.rx_control() & DMACRCR_SR, 0);
    }
}
