//! DMA descriptor bit field definitions.
//!
//! Descriptors have a *read* format (written by software before handing the
//! descriptor to the DMA) and a *write-back* format (written by the DMA when it
//! returns the descriptor). Some bit positions change meaning between the two,
//! so both names are defined where they overlap.

use bitflags::bitflags;

// =============================================================================
// RDES3 (RX Descriptor Word 3)
// =============================================================================

bitflags! {
    /// RX descriptor word 3 flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Rdes3: u32 {
        /// Owned by the DMA
        const OWN = 1 << 31;
        /// Interrupt on completion (read format)
        const IOC = 1 << 30;
        /// Context descriptor (write-back format)
        const CTXT = 1 << 30;
        /// First descriptor of a packet (write-back format)
        const FD = 1 << 29;
        /// Last descriptor of a packet (write-back format)
        const LD = 1 << 28;
        /// Receive status RDES2 valid (write-back format)
        const RS2V = 1 << 27;
        /// Receive status RDES1 valid (write-back format)
        const RS1V = 1 << 26;
        /// Receive status RDES0 valid (write-back format)
        const RS0V = 1 << 25;
        /// Buffer 1 address valid (read format)
        const BUF1V = 1 << 24;
        /// CRC error
        const CE = 1 << 24;
        /// Giant packet
        const GP = 1 << 23;
        /// Receive watchdog timeout
        const RWT = 1 << 22;
        /// Overflow error
        const OE = 1 << 21;
        /// Receive error
        const RE = 1 << 20;
        /// Dribble bit error
        const DE = 1 << 19;
        /// Error summary (write-back format)
        const ES = 1 << 15;
    }
}

impl Rdes3 {
    /// Packet length field mask (write-back format, 14 bits)
    pub const PACKET_LENGTH_MASK: u32 = 0x3FFF;

    /// Flags written when a descriptor is armed for reception
    pub const ARMED: Self = Self::OWN.union(Self::IOC).union(Self::BUF1V);

    /// Total packet length reported in a last descriptor
    #[inline(always)]
    #[must_use]
    pub const fn packet_length(self) -> usize {
        (self.bits() & Self::PACKET_LENGTH_MASK) as usize
    }
}

// =============================================================================
// RDES1 (RX Descriptor Word 1, write-back format)
// =============================================================================

bitflags! {
    /// RX descriptor word 1 flags (write-back format)
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Rdes1: u32 {
        /// Timestamp dropped
        const TD = 1 << 15;
        /// Timestamp available; the next descriptor is a context descriptor
        const TSA = 1 << 14;
        /// IP checksum bypassed
        const IPCB = 1 << 11;
        /// IP payload error
        const IPCE = 1 << 7;
        /// IP header error
        const IPHE = 1 << 3;
    }
}

// =============================================================================
// TDES2 (TX Descriptor Word 2, read format)
// =============================================================================

bitflags! {
    /// TX descriptor word 2 flags (read format)
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Tdes2: u32 {
        /// Interrupt on completion
        const IOC = 1 << 31;
        /// Transmit timestamp enable
        const TTSE = 1 << 30;
    }
}

impl Tdes2 {
    /// Buffer 1 length field mask (14 bits)
    pub const BUFFER1_LENGTH_MASK: u32 = 0x3FFF;
}

// =============================================================================
// TDES3 (TX Descriptor Word 3)
// =============================================================================

bitflags! {
    /// TX descriptor word 3 flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Tdes3: u32 {
        /// Owned by the DMA
        const OWN = 1 << 31;
        /// Context descriptor
        const CTXT = 1 << 30;
        /// First descriptor
        const FD = 1 << 29;
        /// Last descriptor
        const LD = 1 << 28;
        /// Checksum insertion: IP header (read format)
        const CIC_IP_HEADER = 1 << 16;
        /// Checksum insertion: payload (read format)
        const CIC_PAYLOAD = 1 << 17;
        /// Transmit timestamp status (write-back format)
        const TTSS = 1 << 17;
        /// Error summary (write-back format)
        const ES = 1 << 15;
    }
}

impl Tdes3 {
    /// Frame length field mask (15 bits)
    pub const FRAME_LENGTH_MASK: u32 = 0x7FFF;

    /// Full checksum insertion: IP header and payload with pseudo-header
    pub const CIC_FULL: Self = Self::CIC_IP_HEADER.union(Self::CIC_PAYLOAD);

    /// Flags written when a single-descriptor frame is handed to the DMA
    pub const SUBMIT: Self = Self::OWN.union(Self::FD).union(Self::LD).union(Self::CIC_FULL);
}
