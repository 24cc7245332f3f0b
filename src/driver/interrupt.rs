//! Interrupt status reported by the dispatcher.
//!
//! [`InterruptStatus`] wraps the DMA channel status flags read at dispatch
//! time together with what the dispatcher did about them.

use crate::internal::register::dma::DmaStatus;

// =============================================================================
// Interrupt Status
// =============================================================================

/// Causes seen by one `on_interrupt` call.
///
/// Every flag in [`status`](Self::status) was acknowledged before the call
/// returned.
///
/// # Example
///
/// ```ignore
/// let status = emac.on_interrupt(&mut handler);
/// if status.has_error() {
///     // channel stopped or bus error, restart or reset
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InterruptStatus {
    status: DmaStatus,
    timestamps: usize,
}

impl InterruptStatus {
    pub(crate) const fn new(status: DmaStatus, timestamps: usize) -> Self {
        Self { status, timestamps }
    }

    /// Create from a raw DMACSR value
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Self::new(DmaStatus::from_bits_retain(raw), 0)
    }

    /// Raw DMACSR bits
    #[inline]
    pub const fn to_raw(&self) -> u32 {
        self.status.bits()
    }

    /// Typed status flags
    #[inline]
    pub const fn status(&self) -> DmaStatus {
        self.status
    }

    /// Number of transmit timestamps delivered during this dispatch
    #[inline]
    pub const fn timestamps_delivered(&self) -> usize {
        self.timestamps
    }

    /// A frame was received
    #[inline]
    pub const fn rx_complete(&self) -> bool {
        self.status.contains(DmaStatus::RI)
    }

    /// A frame with interrupt-on-completion was transmitted
    #[inline]
    pub const fn tx_complete(&self) -> bool {
        self.status.contains(DmaStatus::TI)
    }

    /// RX DMA found no free descriptor and suspended
    #[inline]
    pub const fn rx_buf_unavailable(&self) -> bool {
        self.status.contains(DmaStatus::RBU)
    }

    /// TX DMA found no descriptor to send and suspended
    #[inline]
    pub const fn tx_buf_unavailable(&self) -> bool {
        self.status.contains(DmaStatus::TBU)
    }

    /// RX DMA stopped
    #[inline]
    pub const fn rx_stopped(&self) -> bool {
        self.status.contains(DmaStatus::RPS)
    }

    /// TX DMA stopped
    #[inline]
    pub const fn tx_stopped(&self) -> bool {
        self.status.contains(DmaStatus::TPS)
    }

    /// Unrecoverable bus error
    #[inline]
    pub const fn fatal_bus_error(&self) -> bool {
        self.status.contains(DmaStatus::FBE)
    }

    /// Check if any cause was present (summary bits excluded)
    #[inline]
    pub const fn any(&self) -> bool {
        self.status
            .difference(DmaStatus::NIS.union(DmaStatus::AIS))
            .bits()
            != 0
    }

    /// Check if a cause indicating lost traffic or a halted channel was present
    #[inline]
    pub const fn has_error(&self) -> bool {
        self.status.intersects(DmaStatus::ERRORS)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for InterruptStatus {
    fn format(&self, f: defmt::Formatter<'_>) {
        defmt::write!(
            f,
            "InterruptStatus {{ status: {=u32:#x}, timestamps: {=usize} }}",
            self.status.bits(),
            self.timestamps
        );
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_has_nothing() {
        let status = InterruptStatus::from_raw(0);
        assert!(!status.any());
        assert!(!status.has_error());
        assert!(!status.rx_complete());
        assert!(!status.tx_complete());
        assert_eq!(status, InterruptStatus::default());
    }

    #[test]
    fn rx_and_tx_complete() {
        let status = InterruptStatus::from_raw((DmaStatus::RI | DmaStatus::TI).bits());
        assert!(status.rx_complete());
        assert!(status.tx_complete());
        assert!(status.any());
        assert!(!status.has_error());
    }

    #[test]
    fn summary_bits_alone_are_not_causes() {
        let status = InterruptStatus::from_raw((DmaStatus::NIS | DmaStatus::AIS).bits());
        assert!(!status.any());
    }

    #[test]
    fn error_causes() {
        for flag in [DmaStatus::FBE, DmaStatus::RBU, DmaStatus::RPS, DmaStatus::TPS, DmaStatus::CDE] {
            assert!(InterruptStatus::from_raw(flag.bits()).has_error(), "{flag:?}");
        }
        assert!(!InterruptStatus::from_raw(DmaStatus::TBU.bits()).has_error());
        assert!(InterruptStatus::from_raw(DmaStatus::FBE.bits()).fatal_bus_error());
        assert!(InterruptStatus::from_raw(DmaStatus::RBU.bits()).rx_buf_unavailable());
        assert!(InterruptStatus::from_raw(DmaStatus::TBU.bits()).tx_buf_unavailable());
        assert!(InterruptStatus::from_raw(DmaStatus::RPS.bits()).rx_stopped());
        assert!(InterruptStatus::from_raw(DmaStatus::TPS.bits()).tx_stopped());
    }

    #[test]
    fn raw_value_is_preserved() {
        let raw = (DmaStatus::RI | DmaStatus::NIS).bits() | (1 << 20);
        assert_eq!(InterruptStatus::from_raw(raw).to_raw(), raw);
    }
}
