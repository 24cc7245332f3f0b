//! One-character-per-slot ring snapshots for traces and tests.

use core::fmt;
use core::sync::atomic::Ordering;

use super::engine::DmaEngine;
use crate::internal::dma::descriptor::bits::{Rdes3, Tdes2, Tdes3};
use crate::internal::dma::descriptor::Descriptor;
use crate::internal::register::RegisterAccess;
use crate::internal::register::dma::DmaRegs;

/// Snapshot of a descriptor ring.
///
/// | Symbol | Meaning |
/// |--------|---------|
/// | `>` | DMA position (RX) or next slot to fill (TX) |
/// | `=` | owned by the DMA |
/// | `-` | software-owned and idle |
/// | `F` / `x` / `L` | completed first / middle / last RX segment |
/// | `C` | RX timestamp context descriptor |
/// | `t` | TX frame awaiting its timestamp |
/// | `T` | completed TX frame holding a timestamp |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RingStatus<const N: usize> {
    symbols: [u8; N],
    position: Option<usize>,
}

impl<const N: usize> RingStatus<N> {
    /// Symbols as a string slice
    pub fn as_str(&self) -> &str {
        core::str::from_utf8(&self.symbols).unwrap_or_default()
    }

    /// Symbol for slot `index`
    pub fn symbol(&self, index: usize) -> Option<char> {
        self.symbols.get(index).map(|&b| char::from(b))
    }

    /// Slot marked with `>`, if the position is known
    pub fn position(&self) -> Option<usize> {
        self.position
    }
}

impl<const N: usize> fmt::Display for RingStatus<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(feature = "defmt")]
impl<const N: usize> defmt::Format for RingStatus<N> {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "{=[u8]:a}", &self.symbols[..]);
    }
}

fn rx_symbol(desc: &Descriptor) -> u8 {
    if desc.is_owned() {
        return b'=';
    }
    let status = desc.rx_status();
    if status.contains(Rdes3::CTXT) {
        b'C'
    } else if status.contains(Rdes3::FD) {
        b'F'
    } else if status.contains(Rdes3::LD) {
        b'L'
    } else if status.is_empty() {
        b'-'
    } else {
        b'x'
    }
}

fn tx_symbol(desc: &Descriptor) -> u8 {
    if desc.is_owned() {
        if desc.tx_control().contains(Tdes2::TTSE) {
            b't'
        } else {
            b'='
        }
    } else if desc.tx_status().contains(Tdes3::TTSS) {
        b'T'
    } else {
        b'-'
    }
}

impl<const RX: usize, const TX: usize, const BUF: usize> DmaEngine<RX, TX, BUF> {
    /// Snapshot of the RX ring, marking the DMA's current descriptor
    pub fn rx_ring_status<A: RegisterAccess>(&self, regs: &A) -> RingStatus<RX> {
        let position = self.rx_ring.index_of(DmaRegs(regs).current_rx_desc());
        let mut symbols = [0u8; RX];
        for (index, (symbol, slot)) in symbols.iter_mut().zip(self.rx_ring.iter()).enumerate() {
            *symbol = if position == Some(index) {
                b'>'
            } else {
                rx_symbol(&slot.desc)
            };
        }
        RingStatus { symbols, position }
    }

    /// Snapshot of the TX ring, marking the next slot to be filled
    pub fn tx_ring_status(&self) -> RingStatus<TX> {
        let next = self.tx_state.next_slot.load(Ordering::Relaxed);
        let mut symbols = [0u8; TX];
        for (index, (symbol, slot)) in symbols.iter_mut().zip(self.tx_ring.iter()).enumerate() {
            *symbol = if index == next {
                b'>'
            } else {
                tx_symbol(&slot.desc)
            };
        }
        RingStatus {
            symbols,
            position: Some(next),
        }
    }
}
