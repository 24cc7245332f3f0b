//! Host-side stand-in for the DMA.
//!
//! Plays the hardware role against a real [`DmaEngine`]: fills armed RX
//! descriptors with frame data and optional timestamp context descriptors,
//! writes TX descriptors back with or without a captured timestamp, moves the
//! current-RX-descriptor register and raises the matching status bits in
//! [`MockRegisters`].

extern crate std;
use std::vec::Vec;

use super::engine::DmaEngine;
use super::ring::DescriptorRing;
use crate::driver::ptp::Timestamp;
use crate::internal::dma::descriptor::bits::{Rdes1, Rdes3, Tdes2, Tdes3};
use crate::internal::register::RegisterAccess;
use crate::internal::register::dma::{DMACCARDR_OFFSET, DMACSR_OFFSET, DmaStatus};
use crate::testing::MockRegisters;

/// Shape of a simulated reception
#[derive(Clone, Copy)]
struct Reception {
    first: bool,
    last: bool,
    error: bool,
    timestamp: Option<Timestamp>,
    context_written: bool,
}

impl Reception {
    const COMPLETE: Self = Self {
        first: true,
        last: true,
        error: false,
        timestamp: None,
        context_written: true,
    };
}

/// Simulated DMA channel.
pub(crate) struct DmaSim<'a, const RX: usize, const TX: usize, const BUF: usize> {
    regs: &'a MockRegisters,
    engine: &'a DmaEngine<RX, TX, BUF>,
}

impl<'a, const RX: usize, const TX: usize, const BUF: usize> DmaSim<'a, RX, TX, BUF> {
    pub(crate) fn new(regs: &'a MockRegisters, engine: &'a DmaEngine<RX, TX, BUF>) -> Self {
        Self { regs, engine }
    }

    /// Slot the DMA will write next
    pub(crate) fn rx_position(&self) -> usize {
        self.engine
            .rx_ring
            .index_of(self.regs.read(DMACCARDR_OFFSET))
            .unwrap_or(0)
    }

    pub(crate) fn set_rx_position(&self, index: usize) {
        self.regs
            .preset(DMACCARDR_OFFSET, self.engine.rx_ring.slot_addr_u32(index));
    }

    fn raise(&self, flags: DmaStatus) {
        let current = self.regs.read(DMACSR_OFFSET);
        self.regs.preset(DMACSR_OFFSET, current | flags.bits());
    }

    /// Receive a complete frame, followed by a context descriptor when
    /// `timestamp` is given. Returns the number of data descriptors used.
    pub(crate) fn receive(&self, frame: &[u8], timestamp: Option<Timestamp>) -> usize {
        self.fill_rx(
            frame,
            Reception {
                timestamp,
                ..Reception::COMPLETE
            },
        )
    }

    /// Receive a frame whose last descriptor reports an error
    pub(crate) fn receive_with_error(&self, frame: &[u8]) -> usize {
        self.fill_rx(
            frame,
            Reception {
                error: true,
                ..Reception::COMPLETE
            },
        )
    }

    /// Write only the leading segment(s) of a frame, without the last flag
    pub(crate) fn receive_partial(&self, frame: &[u8]) -> usize {
        self.fill_rx(
            frame,
            Reception {
                last: false,
                ..Reception::COMPLETE
            },
        )
    }

    /// Receive a frame that announces a timestamp whose context descriptor
    /// has not been written yet
    pub(crate) fn receive_without_context(&self, frame: &[u8]) -> usize {
        self.fill_rx(
            frame,
            Reception {
                timestamp: Some(Timestamp::new(0, 0)),
                context_written: false,
                ..Reception::COMPLETE
            },
        )
    }

    /// Write segments that belong to no frame start
    pub(crate) fn receive_orphan_segment(&self, frame: &[u8]) -> usize {
        self.fill_rx(
            frame,
            Reception {
                first: false,
                last: false,
                ..Reception::COMPLETE
            },
        )
    }

    fn fill_rx(&self, frame: &[u8], shape: Reception) -> usize {
        let ring = &self.engine.rx_ring;
        let segments = frame.len().div_ceil(BUF).max(1);
        let mut index = self.rx_position();

        for (n, chunk) in frame.chunks(BUF).enumerate() {
            let slot = ring.get(index);
            assert!(slot.desc.is_owned(), "RX slot {index} is not armed");

            // SAFETY: the slot is DMA-owned, so the driver does not touch it
            unsafe {
                core::ptr::copy_nonoverlapping(
                    chunk.as_ptr(),
                    self.engine.rx_block_ptr(index),
                    chunk.len(),
                );
            }

            let is_last = shape.last && n + 1 == segments;
            let written = (n * BUF + chunk.len()) as u32;
            let mut rdes3 = Rdes3::from_bits_retain(written & Rdes3::PACKET_LENGTH_MASK);
            if shape.first && n == 0 {
                rdes3 |= Rdes3::FD;
            }
            if is_last {
                rdes3 |= Rdes3::LD;
                if shape.error {
                    rdes3 |= Rdes3::ES;
                }
            }
            let rdes1 = if is_last && shape.timestamp.is_some() {
                Rdes1::TSA
            } else {
                Rdes1::empty()
            };

            slot.desc.write_back([0, rdes1.bits(), 0, rdes3.bits()]);
            index = DescriptorRing::<RX>::next_index(index);
        }

        if shape.last
            && shape.context_written
            && let Some(timestamp) = shape.timestamp
        {
            let slot = ring.get(index);
            assert!(slot.desc.is_owned(), "RX context slot {index} is not armed");
            slot.desc.write_back([
                timestamp.nanoseconds(),
                timestamp.seconds(),
                0,
                Rdes3::CTXT.bits(),
            ]);
            index = DescriptorRing::<RX>::next_index(index);
        }

        self.set_rx_position(index);
        self.raise(DmaStatus::RI | DmaStatus::NIS);
        segments
    }

    /// Finish TX slot `index`, capturing `timestamp` if given
    pub(crate) fn complete_tx(&self, index: usize, timestamp: Option<Timestamp>) {
        let slot = self.engine.tx_ring.get(index);
        assert!(slot.desc.is_owned(), "TX slot {index} was not submitted");
        let interrupt = slot.desc.tx_control().contains(Tdes2::IOC);

        let mut tdes3 = Tdes3::FD | Tdes3::LD;
        let (nanoseconds, seconds) = match timestamp {
            Some(ts) => {
                tdes3 |= Tdes3::TTSS;
                (ts.nanoseconds(), ts.seconds())
            }
            None => (0, 0),
        };
        slot.desc.write_back([nanoseconds, seconds, 0, tdes3.bits()]);

        if interrupt {
            self.raise(DmaStatus::TI | DmaStatus::NIS);
        }
    }

    /// Bytes the driver placed in TX slot `index` for its pending frame
    pub(crate) fn tx_payload(&self, index: usize) -> Vec<u8> {
        let desc = &self.engine.tx_ring.get(index).desc;
        let len = (desc.tx_control().bits() & Tdes2::BUFFER1_LENGTH_MASK) as usize;
        // SAFETY: the block is BUF bytes long and len never exceeds BUF
        unsafe { core::slice::from_raw_parts(self.engine.tx_block_ptr(index), len.min(BUF)) }
            .to_vec()
    }
}
