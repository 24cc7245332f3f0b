//! Transmit submission.

use core::sync::atomic::Ordering;

use super::engine::DmaEngine;
use super::ring::DescriptorRing;
use crate::driver::error::{DmaError, Result};
use crate::driver::event::TxOptions;
use crate::internal::constants::MAX_DESCRIPTOR_LENGTH;
use crate::internal::dma::descriptor::bits::Tdes2;
use crate::internal::register::RegisterAccess;
use crate::internal::register::dma::DmaRegs;

impl<const RX: usize, const TX: usize, const BUF: usize> DmaEngine<RX, TX, BUF> {
    /// Copy `frame` into the next TX slot and hand it to the DMA, spinning
    /// while that slot is still owned by the DMA.
    ///
    /// Returns the sequence number stamped into the slot. There is no timeout:
    /// a DMA that never releases the slot blocks the caller forever.
    pub fn transmit<A: RegisterAccess>(
        &self,
        regs: &A,
        frame: &[u8],
        options: TxOptions,
    ) -> Result<u16> {
        self.submit(regs, frame, options, true)
    }

    /// Non-blocking variant of [`transmit`](Self::transmit).
    ///
    /// Fails with [`DmaError::DescriptorBusy`] when the next slot is owned by
    /// the DMA.
    pub fn try_transmit<A: RegisterAccess>(
        &self,
        regs: &A,
        frame: &[u8],
        options: TxOptions,
    ) -> Result<u16> {
        self.submit(regs, frame, options, false)
    }

    /// Check whether the next slot can be filled without waiting
    pub fn can_transmit(&self) -> bool {
        let index = self.tx_state.next_slot.load(Ordering::Relaxed);
        !self.tx_ring.get(index).desc.is_owned()
    }

    fn submit<A: RegisterAccess>(
        &self,
        regs: &A,
        frame: &[u8],
        options: TxOptions,
        block: bool,
    ) -> Result<u16> {
        if frame.is_empty() {
            return Err(DmaError::InvalidLength.into());
        }
        if frame.len() > BUF || frame.len() > MAX_DESCRIPTOR_LENGTH {
            return Err(DmaError::FrameTooLarge.into());
        }

        let index = self.tx_state.next_slot.load(Ordering::Relaxed);
        let slot = self.tx_ring.get(index);

        while slot.desc.is_owned() {
            if !block {
                return Err(DmaError::DescriptorBusy.into());
            }
            core::hint::spin_loop();
        }

        slot.desc.clear();
        // SAFETY: the slot was just observed software-owned and only the
        // submission path fills it
        unsafe { self.fill_tx(index, frame) };

        let sequence = self.tx_state.submitted.load(Ordering::Relaxed).wrapping_add(1);
        self.tx_state.submitted.store(sequence, Ordering::Relaxed);
        slot.ext.set_sequence(sequence);

        let control = match options {
            TxOptions::None => {
                slot.ext.set_request(None, 0);
                Tdes2::empty()
            }
            TxOptions::InterruptOnCompletion => {
                slot.ext.set_request(None, 0);
                Tdes2::IOC
            }
            TxOptions::CaptureTimestamp(request) => {
                slot.ext.set_request(request.callback, request.tag);
                Tdes2::IOC | Tdes2::TTSE
            }
        };

        slot.desc.submit_tx(slot.ext.buffer(), frame.len(), control);

        self.tx_state
            .next_slot
            .store(DescriptorRing::<TX>::next_index(index), Ordering::Relaxed);

        // Any tail pointer write resumes a suspended channel
        DmaRegs(regs).set_tx_tail_pointer(0);

        Ok(sequence)
    }
}

#[cfg(test)]
mod tests {
    extern crate std;
    use std::sync::atomic::AtomicBool;
    use std::thread;
    use std::time::Duration;

    use super::*;
    use crate::driver::error::Error;
    use crate::driver::event::{TimestampRequest, TxTimestamp};
    use crate::internal::dma::descriptor::bits::Tdes3;
    use crate::internal::dma::sim::DmaSim;
    use crate::internal::register::dma::DMACTDTPR_OFFSET;
    use crate::testing::MockRegisters;

    type Engine = DmaEngine<2, 4, 128>;

    fn setup() -> (MockRegisters, Engine) {
        let regs = MockRegisters::new();
        let engine = Engine::new();
        engine.init(&regs, 32);
        (regs, engine)
    }

    fn ignore(_: TxTimestamp) {}

    #[test]
    fn submit_hands_slot_to_dma() {
        let (regs, engine) = setup();
        regs.clear_writes();
        let seq = engine.transmit(&regs, &[0xAA; 60], TxOptions::None).unwrap();
        assert_eq!(seq, 1);

        let slot = engine.tx_ring.get(0);
        assert!(slot.desc.is_owned());
        let status = slot.desc.tx_status();
        assert!(status.contains(Tdes3::FD | Tdes3::LD | Tdes3::CIC_FULL));
        assert_eq!(status.bits() & Tdes3::FRAME_LENGTH_MASK, 60);
        assert_eq!(slot.desc.words()[0], slot.ext.buffer());
        assert_eq!(slot.ext.sequence(), 1);
        assert_eq!(regs.writes(), [(DMACTDTPR_OFFSET, 0)]);
    }

    #[test]
    fn frame_is_copied_into_slot_buffer() {
        let (regs, engine) = setup();
        let sim = DmaSim::new(&regs, &engine);
        let frame: std::vec::Vec<u8> = (0..100u8).collect();
        engine.transmit(&regs, &frame, TxOptions::None).unwrap();
        assert_eq!(sim.tx_payload(0), frame);
    }

    #[test]
    fn sequence_numbers_increase_and_slots_advance() {
        let (regs, engine) = setup();
        for expected in 1..=4u16 {
            assert_eq!(engine.transmit(&regs, &[1; 20], TxOptions::None).unwrap(), expected);
        }
        for (i, slot) in engine.tx_ring.iter().enumerate() {
            assert_eq!(slot.ext.sequence(), i as u16 + 1);
        }
        assert_eq!(engine.tx_state.next_slot.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn sequence_wraps_at_counter_width() {
        let (regs, engine) = setup();
        engine.tx_state.submitted.store(u16::MAX, Ordering::Relaxed);
        assert_eq!(engine.transmit(&regs, &[1; 20], TxOptions::None).unwrap(), 0);
    }

    #[test]
    fn options_select_control_bits() {
        let (regs, engine) = setup();
        engine.transmit(&regs, &[1; 20], TxOptions::None).unwrap();
        engine
            .transmit(&regs, &[1; 20], TxOptions::InterruptOnCompletion)
            .unwrap();
        engine
            .transmit(
                &regs,
                &[1; 20],
                TxOptions::CaptureTimestamp(TimestampRequest::with_callback(ignore, 42)),
            )
            .unwrap();

        let control = |i| engine.tx_ring.get(i).desc.tx_control();
        assert!(!control(0).intersects(Tdes2::IOC | Tdes2::TTSE));
        assert!(control(1).contains(Tdes2::IOC) && !control(1).contains(Tdes2::TTSE));
        assert!(control(2).contains(Tdes2::IOC | Tdes2::TTSE));
        assert_eq!(engine.tx_ring.get(2).ext.tag(), 42);
        assert!(engine.tx_ring.get(2).ext.callback().is_some());
        assert!(engine.tx_ring.get(0).ext.callback().is_none());
    }

    #[test]
    fn rejects_empty_and_oversized_frames() {
        let (regs, engine) = setup();
        assert_eq!(
            engine.transmit(&regs, &[], TxOptions::None),
            Err(Error::Dma(DmaError::InvalidLength))
        );
        assert_eq!(
            engine.transmit(&regs, &[0; 129], TxOptions::None),
            Err(Error::Dma(DmaError::FrameTooLarge))
        );
        assert_eq!(engine.submitted(), 0);
        assert_eq!(engine.tx_available(), 4);
    }

    #[test]
    fn try_transmit_reports_full_ring() {
        let (regs, engine) = setup();
        let sim = DmaSim::new(&regs, &engine);
        for _ in 0..4 {
            engine.try_transmit(&regs, &[1; 20], TxOptions::None).unwrap();
        }
        assert!(!engine.can_transmit());
        assert_eq!(
            engine.try_transmit(&regs, &[1; 20], TxOptions::None),
            Err(Error::Dma(DmaError::DescriptorBusy))
        );
        assert_eq!(engine.submitted(), 4);

        sim.complete_tx(0, None);
        assert!(engine.can_transmit());
        assert_eq!(engine.try_transmit(&regs, &[1; 20], TxOptions::None), Ok(5));
    }

    #[test]
    fn transmit_blocks_until_slot_released() {
        let (regs, engine) = setup();
        for _ in 0..4 {
            engine.transmit(&regs, &[1; 20], TxOptions::None).unwrap();
        }

        let done = AtomicBool::new(false);
        thread::scope(|s| {
            let sender = s.spawn(|| {
                let seq = engine.transmit(&regs, &[2; 20], TxOptions::None);
                done.store(true, Ordering::SeqCst);
                seq
            });

            thread::sleep(Duration::from_millis(50));
            assert!(!done.load(Ordering::SeqCst));

            DmaSim::new(&regs, &engine).complete_tx(0, None);
            assert_eq!(sender.join().unwrap(), Ok(5));
        });
        assert!(done.load(Ordering::SeqCst));
    }
}
