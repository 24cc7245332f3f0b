//! Receive walk: drains completed RX descriptors and delivers whole frames.

#[cfg(feature = "log")]
use log::{debug, warn};

use super::engine::{DmaEngine, Guard};
use super::ring::DescriptorRing;
use crate::driver::event::{Disposition, Event, EventHandler, RxFrame};
use crate::internal::constants::MAX_FRAME_SIZE;
use crate::internal::dma::descriptor::bits::{Rdes1, Rdes3};
use crate::internal::register::RegisterAccess;
use crate::internal::register::dma::DmaRegs;

/// What the descriptors starting at one software-owned slot contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Run {
    /// A complete frame, optionally followed by its timestamp context slot
    Frame {
        last: usize,
        segments: usize,
        context: Option<usize>,
    },
    /// Descriptors that cannot belong to any deliverable frame
    Stray { count: usize },
    /// A frame that fills the whole ring without ending
    Overflow { count: usize },
    /// The frame is still being written by the DMA
    Incomplete,
}

impl<const RX: usize, const TX: usize, const BUF: usize> DmaEngine<RX, TX, BUF> {
    /// Deliver every frame the DMA completed since the previous call.
    ///
    /// Frames are handed to `handler` in ring order. `Disposition::Retry`
    /// leaves the frame's descriptors software-owned and ends the walk; the
    /// frame is offered again on the next call. Returns the number of frames
    /// the handler consumed.
    pub fn process_received<A, H>(&self, regs: &A, handler: &mut H) -> usize
    where
        A: RegisterAccess,
        H: EventHandler + ?Sized,
    {
        let Some(_guard) = Guard::acquire(&self.rx_busy) else {
            #[cfg(feature = "log")]
            warn!("receive walk re-entered, ignoring");
            return 0;
        };

        let dma = DmaRegs(regs);
        let mut index = self.oldest_unprocessed(dma.current_rx_desc());
        let mut examined = 0;
        let mut delivered = 0;
        let mut rearmed = false;

        while examined < RX {
            if self.rx_ring.get(index).desc.is_owned() {
                break;
            }

            let span = match self.scan_run(index, RX - examined) {
                Run::Incomplete => break,
                Run::Stray { count } => {
                    #[cfg(feature = "log")]
                    warn!("re-arming {} stray RX descriptor(s) at {}", count, index);
                    count
                }
                Run::Overflow { count } => {
                    #[cfg(feature = "log")]
                    warn!("RX frame at {} fills all {} descriptors, dropping", index, count);
                    count
                }
                Run::Frame {
                    last,
                    segments,
                    context,
                } => match self.deliver(index, last, segments, context, handler) {
                    Some(Disposition::Retry) => break,
                    Some(_) => {
                        delivered += 1;
                        segments + usize::from(context.is_some())
                    }
                    None => segments + usize::from(context.is_some()),
                },
            };

            for offset in 0..span {
                self.rearm_rx(DescriptorRing::<RX>::advance(index, offset));
            }
            rearmed = true;
            index = DescriptorRing::<RX>::advance(index, span);
            examined += span;
        }

        if rearmed {
            dma.set_rx_tail_pointer(0);
        }
        delivered
    }

    /// Find the oldest software-owned descriptor the DMA has not reused,
    /// starting from the DMA's current position and walking backwards.
    fn oldest_unprocessed(&self, current: u32) -> usize {
        let hw = self.rx_ring.index_of(current).unwrap_or_else(|| {
            #[cfg(feature = "log")]
            debug!("RX current descriptor 0x{:08x} outside ring", current);
            0
        });

        let mut start = hw;
        for _ in 1..RX {
            let prev = DescriptorRing::<RX>::prev_index(start);
            if self.rx_ring.get(prev).desc.is_owned() {
                return start;
            }
            start = prev;
        }

        // Every other slot is software-owned. If the DMA's own slot is too,
        // the ring is full and the oldest frame starts at the DMA position.
        if self.rx_ring.get(hw).desc.is_owned() {
            start
        } else {
            hw
        }
    }

    /// Classify the descriptors starting at software-owned slot `first`,
    /// looking at no more than `budget` slots.
    fn scan_run(&self, first: usize, budget: usize) -> Run {
        let status = self.rx_ring.get(first).desc.rx_status();
        if status.contains(Rdes3::CTXT) || !status.contains(Rdes3::FD) {
            return Run::Stray { count: 1 };
        }

        let mut last = first;
        let mut segments = 1;
        while !self.rx_ring.get(last).desc.rx_status().contains(Rdes3::LD) {
            if segments == RX {
                // No descriptor is left for the DMA to finish the frame in
                return Run::Overflow { count: segments };
            }
            if segments == budget {
                return Run::Incomplete;
            }
            let next = DescriptorRing::<RX>::next_index(last);
            let desc = &self.rx_ring.get(next).desc;
            if desc.is_owned() {
                return Run::Incomplete;
            }
            let status = desc.rx_status();
            if status.intersects(Rdes3::FD | Rdes3::CTXT) {
                // A new frame started before this one ended
                return Run::Stray { count: segments };
            }
            last = next;
            segments += 1;
        }

        let mut context = None;
        if self.rx_ring.get(last).desc.rx_extended_status().contains(Rdes1::TSA) {
            if segments == budget {
                return Run::Incomplete;
            }
            let next = DescriptorRing::<RX>::next_index(last);
            let desc = &self.rx_ring.get(next).desc;
            if desc.is_owned() {
                return Run::Incomplete;
            }
            if desc.rx_status().contains(Rdes3::CTXT) {
                context = Some(next);
            } else {
                #[cfg(feature = "log")]
                warn!("RX timestamp context missing after descriptor {}", last);
            }
        }

        Run::Frame {
            last,
            segments,
            context,
        }
    }

    /// Hand one complete frame to the handler. `None` means the frame was
    /// discarded without being offered.
    fn deliver<H: EventHandler + ?Sized>(
        &self,
        first: usize,
        last: usize,
        segments: usize,
        context: Option<usize>,
        handler: &mut H,
    ) -> Option<Disposition> {
        let status = self.rx_ring.get(last).desc.rx_status();
        if status.contains(Rdes3::ES) {
            #[cfg(feature = "log")]
            warn!("RX frame error: rdes3=0x{:08x}", status.bits());
            return None;
        }

        let length = status.packet_length();
        if length == 0 || length > segments * BUF {
            #[cfg(feature = "log")]
            warn!("RX frame length {} invalid for {} segment(s)", length, segments);
            return None;
        }

        let timestamp = context.map(|index| self.rx_ring.get(index).desc.timestamp());

        let data = if segments == 1 {
            // SAFETY: the descriptor is software-owned until re-armed below
            unsafe { self.rx_data(first, length) }
        } else {
            if length > MAX_FRAME_SIZE {
                #[cfg(feature = "log")]
                warn!("RX frame of {} bytes exceeds reassembly buffer", length);
                return None;
            }
            // SAFETY: the receive guard is held and the whole span is
            // software-owned
            unsafe { self.reassemble(first, length) }
        };

        Some(handler.on_event(Event::FrameAvailable(RxFrame::new(data, timestamp))))
    }

    fn rearm_rx(&self, index: usize) {
        let slot = self.rx_ring.get(index);
        slot.desc.arm_rx(slot.ext.buffer());
    }
}

#[cfg(test)]
mod tests {
    extern crate std;
    use std::vec;
    use std::vec::Vec;

    use super::*;
    use crate::driver::ptp::Timestamp;
    use crate::internal::dma::sim::DmaSim;
    use crate::internal::register::dma::DMACRDTPR_OFFSET;
    use crate::testing::MockRegisters;

    type Engine = DmaEngine<4, 2, 64>;

    #[derive(Debug, PartialEq)]
    struct Seen {
        data: Vec<u8>,
        timestamp: Option<Timestamp>,
    }

    fn collect(seen: &mut Vec<Seen>) -> impl FnMut(Event<'_>) -> Disposition + '_ {
        move |event| {
            if let Event::FrameAvailable(frame) = event {
                seen.push(Seen {
                    data: frame.data().to_vec(),
                    timestamp: frame.timestamp(),
                });
            }
            Disposition::Accepted
        }
    }

    fn pattern(len: usize, seed: u8) -> Vec<u8> {
        (0..len).map(|i| (i as u8).wrapping_mul(7).wrapping_add(seed)).collect()
    }

    fn setup() -> (MockRegisters, Engine) {
        let regs = MockRegisters::new();
        let engine = Engine::new();
        engine.init(&regs, 32);
        (regs, engine)
    }

    #[test]
    fn nothing_completed_is_a_no_op() {
        let (regs, engine) = setup();
        let sim = DmaSim::new(&regs, &engine);
        sim.set_rx_position(0);
        regs.clear_writes();

        let mut seen = Vec::new();
        assert_eq!(engine.process_received(&regs, &mut collect(&mut seen)), 0);
        assert!(seen.is_empty());
        assert!(regs.writes().is_empty());
        assert_eq!(engine.rx_free_count(), 4);
    }

    #[test]
    fn single_segment_frame_is_delivered_and_rearmed() {
        let (regs, engine) = setup();
        let sim = DmaSim::new(&regs, &engine);
        let frame = pattern(60, 1);
        sim.receive(&frame, None);

        let mut seen = Vec::new();
        assert_eq!(engine.process_received(&regs, &mut collect(&mut seen)), 1);
        assert_eq!(seen, vec![Seen { data: frame, timestamp: None }]);
        assert_eq!(engine.rx_free_count(), 4);
        assert!(regs.writes().iter().any(|(o, _)| *o == DMACRDTPR_OFFSET));
    }

    #[test]
    fn three_segment_frame_then_single_segment_frame() {
        let (regs, engine) = setup();
        let sim = DmaSim::new(&regs, &engine);
        let big = pattern(150, 3);
        let small = pattern(42, 9);
        assert_eq!(sim.receive(&big, None), 3);
        assert_eq!(sim.receive(&small, None), 1);

        let mut seen = Vec::new();
        assert_eq!(engine.process_received(&regs, &mut collect(&mut seen)), 2);
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].data, big);
        assert_eq!(seen[1].data, small);
        assert_eq!(engine.rx_free_count(), 4);
    }

    #[test]
    fn reassembled_frame_consumes_ceil_size_over_block() {
        let (regs, engine) = setup();
        let sim = DmaSim::new(&regs, &engine);
        let frame = pattern(129, 5);
        assert_eq!(sim.receive(&frame, None), 3);
        assert_eq!(engine.rx_free_count(), 1);

        let mut seen = Vec::new();
        engine.process_received(&regs, &mut collect(&mut seen));
        assert_eq!(seen[0].data, frame);
        assert_eq!(engine.rx_free_count(), 4);
    }

    #[test]
    fn context_timestamp_belongs_to_its_frame() {
        let (regs, engine) = setup();
        let sim = DmaSim::new(&regs, &engine);
        let first = pattern(100, 1);
        let second = pattern(20, 2);
        sim.receive(&first, Some(Timestamp::new(12, 345)));
        sim.receive(&second, None);

        let mut seen = Vec::new();
        assert_eq!(engine.process_received(&regs, &mut collect(&mut seen)), 2);
        assert_eq!(seen[0].data, first);
        assert_eq!(seen[0].timestamp, Some(Timestamp::new(12, 345)));
        assert_eq!(seen[1].data, second);
        assert_eq!(seen[1].timestamp, None);
        assert_eq!(engine.rx_free_count(), 4);
    }

    #[test]
    fn frames_queued_across_wrap_are_delivered_oldest_first() {
        let (regs, engine) = setup();
        let sim = DmaSim::new(&regs, &engine);
        let mut seen = Vec::new();

        sim.receive(&pattern(10, 0), None);
        sim.receive(&pattern(10, 1), None);
        sim.receive(&pattern(10, 2), None);
        engine.process_received(&regs, &mut collect(&mut seen));
        seen.clear();

        // Slots 3 and 0 complete while nobody looks
        sim.receive(&pattern(11, 3), None);
        sim.receive(&pattern(12, 4), None);
        assert_eq!(engine.process_received(&regs, &mut collect(&mut seen)), 2);
        assert_eq!(seen[0].data, pattern(11, 3));
        assert_eq!(seen[1].data, pattern(12, 4));
    }

    #[test]
    fn full_ring_is_drained() {
        let (regs, engine) = setup();
        let sim = DmaSim::new(&regs, &engine);
        for seed in 0..4 {
            sim.receive(&pattern(30, seed), None);
        }
        assert_eq!(engine.rx_free_count(), 0);

        let mut seen = Vec::new();
        assert_eq!(engine.process_received(&regs, &mut collect(&mut seen)), 4);
        let order: Vec<u8> = seen.iter().map(|s| s.data[0]).collect();
        assert_eq!(order, [0, 1, 2, 3]);
    }

    #[test]
    fn retry_leaves_frame_for_next_call() {
        let (regs, engine) = setup();
        let sim = DmaSim::new(&regs, &engine);
        sim.receive(&pattern(20, 1), None);
        sim.receive(&pattern(20, 2), None);

        let mut calls = 0;
        let mut refuse = |_: Event<'_>| {
            calls += 1;
            Disposition::Retry
        };
        assert_eq!(engine.process_received(&regs, &mut refuse), 0);
        assert_eq!(calls, 1);
        assert_eq!(engine.rx_free_count(), 2);

        let mut seen = Vec::new();
        assert_eq!(engine.process_received(&regs, &mut collect(&mut seen)), 2);
        assert_eq!(seen[0].data, pattern(20, 1));
        assert_eq!(seen[1].data, pattern(20, 2));
    }

    #[test]
    fn dropped_frame_is_still_rearmed() {
        let (regs, engine) = setup();
        let sim = DmaSim::new(&regs, &engine);
        sim.receive(&pattern(20, 1), None);

        let mut drop_all = |_: Event<'_>| Disposition::Dropped;
        assert_eq!(engine.process_received(&regs, &mut drop_all), 1);
        assert_eq!(engine.rx_free_count(), 4);
    }

    #[test]
    fn error_frame_is_skipped_and_rearmed() {
        let (regs, engine) = setup();
        let sim = DmaSim::new(&regs, &engine);
        sim.receive_with_error(&pattern(20, 1));
        sim.receive(&pattern(20, 2), None);

        let mut seen = Vec::new();
        assert_eq!(engine.process_received(&regs, &mut collect(&mut seen)), 1);
        assert_eq!(seen[0].data, pattern(20, 2));
        assert_eq!(engine.rx_free_count(), 4);
    }

    #[test]
    fn incomplete_frame_waits_for_last_segment() {
        let (regs, engine) = setup();
        let sim = DmaSim::new(&regs, &engine);
        sim.receive_partial(&pattern(64, 1));

        let mut seen = Vec::new();
        assert_eq!(engine.process_received(&regs, &mut collect(&mut seen)), 0);
        assert!(seen.is_empty());
        assert_eq!(engine.rx_free_count(), 3);
    }

    #[test]
    fn frame_filling_whole_ring_is_dropped_and_rearmed() {
        let (regs, engine) = setup();
        let sim = DmaSim::new(&regs, &engine);
        assert_eq!(sim.receive_partial(&[0x55; 256]), 4);
        assert_eq!(engine.rx_free_count(), 0);

        let mut seen = Vec::new();
        assert_eq!(engine.process_received(&regs, &mut collect(&mut seen)), 0);
        assert!(seen.is_empty());
        assert_eq!(engine.rx_free_count(), 4);

        // Reception resumes on the re-armed ring
        let frame = pattern(40, 6);
        sim.receive(&frame, None);
        assert_eq!(engine.process_received(&regs, &mut collect(&mut seen)), 1);
        assert_eq!(seen[0].data, frame);
    }

    #[test]
    fn pending_context_descriptor_defers_frame() {
        let (regs, engine) = setup();
        let sim = DmaSim::new(&regs, &engine);
        sim.receive_without_context(&pattern(20, 1));

        let mut seen = Vec::new();
        assert_eq!(engine.process_received(&regs, &mut collect(&mut seen)), 0);
        assert_eq!(engine.rx_free_count(), 3);
    }

    #[test]
    fn orphan_segment_is_rearmed() {
        let (regs, engine) = setup();
        let sim = DmaSim::new(&regs, &engine);
        sim.receive_orphan_segment(&pattern(64, 1));
        sim.receive(&pattern(20, 2), None);

        let mut seen = Vec::new();
        assert_eq!(engine.process_received(&regs, &mut collect(&mut seen)), 1);
        assert_eq!(seen[0].data, pattern(20, 2));
        assert_eq!(engine.rx_free_count(), 4);
    }

    #[test]
    fn reentry_is_ignored() {
        let (regs, engine) = setup();
        let sim = DmaSim::new(&regs, &engine);
        sim.receive(&pattern(20, 1), None);

        let mut inner = 0;
        let mut nested = |_: Event<'_>| {
            inner = engine.process_received(&regs, &mut |_: Event<'_>| Disposition::Accepted);
            Disposition::Accepted
        };
        assert_eq!(engine.process_received(&regs, &mut nested), 1);
        assert_eq!(inner, 0);
    }
}
