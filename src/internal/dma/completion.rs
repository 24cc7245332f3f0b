//! Transmit timestamp correlation.
//!
//! The DMA may finish several timestamp-capturing frames between two scans,
//! and ring position says nothing about submission order once the ring has
//! wrapped. Each pass therefore scans the whole ring and picks the completed,
//! timestamped slot whose sequence number is closest after the last one
//! delivered. A slot exactly one ahead is taken immediately.

use core::sync::atomic::Ordering;

#[cfg(feature = "log")]
use log::debug;

use super::engine::{DmaEngine, Guard};
use crate::driver::event::{Event, EventHandler, TxTimestamp};
use crate::internal::dma::descriptor::bits::Tdes3;

impl<const RX: usize, const TX: usize, const BUF: usize> DmaEngine<RX, TX, BUF> {
    /// Deliver every captured transmit timestamp in submission order.
    ///
    /// A stored callback takes precedence; otherwise the timestamp goes to
    /// `handler` as [`Event::TransmitTimestamp`]. Returns the number of
    /// timestamps delivered.
    ///
    /// A call made while another scan is running (the interrupt preempting
    /// a thread-mode caller) returns 0 and leaves the work to the running
    /// scan, which scans again before returning. Timestamps found by that
    /// extra pass go to the running scan's handler.
    pub fn process_completions<H: EventHandler + ?Sized>(&self, handler: &mut H) -> usize {
        let mut delivered = 0;
        loop {
            let Some(guard) = Guard::acquire(&self.completing) else {
                self.rescan.store(true, Ordering::Release);
                #[cfg(feature = "log")]
                debug!("completion scan busy, deferring to the running scan");
                return delivered;
            };
            self.rescan.store(false, Ordering::Relaxed);
            delivered += self.drain_completions(handler);
            drop(guard);

            if !self.rescan.load(Ordering::Acquire) {
                return delivered;
            }
        }
    }

    fn drain_completions<H: EventHandler + ?Sized>(&self, handler: &mut H) -> usize {
        let mut delivered = 0;
        while let Some(index) = self.next_timestamped() {
            let slot = self.tx_ring.get(index);
            let sequence = slot.ext.sequence();
            let timestamp = slot.desc.timestamp();
            let (callback, tag) = slot.ext.take_request();

            // Clearing drops TTSS so the slot is never selected twice
            slot.desc.clear();
            self.tx_state.acknowledged.store(sequence, Ordering::Relaxed);

            let stamp = TxTimestamp { timestamp, tag };
            match callback {
                Some(callback) => callback(stamp),
                None => {
                    handler.on_event(Event::TransmitTimestamp(stamp));
                }
            }
            delivered += 1;
        }
        delivered
    }

    /// Completed slot with a captured timestamp whose sequence number follows
    /// the last acknowledged one most closely.
    fn next_timestamped(&self) -> Option<usize> {
        let acknowledged = self.tx_state.acknowledged.load(Ordering::Relaxed);
        let mut best: Option<(usize, i16)> = None;

        for (index, slot) in self.tx_ring.iter().enumerate() {
            if slot.desc.is_owned() || !slot.desc.tx_status().contains(Tdes3::TTSS) {
                continue;
            }
            let delta = slot.ext.sequence().wrapping_sub(acknowledged) as i16;
            if delta == 1 {
                return Some(index);
            }
            if best.is_none_or(|(_, min)| delta < min) {
                best = Some((index, delta));
            }
        }

        best.map(|(index, _)| index)
    }
}
