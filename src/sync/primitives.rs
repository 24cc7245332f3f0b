//! Critical-section protected cell.
//!
//! The dispatcher runs in the Ethernet interrupt while the application polls
//! links and transmits from thread mode; both deliver events to the same
//! handler. [`CriticalSectionCell`] lets a single handler live in a `static`
//! and be borrowed from either side.

use core::cell::RefCell;

use critical_section::Mutex;

use crate::driver::event::{Disposition, Event, EventHandler};

/// Cell providing interior mutability with critical section protection.
///
/// Combines `critical_section::Mutex` with `RefCell` for safe mutable access
/// from both normal code and interrupt handlers.
pub struct CriticalSectionCell<T> {
    inner: Mutex<RefCell<T>>,
}

impl<T> CriticalSectionCell<T> {
    /// Create a new cell (const, suitable for static initialization).
    pub const fn new(value: T) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(value)),
        }
    }

    /// Execute a closure with exclusive mutable access.
    ///
    /// Interrupts are disabled for the duration of the closure. Panics if the
    /// value is already borrowed, which only happens when `f` re-enters the
    /// same cell.
    #[inline]
    pub fn with<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&mut T) -> R,
    {
        critical_section::with(|cs| {
            let mut value = self.inner.borrow_ref_mut(cs);
            f(&mut value)
        })
    }

    /// Try to execute a closure, returning `None` if already borrowed.
    #[inline]
    pub fn try_with<R, F>(&self, f: F) -> Option<R>
    where
        F: FnOnce(&mut T) -> R,
    {
        critical_section::with(|cs| {
            self.inner
                .borrow(cs)
                .try_borrow_mut()
                .ok()
                .map(|mut value| f(&mut value))
        })
    }
}

impl<T: Default> Default for CriticalSectionCell<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> core::fmt::Debug for CriticalSectionCell<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CriticalSectionCell").finish_non_exhaustive()
    }
}

/// A shared handler receives each event inside one critical section.
///
/// An event delivered while the handler is already borrowed (the upcall
/// re-entered the driver) is answered with [`Disposition::Retry`], leaving a
/// received frame in the ring for the next walk.
impl<H: EventHandler> EventHandler for &CriticalSectionCell<H> {
    fn on_event(&mut self, event: Event<'_>) -> Disposition {
        self.try_with(|handler| handler.on_event(event))
            .unwrap_or(Disposition::Retry)
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use std::vec::Vec;

    use super::*;
    use crate::driver::event::TxTimestamp;
    use crate::driver::ptp::Timestamp;

    #[derive(Default)]
    struct Counter {
        events: usize,
        tags: Vec<u32>,
    }

    impl EventHandler for Counter {
        fn on_event(&mut self, event: Event<'_>) -> Disposition {
            self.events += 1;
            if let Event::TransmitTimestamp(ts) = event {
                self.tags.push(ts.tag);
            }
            Disposition::Accepted
        }
    }

    #[test]
    fn with_mutates_and_returns() {
        let cell = CriticalSectionCell::new(40u32);
        let doubled = cell.with(|v| {
            *v += 2;
            *v * 2
        });
        assert_eq!(doubled, 84);
        assert_eq!(cell.with(|v| *v), 42);
    }

    #[test]
    fn try_with_fails_while_borrowed() {
        let cell = CriticalSectionCell::new(0u32);
        let nested = cell.with(|_| cell.try_with(|v| *v));
        assert_eq!(nested, None);
        assert_eq!(cell.try_with(|v| *v), Some(0));
    }

    #[test]
    fn shared_handler_forwards_events() {
        let cell = CriticalSectionCell::new(Counter::default());
        let mut shared = &cell;
        let ts = TxTimestamp {
            tag: 7,
            timestamp: Timestamp::new(1, 2),
        };
        assert_eq!(shared.on_event(Event::TransmitTimestamp(ts)), Disposition::Accepted);
        assert_eq!(shared.on_event(Event::ReceiveReady), Disposition::Accepted);
        cell.with(|counter| {
            assert_eq!(counter.events, 2);
            assert_eq!(counter.tags, [7]);
        });
    }

    #[test]
    fn reentrant_delivery_is_rejected() {
        let cell = CriticalSectionCell::new(Counter::default());
        let disposition = cell.with(|_| {
            let mut shared = &cell;
            shared.on_event(Event::ReceiveReady)
        });
        assert_eq!(disposition, Disposition::Retry);
        assert_eq!(cell.with(|counter| counter.events), 0);
    }
}
