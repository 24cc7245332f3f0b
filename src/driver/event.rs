//! Events delivered to the application and the transmit options that
//! request them.

use crate::driver::link::LinkProperties;
use crate::driver::ptp::Timestamp;

/// A received frame, borrowed from the driver for the duration of the upcall.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RxFrame<'a> {
    data: &'a [u8],
    timestamp: Option<Timestamp>,
}

impl<'a> RxFrame<'a> {
    /// Wrap frame bytes and an optional receive timestamp
    #[must_use]
    pub const fn new(data: &'a [u8], timestamp: Option<Timestamp>) -> Self {
        Self { data, timestamp }
    }

    /// Frame bytes, without the FCS
    #[must_use]
    pub const fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Frame length in bytes
    #[must_use]
    pub const fn len(&self) -> usize {
        self.data.len()
    }

    /// Check whether the frame holds no bytes
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Receive timestamp, when the hardware captured one
    #[must_use]
    pub const fn timestamp(&self) -> Option<Timestamp> {
        self.timestamp
    }
}

/// Hardware transmit timestamp matched to the frame that produced it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TxTimestamp {
    /// Time the frame left the MAC
    pub timestamp: Timestamp,
    /// Tag supplied with the timestamp request
    pub tag: u32,
}

/// Event delivered to an [`EventHandler`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event<'a> {
    /// The receive interrupt fired; call `process_received`
    ReceiveReady,
    /// A complete frame is available
    FrameAvailable(RxFrame<'a>),
    /// A transmit timestamp without a stored callback was correlated
    TransmitTimestamp(TxTimestamp),
    /// The link came up, went down or was reported for the first time
    LinkChanged(LinkProperties),
}

/// How the handler disposed of an event.
///
/// Only [`Event::FrameAvailable`] looks at the disposition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Disposition {
    /// The frame was consumed; its descriptors are re-armed
    #[default]
    Accepted,
    /// The frame was discarded; its descriptors are re-armed
    Dropped,
    /// The frame cannot be taken now; it stays in the ring and the receive
    /// walk stops until the next call
    Retry,
}

/// Receiver of driver events.
///
/// Implemented for any `FnMut(Event<'_>) -> Disposition`.
pub trait EventHandler {
    /// Handle one event
    fn on_event(&mut self, event: Event<'_>) -> Disposition;
}

impl<F> EventHandler for F
where
    F: FnMut(Event<'_>) -> Disposition,
{
    fn on_event(&mut self, event: Event<'_>) -> Disposition {
        self(event)
    }
}

/// Function invoked with a transmit timestamp once it has been correlated
pub type TimestampCallback = fn(TxTimestamp);

/// Where a correlated transmit timestamp is delivered
#[derive(Debug, Clone, Copy)]
pub struct TimestampRequest {
    /// Opaque tag handed back with the timestamp
    pub tag: u32,
    /// Function to call; `None` delivers [`Event::TransmitTimestamp`] instead
    pub callback: Option<TimestampCallback>,
}

impl TimestampRequest {
    /// Deliver the timestamp as an event
    #[must_use]
    pub const fn new(tag: u32) -> Self {
        Self {
            tag,
            callback: None,
        }
    }

    /// Deliver the timestamp by calling `callback`
    #[must_use]
    pub const fn with_callback(callback: TimestampCallback, tag: u32) -> Self {
        Self {
            tag,
            callback: Some(callback),
        }
    }
}

/// Per-frame transmit options
#[derive(Debug, Clone, Copy, Default)]
pub enum TxOptions {
    /// Plain transmission
    #[default]
    None,
    /// Raise the transmit interrupt when the frame has been sent
    InterruptOnCompletion,
    /// Raise the transmit interrupt and capture the departure time
    CaptureTimestamp(TimestampRequest),
}

impl TxOptions {
    /// Check whether a timestamp will be captured
    #[must_use]
    pub const fn captures_timestamp(&self) -> bool {
        matches!(self, TxOptions::CaptureTimestamp(_))
    }
}
