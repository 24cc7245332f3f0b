//! Software-only descriptor extension and the ring slot layout.

use core::mem::size_of;

use super::{Descriptor, VolatileCell};
use crate::driver::event::TimestampCallback;
use crate::internal::register::dma::DMACCR_DSL_MAX;

/// Per-descriptor bookkeeping that the DMA never touches.
///
/// The DMA steps over it using the channel's descriptor skip length, so its
/// size must be a whole number of 32-bit words.
#[repr(C)]
pub struct DescriptorExtension {
    /// Buffer address assigned at init; DES0 is clobbered on write-back
    buffer: VolatileCell<u32>,
    /// Transmit sequence number
    sequence: VolatileCell<u16>,
    _pad: u16,
    /// Timestamp callback stored by the transmit path
    callback: VolatileCell<Option<TimestampCallback>>,
    /// Opaque tag handed back with the timestamp
    tag: VolatileCell<u32>,
}

impl DescriptorExtension {
    /// Create an empty extension
    #[must_use]
    pub const fn new() -> Self {
        Self {
            buffer: VolatileCell::new(0),
            sequence: VolatileCell::new(0),
            _pad: 0,
            callback: VolatileCell::new(None),
            tag: VolatileCell::new(0),
        }
    }

    /// Buffer address owned by this slot
    #[inline(always)]
    #[must_use]
    pub fn buffer(&self) -> u32 {
        self.buffer.get()
    }

    /// Record the buffer address owned by this slot
    #[inline(always)]
    pub fn set_buffer(&self, addr: u32) {
        self.buffer.set(addr);
    }

    /// Sequence number of the frame last submitted through this slot
    #[inline(always)]
    #[must_use]
    pub fn sequence(&self) -> u16 {
        self.sequence.get()
    }

    /// Stamp a sequence number
    #[inline(always)]
    pub fn set_sequence(&self, sequence: u16) {
        self.sequence.set(sequence);
    }

    /// Pending timestamp tag
    #[inline(always)]
    #[must_use]
    pub fn tag(&self) -> u32 {
        self.tag.get()
    }

    /// Pending timestamp callback
    #[inline(always)]
    #[must_use]
    pub fn callback(&self) -> Option<TimestampCallback> {
        self.callback.get()
    }

    /// Store the timestamp delivery request for the next frame
    pub fn set_request(&self, callback: Option<TimestampCallback>, tag: u32) {
        self.callback.set(callback);
        self.tag.set(tag);
    }

    /// Take the stored request, leaving the extension without one
    pub fn take_request(&self) -> (Option<TimestampCallback>, u32) {
        let request = (self.callback.get(), self.tag.get());
        self.set_request(None, 0);
        request
    }
}

impl Default for DescriptorExtension {
    fn default() -> Self {
        Self::new()
    }
}

/// One ring entry: the hardware descriptor followed by its extension.
#[repr(C)]
pub struct DescriptorSlot {
    /// Hardware-visible descriptor
    pub desc: Descriptor,
    /// Software-only bookkeeping
    pub ext: DescriptorExtension,
}

impl DescriptorSlot {
    /// Size of one slot in bytes (the DMA stride)
    pub const SIZE: usize = size_of::<Self>();

    /// Create a zeroed slot
    #[must_use]
    pub const fn new() -> Self {
        Self {
            desc: Descriptor::new(),
            ext: DescriptorExtension::new(),
        }
    }
}

impl Default for DescriptorSlot {
    fn default() -> Self {
        Self::new()
    }
}

/// Words the DMA skips after each descriptor (DMACCR.DSL)
pub const SKIP_WORDS: u32 = ((DescriptorSlot::SIZE - Descriptor::SIZE) / 4) as u32;

const _: () = assert!(
    DescriptorSlot::SIZE % 4 == 0,
    "descriptor slot must be a whole number of words"
);
const _: () = assert!(
    (DescriptorSlot::SIZE - Descriptor::SIZE) % 4 == 0,
    "descriptor extension must be a whole number of words"
);
const _: () = assert!(
    SKIP_WORDS <= DMACCR_DSL_MAX,
    "descriptor extension exceeds the DMA skip length field"
);
