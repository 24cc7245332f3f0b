//! DMA descriptor structures.
//!
//! A [`Descriptor`] is the four-word record the DMA reads and writes back. It
//! travels in a [`DescriptorSlot`] together with a software-only
//! [`DescriptorExtension`] that the DMA skips over.
//!
//! Ownership is the only synchronization between software and the DMA: bit 31
//! of word 3 set means the DMA owns the descriptor and its buffer. Every other
//! word is written before ownership is handed over, and read only after
//! ownership has come back.

pub mod bits;
mod ext;

use core::sync::atomic::{Ordering, fence};

use bits::{Rdes1, Rdes3, Tdes2, Tdes3};
pub use ext::{DescriptorExtension, DescriptorSlot, SKIP_WORDS};

use crate::driver::ptp::Timestamp;

/// Volatile cell wrapper for descriptor fields
///
/// Ensures all accesses are volatile to prevent compiler optimization
/// from reordering or caching descriptor field accesses.
#[repr(transparent)]
pub(crate) struct VolatileCell<T: Copy> {
    value: core::cell::UnsafeCell<T>,
}

// Safety: every access is a single volatile load or store of a `Copy` value;
// callers coordinate exclusive writers through the descriptor ownership bit.
unsafe impl<T: Copy> Sync for VolatileCell<T> {}

impl<T: Copy> VolatileCell<T> {
    /// Create a new volatile cell with the given initial value
    #[inline(always)]
    pub const fn new(value: T) -> Self {
        Self {
            value: core::cell::UnsafeCell::new(value),
        }
    }

    /// Read the value (volatile read)
    #[inline(always)]
    pub fn get(&self) -> T {
        // SAFETY: the pointer comes from our own UnsafeCell and is always valid
        unsafe { core::ptr::read_volatile(self.value.get()) }
    }

    /// Write a value (volatile write)
    #[inline(always)]
    pub fn set(&self, value: T) {
        // SAFETY: the pointer comes from our own UnsafeCell and is always valid
        unsafe { core::ptr::write_volatile(self.value.get(), value) }
    }
}

impl<T: Copy + Default> Default for VolatileCell<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

/// Hardware DMA descriptor (16 bytes).
///
/// The same four words serve RX and TX; the accessors below interpret them
/// according to the ring the descriptor lives in.
#[repr(C, align(4))]
pub struct Descriptor {
    des0: VolatileCell<u32>,
    des1: VolatileCell<u32>,
    des2: VolatileCell<u32>,
    des3: VolatileCell<u32>,
}

impl Descriptor {
    /// Size of the descriptor in bytes
    pub const SIZE: usize = 16;

    /// Create a zeroed, software-owned descriptor
    #[must_use]
    pub const fn new() -> Self {
        Self {
            des0: VolatileCell::new(0),
            des1: VolatileCell::new(0),
            des2: VolatileCell::new(0),
            des3: VolatileCell::new(0),
        }
    }

    /// Raw descriptor words, DES0 first
    #[must_use]
    pub fn words(&self) -> [u32; 4] {
        [self.des0.get(), self.des1.get(), self.des2.get(), self.des3.get()]
    }

    /// Check whether the DMA currently owns the descriptor
    #[inline(always)]
    #[must_use]
    pub fn is_owned(&self) -> bool {
        let owned = (self.des3.get() & Rdes3::OWN.bits()) != 0;
        if !owned {
            // The rest of the descriptor may only be read after OWN was seen clear
            fence(Ordering::Acquire);
        }
        owned
    }

    /// Zero all four words
    #[inline]
    pub fn clear(&self) {
        self.des3.set(0);
        self.des0.set(0);
        self.des1.set(0);
        self.des2.set(0);
    }

    /// Timestamp written back by the DMA (TX write-back or RX context format)
    #[inline]
    #[must_use]
    pub fn timestamp(&self) -> Timestamp {
        Timestamp::new(self.des1.get(), self.des0.get())
    }

    // =========================================================================
    // RX view
    // =========================================================================

    /// RX status word (RDES3)
    #[inline(always)]
    #[must_use]
    pub fn rx_status(&self) -> Rdes3 {
        Rdes3::from_bits_retain(self.des3.get())
    }

    /// RX extended status word (RDES1)
    #[inline(always)]
    #[must_use]
    pub fn rx_extended_status(&self) -> Rdes1 {
        Rdes1::from_bits_retain(self.des1.get())
    }

    /// Arm the descriptor for reception into `buffer`.
    ///
    /// The buffer address is restored from the extension because the DMA
    /// overwrites DES0 on write-back.
    pub fn arm_rx(&self, buffer: u32) {
        self.des0.set(buffer);
        self.des1.set(0);
        self.des2.set(0);
        fence(Ordering::Release);
        self.des3.set(Rdes3::ARMED.bits());
    }

    // =========================================================================
    // TX view
    // =========================================================================

    /// TX status word (TDES3)
    #[inline(always)]
    #[must_use]
    pub fn tx_status(&self) -> Tdes3 {
        Tdes3::from_bits_retain(self.des3.get())
    }

    /// TX control word (TDES2)
    #[inline(always)]
    #[must_use]
    pub fn tx_control(&self) -> Tdes2 {
        Tdes2::from_bits_retain(self.des2.get())
    }

    /// Fill and submit a single-descriptor frame to the DMA.
    ///
    /// Ownership is written last, after a release fence, so the DMA never
    /// observes a half-written descriptor.
    pub fn submit_tx(&self, buffer: u32, len: usize, control: Tdes2) {
        let len = len as u32;
        self.des0.set(buffer);
        self.des1.set(0);
        self.des2
            .set(control.bits() | (len & Tdes2::BUFFER1_LENGTH_MASK));
        fence(Ordering::Release);
        self.des3
            .set(Tdes3::SUBMIT.bits() | (len & Tdes3::FRAME_LENGTH_MASK));
    }

    // =========================================================================
    // Raw access (DMA side)
    // =========================================================================

    /// Overwrite the four descriptor words, DES3 last.
    ///
    /// This is what the DMA does on write-back; the driver uses it only from
    /// the test simulator.
    #[cfg(test)]
    pub(crate) fn write_back(&self, words: [u32; 4]) {
        self.des0.set(words[0]);
        self.des1.set(words[1]);
        self.des2.set(words[2]);
        fence(Ordering::Release);
        self.des3.set(words[3]);
    }
}

impl Default for Descriptor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptor_is_sixteen_bytes() {
        assert_eq!(core::mem::size_of::<Descriptor>(), Descriptor::SIZE);
    }

    #[test]
    fn new_descriptor_is_software_owned() {
        let desc = Descriptor::new();
        assert!(!desc.is_owned());
        assert_eq!(desc.words(), [0; 4]);
    }

    #[test]
    fn arm_rx_restores_buffer_and_hands_to_dma() {
        let desc = Descriptor::new();
        desc.write_back([0xDEAD, 0x4000, 0, (Rdes3::FD | Rdes3::LD).bits() | 60]);
        desc.arm_rx(0x2000_1000);
        assert_eq!(desc.words(), [0x2000_1000, 0, 0, Rdes3::ARMED.bits()]);
        assert!(desc.is_owned());
    }

    #[test]
    fn submit_tx_writes_length_into_both_words() {
        let desc = Descriptor::new();
        desc.submit_tx(0x2000_2000, 98, Tdes2::IOC | Tdes2::TTSE);
        let [des0, des1, des2, des3] = desc.words();
        assert_eq!(des0, 0x2000_2000);
        assert_eq!(des1, 0);
        assert_eq!(des2, 0xC000_0000 | 98);
        assert_eq!(des3, Tdes3::SUBMIT.bits() | 98);
        assert!(desc.is_owned());
    }

    #[test]
    fn submit_tx_without_options_leaves_control_bits_clear() {
        let desc = Descriptor::new();
        desc.submit_tx(0x100, 64, Tdes2::empty());
        let control = desc.tx_control();
        assert!(!control.contains(Tdes2::IOC));
        assert!(!control.contains(Tdes2::TTSE));
        assert_eq!(control.bits(), 64);
    }

    #[test]
    fn timestamp_reads_seconds_from_des1() {
        let desc = Descriptor::new();
        desc.write_back([123_456_789, 42, 0, 0]);
        assert_eq!(desc.timestamp(), Timestamp::new(42, 123_456_789));
    }

    #[test]
    fn clear_zeroes_all_words() {
        let desc = Descriptor::new();
        desc.write_back([1, 2, 3, 4]);
        desc.clear();
        assert_eq!(desc.words(), [0; 4]);
    }

    #[test]
    fn volatile_cell_roundtrip() {
        let cell = VolatileCell::new(5u16);
        cell.set(9);
        assert_eq!(cell.get(), 9);
    }
}
