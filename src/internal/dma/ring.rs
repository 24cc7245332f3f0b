//! Fixed-length circular descriptor ring.

use super::descriptor::DescriptorSlot;

/// Circular array of ring slots shared with one DMA channel.
///
/// The ring holds no cursor of its own: the hardware position comes from the
/// channel's current-descriptor register and the transmit cursor lives in the
/// engine's atomic state.
#[repr(C, align(4))]
pub struct DescriptorRing<const N: usize> {
    slots: [DescriptorSlot; N],
}

impl<const N: usize> DescriptorRing<N> {
    /// Create a ring of zeroed, software-owned slots
    #[must_use]
    pub const fn new() -> Self {
        Self {
            slots: [const { DescriptorSlot::new() }; N],
        }
    }

    /// Get the number of slots in the ring
    #[inline(always)]
    #[must_use]
    pub const fn len(&self) -> usize {
        N
    }

    /// Check if the ring is empty (only for a zero-sized ring)
    #[inline(always)]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        N == 0
    }

    /// Get the slot at `index`, wrapping around
    #[inline(always)]
    pub fn get(&self, index: usize) -> &DescriptorSlot {
        &self.slots[index % N]
    }

    /// Index following `index`
    #[inline(always)]
    #[must_use]
    pub const fn next_index(index: usize) -> usize {
        (index + 1) % N
    }

    /// Index preceding `index`
    #[inline(always)]
    #[must_use]
    pub const fn prev_index(index: usize) -> usize {
        (index + N - 1) % N
    }

    /// Index `n` slots after `index`
    #[inline(always)]
    #[must_use]
    pub const fn advance(index: usize, n: usize) -> usize {
        (index + n) % N
    }

    /// Get the base address as u32 (for DMA register)
    #[inline(always)]
    pub fn base_addr_u32(&self) -> u32 {
        self.slots.as_ptr() as u32
    }

    /// Address of the slot at `index` as seen by the DMA
    #[inline(always)]
    pub fn slot_addr_u32(&self, index: usize) -> u32 {
        self.get(index) as *const DescriptorSlot as u32
    }

    /// Convert a descriptor address reported by the DMA to a ring index.
    ///
    /// Returns `None` if the address is outside the ring or not on a slot
    /// boundary.
    pub fn index_of(&self, addr: u32) -> Option<usize> {
        let offset = addr.wrapping_sub(self.base_addr_u32()) as usize;
        if offset % DescriptorSlot::SIZE != 0 {
            return None;
        }
        let index = offset / DescriptorSlot::SIZE;
        (index < N).then_some(index)
    }

    /// Iterate over all slots
    pub fn iter(&self) -> impl Iterator<Item = &DescriptorSlot> {
        self.slots.iter()
    }
}

// =============================================================================
// Tests
// =============================================================================
