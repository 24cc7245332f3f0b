//! DMA engine owning both descriptor rings, the buffer arena and the transmit
//! bookkeeping.
//!
//! Every operation takes `&self`. Exclusive access to a descriptor and its
//! buffer is established by the ownership bit; the receive walk and the
//! completion scan are additionally protected by non-reentrancy guards.

use core::cell::UnsafeCell;
use core::sync::atomic::{AtomicBool, AtomicU16, AtomicUsize, Ordering};

use super::descriptor::{DescriptorSlot, SKIP_WORDS};
use super::ring::DescriptorRing;
use crate::internal::constants::{MAX_DESCRIPTOR_LENGTH, MAX_FRAME_SIZE};
use crate::internal::register::RegisterAccess;
use crate::internal::register::dma::{
    DMACCR_DSL_MASK, DMACCR_DSL_SHIFT, DMACRCR_RBSZ_MASK, DMACRCR_RBSZ_SHIFT, DMACRCR_RPBL_MASK,
    DMACRCR_RPBL_SHIFT, DMACTCR_TPBL_MASK, DMACTCR_TPBL_SHIFT, DmaRegs, RING_LEN_MASK,
};

/// One word-aligned DMA buffer.
#[repr(C, align(4))]
pub(crate) struct Block<const N: usize>(UnsafeCell<[u8; N]>);

impl<const N: usize> Block<N> {
    const fn new() -> Self {
        Self(UnsafeCell::new([0; N]))
    }

    /// Address of the first byte as seen by the DMA
    #[inline(always)]
    pub(crate) fn addr_u32(&self) -> u32 {
        self.0.get() as u32
    }

    #[inline(always)]
    pub(crate) fn as_ptr(&self) -> *mut u8 {
        self.0.get().cast::<u8>()
    }
}

/// Flat buffer arena: all RX blocks followed by all TX blocks.
#[repr(C)]
struct BufferArena<const RX: usize, const TX: usize, const BUF: usize> {
    rx: [Block<BUF>; RX],
    tx: [Block<BUF>; TX],
}

/// Transmit bookkeeping.
///
/// `submitted` is written only by the submission path and `acknowledged` only
/// by the completion path, so plain loads and stores are sufficient.
pub(crate) struct TxState {
    /// Next slot the submission path will fill
    pub(crate) next_slot: AtomicUsize,
    /// Sequence number of the last submitted frame
    pub(crate) submitted: AtomicU16,
    /// Sequence number of the last timestamp delivered
    pub(crate) acknowledged: AtomicU16,
}

impl TxState {
    const fn new() -> Self {
        Self {
            next_slot: AtomicUsize::new(0),
            submitted: AtomicU16::new(0),
            acknowledged: AtomicU16::new(0),
        }
    }

    fn reset(&self) {
        self.next_slot.store(0, Ordering::Relaxed);
        self.submitted.store(0, Ordering::Relaxed);
        self.acknowledged.store(0, Ordering::Relaxed);
    }
}

/// DMA Engine with statically allocated rings and buffers.
///
/// # Type Parameters
/// * `RX` - Number of receive descriptors/buffers
/// * `TX` - Number of transmit descriptors/buffers
/// * `BUF` - Size of each buffer in bytes (multiple of 4, at most 0x3FFF)
pub struct DmaEngine<const RX: usize, const TX: usize, const BUF: usize> {
    pub(crate) rx_ring: DescriptorRing<RX>,
    pub(crate) tx_ring: DescriptorRing<TX>,
    buffers: BufferArena<RX, TX, BUF>,
    /// Reassembly buffer for multi-descriptor frames
    scratch: Block<MAX_FRAME_SIZE>,
    pub(crate) tx_state: TxState,
    /// Held while the receive walk runs
    pub(crate) rx_busy: AtomicBool,
    /// Held while the completion scan runs
    pub(crate) completing: AtomicBool,
    /// A scan was requested while another one held `completing`
    pub(crate) rescan: AtomicBool,
}

// SAFETY: buffers are only touched by the side that holds the descriptor
// ownership bit, and the two scanning paths are guarded against reentry.
unsafe impl<const RX: usize, const TX: usize, const BUF: usize> Sync for DmaEngine<RX, TX, BUF> {}

impl<const RX: usize, const TX: usize, const BUF: usize> DmaEngine<RX, TX, BUF> {
    const GEOMETRY: () = {
        assert!(RX > 0, "RX ring must not be empty");
        assert!(TX > 0, "TX ring must not be empty");
        assert!(RX <= RING_LEN_MASK as usize + 1, "RX ring too long");
        assert!(TX <= RING_LEN_MASK as usize + 1, "TX ring too long");
        assert!(BUF > 0 && BUF % 4 == 0, "buffer size must be a non-zero multiple of 4");
        assert!(BUF <= MAX_DESCRIPTOR_LENGTH, "buffer size exceeds descriptor length field");
    };

    /// Create a new DMA engine with zeroed rings and buffers. Const-compatible.
    #[must_use]
    pub const fn new() -> Self {
        let () = Self::GEOMETRY;
        Self {
            rx_ring: DescriptorRing::new(),
            tx_ring: DescriptorRing::new(),
            buffers: BufferArena {
                rx: [const { Block::new() }; RX],
                tx: [const { Block::new() }; TX],
            },
            scratch: Block::new(),
            tx_state: TxState::new(),
            rx_busy: AtomicBool::new(false),
            completing: AtomicBool::new(false),
            rescan: AtomicBool::new(false),
        }
    }

    /// Total memory usage in bytes.
    #[must_use]
    pub const fn memory_usage() -> usize {
        let descriptors = (RX + TX) * DescriptorSlot::SIZE;
        let buffers = (RX + TX) * BUF;
        descriptors + buffers + MAX_FRAME_SIZE
    }

    /// Lay out buffers, arm the RX ring, clear the TX ring and program both
    /// rings into the DMA channel. The channel is not started.
    ///
    /// Must not run while the DMA is active.
    pub fn init<A: RegisterAccess>(&self, regs: &A, burst_len: u32) {
        for (index, block) in self.buffers.rx.iter().enumerate() {
            let slot = self.rx_ring.get(index);
            slot.ext.set_buffer(block.addr_u32());
            slot.ext.set_sequence(0);
            slot.ext.set_request(None, 0);
            slot.desc.arm_rx(block.addr_u32());
        }

        for (index, block) in self.buffers.tx.iter().enumerate() {
            let slot = self.tx_ring.get(index);
            slot.desc.clear();
            slot.ext.set_buffer(block.addr_u32());
            slot.ext.set_sequence(0);
            slot.ext.set_request(None, 0);
        }

        self.tx_state.reset();

        let dma = DmaRegs(regs);
        dma.set_channel_control((SKIP_WORDS << DMACCR_DSL_SHIFT) & DMACCR_DSL_MASK);
        dma.set_tx_control((burst_len << DMACTCR_TPBL_SHIFT) & DMACTCR_TPBL_MASK);
        dma.set_rx_control(
            ((burst_len << DMACRCR_RPBL_SHIFT) & DMACRCR_RPBL_MASK)
                | (((BUF as u32) << DMACRCR_RBSZ_SHIFT) & DMACRCR_RBSZ_MASK),
        );

        dma.set_tx_ring_length((TX as u32 - 1) & RING_LEN_MASK);
        dma.set_tx_desc_list_addr(self.tx_ring.base_addr_u32());
        dma.set_rx_ring_length((RX as u32 - 1) & RING_LEN_MASK);
        dma.set_rx_desc_list_addr(self.rx_ring.base_addr_u32());

        // Zero never matches a ring address, so the channels never catch up
        // with the tail pointer
        dma.set_tx_tail_pointer(0);
        dma.set_rx_tail_pointer(0);
    }

    /// Number of TX slots not owned by the DMA
    pub fn tx_available(&self) -> usize {
        self.tx_ring.iter().filter(|slot| !slot.desc.is_owned()).count()
    }

    /// Number of RX slots armed for the DMA
    pub fn rx_free_count(&self) -> usize {
        self.rx_ring.iter().filter(|slot| slot.desc.is_owned()).count()
    }

    /// Sequence number of the last submitted frame
    pub fn submitted(&self) -> u16 {
        self.tx_state.submitted.load(Ordering::Relaxed)
    }

    /// Sequence number of the last delivered transmit timestamp
    pub fn acknowledged(&self) -> u16 {
        self.tx_state.acknowledged.load(Ordering::Relaxed)
    }

    // =========================================================================
    // Buffer access
    // =========================================================================

    /// Received bytes in RX block `index`.
    ///
    /// # Safety
    /// The caller must hold software ownership of RX descriptor `index` for the
    /// lifetime of the returned slice.
    pub(crate) unsafe fn rx_data(&self, index: usize, len: usize) -> &[u8] {
        let len = len.min(BUF);
        // SAFETY: the block is BUF bytes long and the DMA does not write it
        // while software owns the descriptor
        unsafe { core::slice::from_raw_parts(self.buffers.rx[index % RX].as_ptr(), len) }
    }

    /// Copy `frame` into TX block `index`.
    ///
    /// # Safety
    /// The caller must hold software ownership of TX descriptor `index` and
    /// `frame` must fit in one block.
    pub(crate) unsafe fn fill_tx(&self, index: usize, frame: &[u8]) {
        let len = frame.len().min(BUF);
        // SAFETY: the block is BUF bytes long and idle while software owns it
        unsafe {
            core::ptr::copy_nonoverlapping(frame.as_ptr(), self.buffers.tx[index % TX].as_ptr(), len);
        }
    }

    /// Gather consecutive RX blocks starting at `first` into the reassembly
    /// buffer and return the first `len` bytes.
    ///
    /// # Safety
    /// The caller must hold the receive guard and software ownership of every
    /// descriptor in the span, and `len` must not exceed `MAX_FRAME_SIZE`.
    pub(crate) unsafe fn reassemble(&self, first: usize, len: usize) -> &[u8] {
        let len = len.min(MAX_FRAME_SIZE);
        let mut copied = 0;
        let mut index = first;
        while copied < len {
            let chunk = (len - copied).min(BUF);
            // SAFETY: both regions are in bounds and never overlap
            unsafe {
                core::ptr::copy_nonoverlapping(
                    self.buffers.rx[index % RX].as_ptr(),
                    self.scratch.as_ptr().add(copied),
                    chunk,
                );
            }
            copied += chunk;
            index = DescriptorRing::<RX>::next_index(index);
        }
        // SAFETY: only the receive walk writes the scratch buffer
        unsafe { core::slice::from_raw_parts(self.scratch.as_ptr(), len) }
    }

    /// Start of RX block `index`, for the DMA simulator
    #[cfg(test)]
    pub(crate) fn rx_block_ptr(&self, index: usize) -> *mut u8 {
        self.buffers.rx[index % RX].as_ptr()
    }

    /// Start of TX block `index`, for the DMA simulator
    #[cfg(test)]
    pub(crate) fn tx_block_ptr(&self, index: usize) -> *mut u8 {
        self.buffers.tx[index % TX].as_ptr()
    }
}

impl<const RX: usize, const TX: usize, const BUF: usize> Default for DmaEngine<RX, TX, BUF> {
    fn default() -> Self {
        Self::new()
    }
}

/// Scoped hold on one of the engine's non-reentrancy flags.
pub(crate) struct Guard<'a>(&'a AtomicBool);

impl<'a> Guard<'a> {
    /// Take the flag, or `None` if it is already held
    pub(crate) fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for Guard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

// =============================================================================
// Tests
// =============================================================================
