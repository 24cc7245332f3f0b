//! Memory-mapped register definitions for the STM32H7 Ethernet peripheral
//!
//! All register blocks (MAC, MTL, DMA and the PTP timestamp unit) live in one
//! contiguous window. Offsets below are relative to that window so a single
//! [`RegisterAccess`] implementation serves every block.
//!
//! On hardware the window is accessed through [`Mmio`]; host tests substitute an
//! in-memory register file with identical field semantics.

pub mod dma;
pub mod mac;
pub mod mtl;
pub mod ptp;

/// Ethernet peripheral base address (ETH1 on STM32H742/743/753/750)
pub const ETH_BASE: usize = 0x4002_8000;

// =============================================================================
// Register Access
// =============================================================================

/// 32-bit register access at an offset from the peripheral base.
///
/// Implementations must perform every access exactly once and in program order
/// (volatile semantics); the descriptor handshake relies on it.
pub trait RegisterAccess {
    /// Read the register at `offset`
    fn read(&self, offset: usize) -> u32;

    /// Write `value` to the register at `offset`
    fn write(&self, offset: usize, value: u32);

    /// Read-modify-write the register at `offset`
    #[inline(always)]
    fn modify<F>(&self, offset: usize, f: F)
    where
        F: FnOnce(u32) -> u32,
    {
        let value = self.read(offset);
        self.write(offset, f(value));
    }

    /// Set bits in a register (read-modify-write)
    #[inline(always)]
    fn set_bits(&self, offset: usize, bits: u32) {
        self.modify(offset, |v| v | bits);
    }

    /// Clear bits in a register (read-modify-write)
    #[inline(always)]
    fn clear_bits(&self, offset: usize, bits: u32) {
        self.modify(offset, |v| v & !bits);
    }
}

impl<A: RegisterAccess + ?Sized> RegisterAccess for &A {
    #[inline(always)]
    fn read(&self, offset: usize) -> u32 {
        (**self).read(offset)
    }

    #[inline(always)]
    fn write(&self, offset: usize, value: u32) {
        (**self).write(offset, value);
    }
}

/// Volatile access to the memory-mapped Ethernet register window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mmio {
    base: usize,
}

impl Mmio {
    /// Create an accessor for the register window at `base`.
    ///
    /// # Safety
    /// `base` must be the address of an Ethernet peripheral register block and
    /// the caller must not create a second driver for the same peripheral.
    #[must_use]
    pub const unsafe fn new(base: usize) -> Self {
        Self { base }
    }

    /// Accessor for the ETH1 peripheral at [`ETH_BASE`].
    ///
    /// # Safety
    /// Same contract as [`Mmio::new`].
    #[must_use]
    pub const unsafe fn eth1() -> Self {
        Self { base: ETH_BASE }
    }

    /// Base address of the register window
    #[inline(always)]
    pub const fn base(&self) -> usize {
        self.base
    }
}

impl RegisterAccess for Mmio {
    #[inline(always)]
    fn read(&self, offset: usize) -> u32 {
        // SAFETY: the constructor contract guarantees a valid, aligned register window
        unsafe { core::ptr::read_volatile((self.base + offset) as *const u32) }
    }

    #[inline(always)]
    fn write(&self, offset: usize, value: u32) {
        // SAFETY: the constructor contract guarantees a valid, aligned register window
        unsafe { core::ptr::write_volatile((self.base + offset) as *mut u32, value) }
    }
}

// =============================================================================
// Register Access Macros
// =============================================================================

/// Generate read/write accessor methods for a register on a block view.
///
/// # Example
/// ```ignore
/// impl<A: RegisterAccess> DmaRegs<'_, A> {
///     reg_rw!(mode, set_mode, DMAMR_OFFSET, "DMA Mode register");
/// }
/// ```
macro_rules! reg_rw {
    ($read_fn:ident, $write_fn:ident, $offset:expr, $doc:expr) => {
        #[doc = concat!("Read ", $doc)]
        #[inline(always)]
        pub fn $read_fn(&self) -> u32 {
            self.0.read($offset)
        }

        #[doc = concat!("Write ", $doc)]
        #[inline(always)]
        pub fn $write_fn(&self, value: u32) {
            self.0.write($offset, value);
        }
    };
}

/// Generate a read-only accessor method for a register.
macro_rules! reg_ro {
    ($read_fn:ident, $offset:expr, $doc:expr) => {
        #[doc = concat!("Read ", $doc)]
        #[inline(always)]
        pub fn $read_fn(&self) -> u32 {
            self.0.read($offset)
        }
    };
}

/// Generate set/clear bit operation methods for a register.
///
/// # Example
/// ```ignore
/// impl<A: RegisterAccess> DmaRegs<'_, A> {
///     reg_bit_ops!(start_tx, stop_tx, DMACTCR_OFFSET, DMACTCR_ST,
///                  "TX DMA", "Start", "Stop");
/// }
/// ```
macro_rules! reg_bit_ops {
    ($set_fn:ident, $clear_fn:ident, $offset:expr, $bit:expr, $what:expr, $set_verb:expr, $clear_verb:expr) => {
        #[doc = concat!($set_verb, " ", $what)]
        #[inline(always)]
        pub fn $set_fn(&self) {
            self.0.set_bits($offset, $bit);
        }

        #[doc = concat!($clear_verb, " ", $what)]
        #[inline(always)]
        pub fn $clear_fn(&self) {
            self.0.clear_bits($offset, $bit);
        }
    };
}

/// Generate a bit check method (inverted - true when bit is clear).
macro_rules! reg_bit_check_clear {
    ($fn:ident, $offset:expr, $bit:expr, $doc:expr) => {
        #[doc = $doc]
        #[inline(always)]
        pub fn $fn(&self) -> bool {
            (self.0.read($offset) & $bit) == 0
        }
    };
}

// Export macros for use in submodules
pub(crate) use reg_bit_check_clear;
pub(crate) use reg_bit_ops;
pub(crate) use reg_ro;
pub(crate) use reg_rw;
