//! Testing utilities and mock implementations
//!
//! Host-side stand-ins for the peripheral: an in-memory register file with
//! the write semantics the driver depends on, a delay that only counts, and
//! an MDIO bus backed by a register map.
//!
//! Only available when running `cargo test`.

#![allow(missing_docs)]
#![allow(clippy::std_instead_of_core, clippy::std_instead_of_alloc)]

extern crate std;

use core::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::vec::Vec;

use crate::driver::config::{Duplex, Speed};
use crate::driver::error::{IoError, Result};
use crate::hal::mdio::MdioBus;
use crate::internal::phy_regs::{BMCR, BMSR, Bmcr, Bmsr};
use crate::internal::register::RegisterAccess;
use crate::internal::register::dma::{DMACSR_OFFSET, DMAMR_OFFSET, DMAMR_SWR};
use crate::internal::register::mac::{MACMDIOAR_MB, MACMDIOAR_OFFSET};
use crate::internal::register::ptp::{
    MACPPSCR_OFFSET, MACPPSCR_PPSCTRL_MASK, MACPPSCR_PPSEN0, MACTSCR_OFFSET, MACTSCR_TSADDREG,
    MACTSCR_TSINIT, MACTSCR_TSUPDT,
};

// =============================================================================
// Mock Registers
// =============================================================================

/// Bits of `value` that hardware clears right after software writes it to
/// `offset`
fn self_clearing(offset: usize, value: u32) -> u32 {
    match offset {
        DMAMR_OFFSET => DMAMR_SWR,
        MACMDIOAR_OFFSET => MACMDIOAR_MB,
        MACTSCR_OFFSET => MACTSCR_TSINIT | MACTSCR_TSUPDT | MACTSCR_TSADDREG,
        // The low nibble is a command only in pulse-train mode; otherwise it
        // holds the fixed PPS frequency
        MACPPSCR_OFFSET if value & MACPPSCR_PPSEN0 != 0 => MACPPSCR_PPSCTRL_MASK,
        _ => 0,
    }
}

#[derive(Debug, Default)]
struct RegisterFile {
    values: HashMap<usize, u32>,
    queued: HashMap<usize, VecDeque<u32>>,
    held: HashMap<usize, u32>,
    writes: Vec<(usize, u32)>,
}

/// In-memory register window.
///
/// Writes through [`RegisterAccess`] are logged and follow hardware
/// semantics: DMACSR is write-1-to-clear and command bits such as DMAMR.SWR
/// or MACMDIOAR.MB read back as clear unless [`hold_bits`](Self::hold_bits)
/// pins them. [`preset`](Self::preset) plays the hardware side and bypasses
/// both the log and the write semantics.
#[derive(Debug, Default)]
pub struct MockRegisters {
    inner: Mutex<RegisterFile>,
}

impl MockRegisters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a register value as hardware would
    pub fn preset(&self, offset: usize, value: u32) {
        self.inner.lock().unwrap().values.insert(offset, value);
    }

    /// Return `values` from the next reads of `offset`, oldest first
    pub fn queue_reads(&self, offset: usize, values: &[u32]) {
        self.inner
            .lock()
            .unwrap()
            .queued
            .entry(offset)
            .or_default()
            .extend(values.iter().copied());
    }

    /// Keep self-clearing `bits` of `offset` set once written
    pub fn hold_bits(&self, offset: usize, bits: u32) {
        *self.inner.lock().unwrap().held.entry(offset).or_default() |= bits;
    }

    /// Every software write so far, as `(offset, value)`
    pub fn writes(&self) -> Vec<(usize, u32)> {
        self.inner.lock().unwrap().writes.clone()
    }

    /// Software writes to one register, in order
    pub fn writes_to(&self, offset: usize) -> Vec<u32> {
        self.inner
            .lock()
            .unwrap()
            .writes
            .iter()
            .filter(|(o, _)| *o == offset)
            .map(|(_, v)| *v)
            .collect()
    }

    pub fn clear_writes(&self) {
        self.inner.lock().unwrap().writes.clear();
    }
}

impl RegisterAccess for MockRegisters {
    fn read(&self, offset: usize) -> u32 {
        let mut file = self.inner.lock().unwrap();
        if let Some(value) = file.queued.get_mut(&offset).and_then(VecDeque::pop_front) {
            return value;
        }
        file.values.get(&offset).copied().unwrap_or(0)
    }

    fn write(&self, offset: usize, value: u32) {
        let mut file = self.inner.lock().unwrap();
        file.writes.push((offset, value));

        let stored = if offset == DMACSR_OFFSET {
            file.values.get(&offset).copied().unwrap_or(0) & !value
        } else {
            let held = file.held.get(&offset).copied().unwrap_or(0);
            value & !(self_clearing(offset, value) & !held)
        };
        file.values.insert(offset, stored);
    }
}

// =============================================================================
// Mock MDIO Bus
// =============================================================================

/// Mock MDIO bus for testing PHY logic without hardware
#[derive(Debug, Default)]
pub struct MockMdioBus {
    /// Register values: (phy_addr, reg_addr) -> value
    registers: RefCell<HashMap<(u8, u8), u16>>,
    /// Record of writes: (phy_addr, reg_addr, value)
    write_log: RefCell<Vec<(u8, u8, u16)>>,
    /// Whether the bus should report as busy
    busy: RefCell<bool>,
}

impl MockMdioBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_register(&self, phy_addr: u8, reg_addr: u8, value: u16) {
        self.registers
            .borrow_mut()
            .insert((phy_addr, reg_addr), value);
    }

    pub fn get_register(&self, phy_addr: u8, reg_addr: u8) -> Option<u16> {
        self.registers.borrow().get(&(phy_addr, reg_addr)).copied()
    }

    pub fn get_writes(&self) -> Vec<(u8, u8, u16)> {
        self.write_log.borrow().clone()
    }

    /// A busy bus fails every access with `IoError::PhyError`
    pub fn set_busy(&self, busy: bool) {
        *self.busy.borrow_mut() = busy;
    }

    /// Report link up at `speed`/`duplex`
    pub fn simulate_link_up(&self, phy_addr: u8, speed: Speed, duplex: Duplex) {
        let mut bmcr = Bmcr::AN_ENABLE;
        if speed == Speed::Mbps100 {
            bmcr |= Bmcr::SPEED_100;
        }
        if duplex == Duplex::Full {
            bmcr |= Bmcr::DUPLEX_FULL;
        }
        self.set_register(phy_addr, BMCR, bmcr.bits());
        self.set_register(
            phy_addr,
            BMSR,
            (Bmsr::LINK_STATUS | Bmsr::AN_COMPLETE | Bmsr::TX_FD_CAPABLE).bits(),
        );
    }

    /// Report link down
    pub fn simulate_link_down(&self, phy_addr: u8) {
        self.set_register(phy_addr, BMSR, Bmsr::TX_FD_CAPABLE.bits());
    }
}

impl MdioBus for MockMdioBus {
    fn read(&mut self, phy_addr: u8, reg_addr: u8) -> Result<u16> {
        if self.is_busy() {
            return Err(IoError::PhyError.into());
        }
        Ok(self
            .registers
            .borrow()
            .get(&(phy_addr, reg_addr))
            .copied()
            .unwrap_or(0))
    }

    fn write(&mut self, phy_addr: u8, reg_addr: u8, value: u16) -> Result<()> {
        if self.is_busy() {
            return Err(IoError::PhyError.into());
        }
        self.write_log
            .borrow_mut()
            .push((phy_addr, reg_addr, value));
        self.registers
            .borrow_mut()
            .insert((phy_addr, reg_addr), value);
        Ok(())
    }

    fn is_busy(&self) -> bool {
        *self.busy.borrow()
    }
}

// =============================================================================
// Mock Delay
// =============================================================================

/// Mock delay that records requested time without waiting
#[derive(Debug, Default)]
pub struct MockDelay {
    total_ns: RefCell<u64>,
}

impl MockDelay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total_ns(&self) -> u64 {
        *self.total_ns.borrow()
    }

    pub fn total_us(&self) -> u64 {
        self.total_ns() / 1_000
    }
}

impl embedded_hal::delay::DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        *self.total_ns.borrow_mut() += u64::from(ns);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::delay::DelayNs;

    #[test]
    fn status_register_is_write_one_to_clear() {
        let regs = MockRegisters::new();
        regs.preset(DMACSR_OFFSET, 0b1011);
        regs.write(DMACSR_OFFSET, 0b0001);
        assert_eq!(regs.read(DMACSR_OFFSET), 0b1010);
        assert_eq!(regs.writes(), [(DMACSR_OFFSET, 0b0001)]);
    }

    #[test]
    fn command_bits_self_clear_unless_held() {
        let regs = MockRegisters::new();
        regs.write(DMAMR_OFFSET, DMAMR_SWR | (1 << 4));
        assert_eq!(regs.read(DMAMR_OFFSET), 1 << 4);

        regs.hold_bits(DMAMR_OFFSET, DMAMR_SWR);
        regs.write(DMAMR_OFFSET, DMAMR_SWR);
        assert_eq!(regs.read(DMAMR_OFFSET), DMAMR_SWR);
    }

    #[test]
    fn pps_command_clears_only_in_pulse_train_mode() {
        let regs = MockRegisters::new();
        regs.write(MACPPSCR_OFFSET, 0x60 | 5);
        assert_eq!(regs.read(MACPPSCR_OFFSET), 0x65);
        regs.write(MACPPSCR_OFFSET, MACPPSCR_PPSEN0 | 5);
        assert_eq!(regs.read(MACPPSCR_OFFSET), MACPPSCR_PPSEN0);
    }

    #[test]
    fn queued_reads_come_first() {
        let regs = MockRegisters::new();
        regs.preset(0x40, 9);
        regs.queue_reads(0x40, &[1, 2]);
        assert_eq!(regs.read(0x40), 1);
        assert_eq!(regs.read(0x40), 2);
        assert_eq!(regs.read(0x40), 9);
    }

    #[test]
    fn preset_is_not_logged() {
        let regs = MockRegisters::new();
        regs.preset(0x10, 5);
        assert!(regs.writes().is_empty());
        regs.write(0x10, 6);
        regs.write(0x14, 7);
        assert_eq!(regs.writes_to(0x10), [6]);
        regs.clear_writes();
        assert!(regs.writes().is_empty());
    }

    #[test]
    fn mdio_mock_busy_fails_access() {
        let mut mdio = MockMdioBus::new();
        mdio.set_register(1, 2, 0x1234);
        assert_eq!(mdio.read(1, 2), Ok(0x1234));
        mdio.set_busy(true);
        assert!(mdio.read(1, 2).is_err());
    }

    #[test]
    fn delay_accumulates() {
        let mut delay = MockDelay::new();
        delay.delay_us(10);
        delay.delay_ns(500);
        assert_eq!(delay.total_ns(), 10_500);
        assert_eq!(delay.total_us(), 10);
    }
}
