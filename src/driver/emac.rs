//! Core STM32H7 Ethernet driver implementation.
//!
//! This module contains the main [`Emac`] structure and core operations:
//!
//! - Peripheral bring-up and ring initialization
//! - Start/stop control
//! - Frame transmission, the receive walk and timestamp correlation
//! - Interrupt dispatch
//! - Access to the PTP unit, the MDIO bus and ring diagnostics

use core::sync::atomic::{AtomicBool, AtomicU8, Ordering};

#[cfg(feature = "log")]
use log::warn;

use embedded_hal::delay::DelayNs;

use super::config::{Duplex, EmacConfig, Speed, State};
use super::error::{ConfigError, IoError, Result};
use super::event::{Event, EventHandler, TxOptions};
use super::interrupt::InterruptStatus;
use super::ptp::Ptp;
use crate::hal::mdio::MdioController;
use crate::hal::reset::ResetController;
use crate::internal::dma::{DmaEngine, Guard, RingStatus};
use crate::internal::register::RegisterAccess;
use crate::internal::register::dma::{DMACIER_DEFAULT, DmaRegs, DmaStatus};
use crate::internal::register::mac::{
    MACCR_DM, MACCR_FES, MACCR_IPC, MACMDIOAR_CR_MASK, MACMDIOAR_CR_SHIFT, MACPFR_HPF, MACPFR_PM,
    MACPFR_PR, MacRegs,
};
use crate::internal::register::mtl::{MTLRQOMR_RSF, MTLTQOMR_DEFAULT, MtlRegs};

// =============================================================================
// EMAC Driver
// =============================================================================

/// STM32H7 Ethernet driver instance
///
/// Owns the register accessor, both descriptor rings with their buffers, and
/// the lifecycle state. Every operation takes `&self`, so an instance can be
/// placed in a `static` and shared between thread and interrupt context.
///
/// # Type Parameters
/// * `A` - Register accessor ([`Mmio`](crate::Mmio) on hardware)
/// * `RX` - Number of receive descriptors
/// * `TX` - Number of transmit descriptors
/// * `BUF` - Size of each DMA buffer in bytes
///
/// # Example
///
/// ```ignore
/// use ph_stm32h7_mac::{Emac, EmacConfig, Mmio};
///
/// static EMAC: Emac<Mmio, 4, 4, 1536> = Emac::new(unsafe { Mmio::eth1() });
///
/// EMAC.init(&EmacConfig::new().with_mac_address(mac), delay)?;
/// EMAC.start()?;
/// ```
pub struct Emac<A: RegisterAccess, const RX: usize, const TX: usize, const BUF: usize> {
    regs: A,
    dma: DmaEngine<RX, TX, BUF>,
    state: AtomicU8,
    dispatching: AtomicBool,
}

impl<A: RegisterAccess, const RX: usize, const TX: usize, const BUF: usize> Emac<A, RX, TX, BUF> {
    /// Create a driver instance. Const-compatible for static allocation.
    pub const fn new(regs: A) -> Self {
        Self {
            regs,
            dma: DmaEngine::new(),
            state: AtomicU8::new(State::Uninitialized as u8),
            dispatching: AtomicBool::new(false),
        }
    }

    /// Total memory used by descriptors and buffers, in bytes
    pub const fn memory_usage() -> usize {
        DmaEngine::<RX, TX, BUF>::memory_usage()
    }

    // =========================================================================
    // State Accessors
    // =========================================================================

    /// Current lifecycle state
    pub fn state(&self) -> State {
        State::from_u8(self.state.load(Ordering::Acquire))
    }

    fn set_state(&self, state: State) {
        self.state.store(state as u8, Ordering::Release);
    }

    /// Underlying register accessor
    pub fn registers(&self) -> &A {
        &self.regs
    }

    /// Primary MAC address as programmed in the peripheral
    pub fn mac_address(&self) -> [u8; 6] {
        MacRegs(&self.regs).mac_address()
    }

    // =========================================================================
    // Initialization
    // =========================================================================

    /// Bring up the peripheral and initialize both rings.
    ///
    /// Performs a software reset, programs the MDIO clock range, MAC address,
    /// packet filter, MAC configuration and MTL queues, then lays out the
    /// rings and hands every RX descriptor to the DMA. The channels are not
    /// started; call [`start`](Self::start).
    ///
    /// # Errors
    /// - `AlreadyInitialized` - `init` already succeeded
    /// - `InvalidConfig` - `config` failed validation
    /// - `ResetFailed` - the software reset did not complete in time
    pub fn init<D: DelayNs>(&self, config: &EmacConfig, delay: D) -> Result<()> {
        if self.state() != State::Uninitialized {
            return Err(ConfigError::AlreadyInitialized.into());
        }
        config.validate()?;

        ResetController::with_timeout(&self.regs, delay, config.sw_reset_timeout_ms)
            .soft_reset()?;

        let mac = MacRegs(&self.regs);
        mac.set_mdio_address((config.mdc_clock.to_cr() << MACMDIOAR_CR_SHIFT) & MACMDIOAR_CR_MASK);
        mac.set_mac_address(&config.mac_address);
        mac.set_packet_filter(if config.promiscuous {
            MACPFR_PR
        } else {
            MACPFR_PM | MACPFR_HPF
        });
        mac.set_config(Self::speed_duplex_bits(config.speed, config.duplex) | MACCR_IPC);

        let mtl = MtlRegs(&self.regs);
        mtl.set_tx_queue_mode(MTLTQOMR_DEFAULT);
        mtl.set_rx_queue_mode(MTLRQOMR_RSF);

        self.dma.init(&self.regs, config.dma_burst_len.to_pbl());
        self.set_state(State::Initialized);

        #[cfg(feature = "defmt")]
        defmt::info!(
            "EMAC initialized: {} RX / {} TX descriptors, {} byte buffers",
            RX,
            TX,
            BUF
        );
        Ok(())
    }

    const fn speed_duplex_bits(speed: Speed, duplex: Duplex) -> u32 {
        let mut bits = 0;
        if matches!(speed, Speed::Mbps100) {
            bits |= MACCR_FES;
        }
        if matches!(duplex, Duplex::Full) {
            bits |= MACCR_DM;
        }
        bits
    }

    // =========================================================================
    // Start / Stop
    // =========================================================================

    /// Enable the interrupts, both DMA channels and the MAC.
    ///
    /// Starting a running driver is a no-op.
    ///
    /// # Errors
    /// - `InvalidState` - the driver is not initialized
    pub fn start(&self) -> Result<()> {
        match self.state() {
            State::Initialized | State::Stopped => {}
            State::Running => return Ok(()),
            State::Uninitialized => return Err(IoError::InvalidState.into()),
        }

        let dma = DmaRegs(&self.regs);
        dma.clear_status(DmaStatus::all());
        dma.set_interrupt_enable(DMACIER_DEFAULT);
        dma.start_rx();
        dma.start_tx();

        let mac = MacRegs(&self.regs);
        mac.enable_rx();
        mac.enable_tx();

        self.set_state(State::Running);

        #[cfg(feature = "defmt")]
        defmt::info!("EMAC started");
        Ok(())
    }

    /// Halt both DMA channels and the MAC and mask the interrupts.
    ///
    /// # Errors
    /// - `InvalidState` - the driver is not running
    pub fn stop(&self) -> Result<()> {
        if self.state() != State::Running {
            return Err(IoError::InvalidState.into());
        }

        let dma = DmaRegs(&self.regs);
        let mac = MacRegs(&self.regs);
        dma.stop_tx();
        mac.disable_tx();
        mac.disable_rx();
        dma.stop_rx();
        dma.set_interrupt_enable(DmaStatus::empty());

        self.set_state(State::Stopped);

        #[cfg(feature = "defmt")]
        defmt::info!("EMAC stopped");
        Ok(())
    }

    // =========================================================================
    // Data Path
    // =========================================================================

    /// Send `frame`, waiting for the next TX slot if the DMA still owns it.
    ///
    /// Returns the sequence number assigned to the frame.
    ///
    /// # Errors
    /// - `InvalidState` - the driver is not running
    /// - `InvalidLength` - `frame` is empty
    /// - `FrameTooLarge` - `frame` does not fit one buffer
    pub fn transmit(&self, frame: &[u8], options: TxOptions) -> Result<u16> {
        self.require_running()?;
        self.dma.transmit(&self.regs, frame, options)
    }

    /// Send `frame` without waiting.
    ///
    /// # Errors
    /// As [`transmit`](Self::transmit), plus `DescriptorBusy` when the next
    /// slot is still owned by the DMA.
    pub fn try_transmit(&self, frame: &[u8], options: TxOptions) -> Result<u16> {
        self.require_running()?;
        self.dma.try_transmit(&self.regs, frame, options)
    }

    /// Check whether [`try_transmit`](Self::try_transmit) would find a free slot
    pub fn can_transmit(&self) -> bool {
        self.state() == State::Running && self.dma.can_transmit()
    }

    /// Number of TX slots not owned by the DMA
    pub fn tx_available(&self) -> usize {
        self.dma.tx_available()
    }

    /// Number of RX descriptors armed for the DMA
    pub fn rx_free_count(&self) -> usize {
        self.dma.rx_free_count()
    }

    /// Deliver every completed received frame to `handler`, oldest first.
    ///
    /// Returns the number of frames delivered. Does nothing before `init`.
    pub fn process_received<H: EventHandler + ?Sized>(&self, handler: &mut H) -> usize {
        if self.state() == State::Uninitialized {
            return 0;
        }
        self.dma.process_received(&self.regs, handler)
    }

    /// Deliver captured transmit timestamps in submission order.
    ///
    /// [`on_interrupt`](Self::on_interrupt) runs this on every transmit
    /// interrupt. It may also be called from thread mode; if the interrupt
    /// arrives during that call, the thread-mode call picks up the new
    /// completions before returning.
    ///
    /// Returns the number of timestamps delivered. Does nothing before `init`.
    pub fn process_completions<H: EventHandler + ?Sized>(&self, handler: &mut H) -> usize {
        if self.state() == State::Uninitialized {
            return 0;
        }
        self.dma.process_completions(handler)
    }

    fn require_running(&self) -> Result<()> {
        if self.state() == State::Running {
            Ok(())
        } else {
            Err(IoError::InvalidState.into())
        }
    }

    // =========================================================================
    // Interrupt Handling
    // =========================================================================

    /// Service the Ethernet interrupt.
    ///
    /// A receive interrupt is acknowledged and reported as
    /// [`Event::ReceiveReady`]; the frames themselves are collected with
    /// [`process_received`](Self::process_received) outside the interrupt. A
    /// transmit interrupt is acknowledged and runs the timestamp correlator.
    /// Every other cause is acknowledged and returned. A nested call returns
    /// an empty status without touching the hardware.
    pub fn on_interrupt<H: EventHandler + ?Sized>(&self, handler: &mut H) -> InterruptStatus {
        let Some(_guard) = Guard::acquire(&self.dispatching) else {
            #[cfg(feature = "log")]
            warn!("interrupt dispatch re-entered, ignoring");
            return InterruptStatus::default();
        };

        let dma = DmaRegs(&self.regs);
        let status = dma.status();
        let mut handled = DmaStatus::empty();
        let mut timestamps = 0;

        if status.contains(DmaStatus::RI) {
            dma.clear_status(DmaStatus::RI | DmaStatus::NIS);
            handled |= DmaStatus::RI | DmaStatus::NIS;
            handler.on_event(Event::ReceiveReady);
        }

        if status.contains(DmaStatus::TI) {
            dma.clear_status(DmaStatus::TI);
            handled |= DmaStatus::TI;
            timestamps = self.process_completions(handler);
        }

        let remaining = status.difference(handled);
        if !remaining.is_empty() {
            dma.clear_status(remaining);
            #[cfg(feature = "log")]
            if remaining.intersects(DmaStatus::ERRORS) {
                warn!("DMA error interrupt, DMACSR={:#010x}", status.bits());
            }
        }

        InterruptStatus::new(status, timestamps)
    }

    // =========================================================================
    // Link, PTP and PHY Access
    // =========================================================================

    /// Apply speed and duplex to the MAC
    pub fn set_speed_duplex(&self, speed: Speed, duplex: Duplex) {
        MacRegs(&self.regs).set_speed_duplex(
            matches!(speed, Speed::Mbps100),
            matches!(duplex, Duplex::Full),
        );
    }

    /// Timestamp unit control
    pub fn ptp(&self) -> Ptp<'_, A> {
        Ptp::new(&self.regs)
    }

    /// MDIO bus over this peripheral, using the clock range set by `init`
    pub fn mdio<D: DelayNs>(&self, delay: D) -> MdioController<'_, A, D> {
        MdioController::new(&self.regs, delay)
    }

    // =========================================================================
    // Diagnostics
    // =========================================================================

    /// One symbol per RX descriptor, `>` at the DMA's current position
    pub fn rx_ring_status(&self) -> RingStatus<RX> {
        self.dma.rx_ring_status(&self.regs)
    }

    /// One symbol per TX descriptor, `>` at the next slot to fill
    pub fn tx_ring_status(&self) -> RingStatus<TX> {
        self.dma.tx_ring_status()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
