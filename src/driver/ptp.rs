//! IEEE 1588 timestamp unit control.
//!
//! Thin register-level operations used by a PTP servo: enable timestamping,
//! set and step the system time, tune the frequency addend, capture auxiliary
//! snapshots and drive the PPS output. None of them touch driver state; every
//! wait on a self-clearing command bit is bounded by
//! [`PTP_POLL_LIMIT`](crate::constants::PTP_POLL_LIMIT) polls.

#[cfg(feature = "defmt")]
use defmt::debug;

use crate::driver::error::{ConfigError, IoError, IoResult, Result};
use crate::internal::constants::{
    ADDEND_WRITE_ATTEMPTS, AUX_CHANNELS, NANOS_PER_SECOND, PTP_POLL_LIMIT,
    PULSE_TRAIN_START_DELAY_S,
};
use crate::internal::register::RegisterAccess;
use crate::internal::register::ptp::{
    MACACR_ATSEN_SHIFT, MACACR_ATSFC, MACPPSCR_PPSCTRL_MASK, MACPPSCR_PPSEN0,
    MACPPSCR_TRGTMODSEL_NO_INTERRUPT, MACSSIR_SSINC_MASK, MACSSIR_SSINC_SHIFT, MACSTNUR_ADDSUB,
    MACTSCR_ENABLE, MACTSCR_OFFSET, MACTSCR_TSADDREG, MACTSCR_TSCFUPDT, MACTSCR_TSENA, MACTSCR_TSINIT,
    MACTSCR_TSUPDT, MACTSSR_ATSNS_MASK, MACTSSR_ATSNS_SHIFT, PPSCMD_START_PULSE_TRAIN,
    PPSCMD_STOP_IMMEDIATELY, PtpRegs,
};

/// Nanoseconds field of MACSTNR / MACATSNR
const NANOSECONDS_MASK: u32 = 0x7FFF_FFFF;

// =============================================================================
// Timestamp
// =============================================================================

/// Hardware time: seconds and nanoseconds of the timestamp unit clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Timestamp {
    seconds: u32,
    nanoseconds: u32,
}

impl Timestamp {
    /// Create a timestamp
    #[must_use]
    pub const fn new(seconds: u32, nanoseconds: u32) -> Self {
        Self {
            seconds,
            nanoseconds,
        }
    }

    /// Whole seconds
    #[must_use]
    pub const fn seconds(&self) -> u32 {
        self.seconds
    }

    /// Nanoseconds within the second
    #[must_use]
    pub const fn nanoseconds(&self) -> u32 {
        self.nanoseconds
    }

    /// Total nanoseconds
    #[must_use]
    pub const fn as_nanos(&self) -> u64 {
        self.seconds as u64 * NANOS_PER_SECOND as u64 + self.nanoseconds as u64
    }
}

impl core::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}.{:09}", self.seconds, self.nanoseconds)
    }
}

/// Direction of a time step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimeDirection {
    /// Move the clock forward
    Forward,
    /// Move the clock backward
    Backward,
}

/// Fixed PPS output frequency (MACPPSCR.PPSCTRL in fixed mode)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
#[allow(missing_docs)]
pub enum PpsFrequency {
    Off = 0,
    Hz1 = 1,
    Hz2 = 2,
    Hz4 = 3,
    Hz8 = 4,
    Hz16 = 5,
    Hz32 = 6,
    Hz64 = 7,
    Hz128 = 8,
    Hz256 = 9,
    Hz512 = 10,
    Hz1024 = 11,
    Hz2048 = 12,
    Hz4096 = 13,
    Hz8192 = 14,
    Hz16384 = 15,
}

impl PpsFrequency {
    /// Output frequency in Hz (0 when off)
    #[must_use]
    pub const fn hz(self) -> u32 {
        match self {
            PpsFrequency::Off => 0,
            code => 1 << (code as u32 - 1),
        }
    }
}

// =============================================================================
// Timestamp unit handle
// =============================================================================

/// Borrowed handle on the timestamp unit registers.
#[derive(Debug, Clone, Copy)]
pub struct Ptp<'a, A: RegisterAccess> {
    regs: &'a A,
}

impl<'a, A: RegisterAccess> Ptp<'a, A> {
    /// Create a handle over `regs`
    pub const fn new(regs: &'a A) -> Self {
        Self { regs }
    }

    fn regs(&self) -> PtpRegs<'a, A> {
        PtpRegs(self.regs)
    }

    fn wait_control_clear(&self, bits: u32) -> IoResult<()> {
        for _ in 0..PTP_POLL_LIMIT {
            if !self.regs().control_pending(bits) {
                return Ok(());
            }
            core::hint::spin_loop();
        }
        Err(IoError::Timeout)
    }

    fn wait_pps_idle(&self) -> IoResult<()> {
        for _ in 0..PTP_POLL_LIMIT {
            if !self.regs().pps_command_pending() {
                return Ok(());
            }
            core::hint::spin_loop();
        }
        Err(IoError::Timeout)
    }

    // =========================================================================
    // Enable / disable
    // =========================================================================

    /// Enable timestamping of PTPv2 over Ethernet and IPv4/UDP frames with
    /// digital rollover
    pub fn enable_timestamping(&self) {
        self.regs().set_control(MACTSCR_ENABLE);
        #[cfg(feature = "defmt")]
        debug!("timestamping enabled");
    }

    /// Stop the timestamp unit
    pub fn disable_timestamping(&self) {
        self.regs.clear_bits(MACTSCR_OFFSET, MACTSCR_TSENA);
    }

    /// Check whether the timestamp unit is running
    pub fn is_timestamping_enabled(&self) -> bool {
        self.regs().control() & MACTSCR_TSENA != 0
    }

    /// Select fine (addend-driven) or coarse correction
    pub fn set_fine_correction(&self, enabled: bool) {
        let control = self.regs().control();
        let control = if enabled {
            control | MACTSCR_TSCFUPDT
        } else {
            control & !MACTSCR_TSCFUPDT
        };
        self.regs().set_control(control);
    }

    // =========================================================================
    // System time
    // =========================================================================

    /// Load the system time
    pub fn init_time(&self, seconds: u32, nanoseconds: u32) -> Result<()> {
        if nanoseconds >= NANOS_PER_SECOND {
            return Err(ConfigError::InvalidConfig.into());
        }
        let ptp = self.regs();
        ptp.set_seconds_update(seconds);
        ptp.set_nanoseconds_update(nanoseconds);
        self.wait_control_clear(MACTSCR_TSINIT)?;
        ptp.set_control(ptp.control() | MACTSCR_TSINIT);
        Ok(())
    }

    /// Step the system time by `seconds` and `nanoseconds` in `direction`
    pub fn update_time(
        &self,
        seconds: u32,
        nanoseconds: u32,
        direction: TimeDirection,
    ) -> Result<()> {
        if nanoseconds >= NANOS_PER_SECOND {
            return Err(ConfigError::InvalidConfig.into());
        }
        let ptp = self.regs();
        ptp.set_seconds_update(seconds);
        let update = match direction {
            TimeDirection::Forward => nanoseconds,
            // Digital rollover subtracts the complement of the nanoseconds
            TimeDirection::Backward if nanoseconds == 0 => MACSTNUR_ADDSUB,
            TimeDirection::Backward => MACSTNUR_ADDSUB | (NANOS_PER_SECOND - nanoseconds),
        };
        ptp.set_nanoseconds_update(update);
        self.wait_control_clear(MACTSCR_TSUPDT | MACTSCR_TSINIT)?;
        ptp.set_control(ptp.control() | MACTSCR_TSUPDT);
        Ok(())
    }

    /// Read the system time.
    ///
    /// The seconds register is read again after the nanoseconds so a rollover
    /// between the two reads does not produce a torn value.
    pub fn now(&self) -> Timestamp {
        let ptp = self.regs();
        let seconds = ptp.system_seconds();
        let nanoseconds = ptp.system_nanoseconds() & NANOSECONDS_MASK;
        let again = ptp.system_seconds();
        if again == seconds {
            Timestamp::new(seconds, nanoseconds)
        } else {
            Timestamp::new(again, ptp.system_nanoseconds() & NANOSECONDS_MASK)
        }
    }

    // =========================================================================
    // Frequency
    // =========================================================================

    /// Write the frequency addend.
    ///
    /// The hardware latches the addend only after a pipeline delay, so the
    /// write and update command are repeated a fixed number of times.
    pub fn set_addend(&self, addend: u32) -> IoResult<()> {
        let ptp = self.regs();
        for _ in 0..ADDEND_WRITE_ATTEMPTS {
            ptp.set_addend(addend);
            self.wait_control_clear(MACTSCR_TSADDREG)?;
            ptp.set_control(ptp.control() | MACTSCR_TSADDREG);
        }
        Ok(())
    }

    /// Read the frequency addend
    pub fn addend(&self) -> u32 {
        self.regs().addend()
    }

    /// Set the nanoseconds added to the sub-second counter per clock tick
    pub fn set_subsecond_increment(&self, increment: u8) {
        self.regs()
            .set_subsecond_increment((u32::from(increment) << MACSSIR_SSINC_SHIFT) & MACSSIR_SSINC_MASK);
    }

    /// Nanoseconds added per clock tick
    pub fn subsecond_increment(&self) -> u8 {
        ((self.regs().subsecond_increment() & MACSSIR_SSINC_MASK) >> MACSSIR_SSINC_SHIFT) as u8
    }

    // =========================================================================
    // Auxiliary snapshots
    // =========================================================================

    /// Enable or disable auxiliary snapshot channel `channel` (0-3)
    pub fn set_aux_channel(&self, channel: u8, enabled: bool) -> Result<()> {
        if channel >= AUX_CHANNELS {
            return Err(ConfigError::InvalidConfig.into());
        }
        let bit = 1 << (MACACR_ATSEN_SHIFT + u32::from(channel));
        let ptp = self.regs();
        let control = ptp.aux_control() & !MACACR_ATSFC;
        ptp.set_aux_control(if enabled { control | bit } else { control & !bit });
        Ok(())
    }

    /// Discard every queued auxiliary snapshot
    pub fn clear_aux_fifo(&self) {
        let ptp = self.regs();
        ptp.set_aux_control(ptp.aux_control() | MACACR_ATSFC);
    }

    /// Number of auxiliary snapshots waiting in the FIFO
    pub fn aux_snapshot_count(&self) -> u8 {
        ((self.regs().status() >> MACTSSR_ATSNS_SHIFT) & MACTSSR_ATSNS_MASK) as u8
    }

    /// Pop the oldest auxiliary snapshot
    pub fn last_aux_timestamp(&self) -> Timestamp {
        let ptp = self.regs();
        // Reading the seconds register advances the FIFO, so it goes last
        let nanoseconds = ptp.aux_nanoseconds() & NANOSECONDS_MASK;
        Timestamp::new(ptp.aux_seconds(), nanoseconds)
    }

    // =========================================================================
    // PPS output
    // =========================================================================

    /// Drive the PPS output at a fixed frequency
    pub fn set_pps_frequency(&self, frequency: PpsFrequency) {
        self.regs()
            .set_pps_control(MACPPSCR_TRGTMODSEL_NO_INTERRUPT | frequency as u32);
    }

    /// Start a pulse train with `high_ns` high time every `period_ns`.
    ///
    /// The first pulse is emitted on the nanoseconds rollover two seconds
    /// from now, so the train is aligned to whole seconds.
    pub fn start_pulse_train(&self, high_ns: u32, period_ns: u32) -> Result<()> {
        let increment = u32::from(self.subsecond_increment());
        if increment == 0 || high_ns < increment || period_ns <= high_ns {
            return Err(ConfigError::InvalidConfig.into());
        }

        self.stop_pulse_train()?;
        self.wait_pps_idle()?;

        let ptp = self.regs();
        let start = self.now().seconds().wrapping_add(PULSE_TRAIN_START_DELAY_S);
        ptp.set_pps_target_seconds(start);
        ptp.set_pps_target_nanoseconds(0);
        ptp.set_pps_width(high_ns / increment - 1);
        ptp.set_pps_interval(period_ns / increment - 1);
        ptp.set_pps_control(
            MACPPSCR_PPSEN0 | MACPPSCR_TRGTMODSEL_NO_INTERRUPT | PPSCMD_START_PULSE_TRAIN,
        );
        #[cfg(feature = "defmt")]
        debug!("pulse train scheduled at {}s", start);
        Ok(())
    }

    /// Stop the pulse train immediately
    pub fn stop_pulse_train(&self) -> IoResult<()> {
        let ptp = self.regs();
        if ptp.pps_control() & MACPPSCR_PPSEN0 == 0 {
            ptp.set_pps_control(MACPPSCR_PPSEN0);
            self.wait_pps_idle()?;
        }
        self.wait_pps_idle()?;
        let control = ptp.pps_control() & !MACPPSCR_PPSCTRL_MASK;
        ptp.set_pps_control(control | PPSCMD_STOP_IMMEDIATELY);
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
