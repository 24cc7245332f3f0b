//! Configuration types for the STM32H7 Ethernet driver

use crate::driver::error::{ConfigError, ConfigResult};
use crate::internal::constants::{
    CSR_CLOCK_DIV_16, CSR_CLOCK_DIV_26, CSR_CLOCK_DIV_42, CSR_CLOCK_DIV_62, CSR_CLOCK_DIV_102,
    CSR_CLOCK_DIV_124, DEFAULT_MAC_ADDR, SOFT_RESET_TIMEOUT_MS,
};

/// Ethernet link speed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Speed {
    /// 10 Mbps
    Mbps10,
    /// 100 Mbps
    #[default]
    Mbps100,
}

impl Speed {
    /// Link rate in Mbit/s
    #[must_use]
    pub const fn mbps(self) -> u32 {
        match self {
            Speed::Mbps10 => 10,
            Speed::Mbps100 => 100,
        }
    }
}

/// Ethernet duplex mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Duplex {
    /// Half duplex
    Half,
    /// Full duplex
    #[default]
    Full,
}

/// DMA burst length configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum DmaBurstLen {
    /// 1 beat burst
    Burst1 = 1,
    /// 2 beat burst
    Burst2 = 2,
    /// 4 beat burst
    Burst4 = 4,
    /// 8 beat burst
    Burst8 = 8,
    /// 16 beat burst
    Burst16 = 16,
    /// 32 beat burst (default, best performance)
    #[default]
    Burst32 = 32,
}

impl DmaBurstLen {
    /// Convert to the programmable burst length value for DMA register
    #[must_use]
    pub const fn to_pbl(self) -> u32 {
        self as u32
    }
}

/// MDC clock divider selected from the AHB clock (MACMDIOAR.CR)
///
/// MDC must stay at or below 2.5 MHz; pick the range that contains HCLK.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MdcClockRange {
    /// HCLK 60-100 MHz, divide by 42
    Div42,
    /// HCLK 100-150 MHz, divide by 62
    Div62,
    /// HCLK 20-35 MHz, divide by 16
    Div16,
    /// HCLK 35-60 MHz, divide by 26
    Div26,
    /// HCLK 150-250 MHz, divide by 102
    #[default]
    Div102,
    /// HCLK 250-300 MHz, divide by 124
    Div124,
}

impl MdcClockRange {
    /// Field value for MACMDIOAR.CR
    #[must_use]
    pub const fn to_cr(self) -> u32 {
        match self {
            MdcClockRange::Div42 => CSR_CLOCK_DIV_42,
            MdcClockRange::Div62 => CSR_CLOCK_DIV_62,
            MdcClockRange::Div16 => CSR_CLOCK_DIV_16,
            MdcClockRange::Div26 => CSR_CLOCK_DIV_26,
            MdcClockRange::Div102 => CSR_CLOCK_DIV_102,
            MdcClockRange::Div124 => CSR_CLOCK_DIV_124,
        }
    }

    /// Smallest divider that keeps MDC at or below 2.5 MHz for `hclk_hz`
    #[must_use]
    pub const fn from_hclk(hclk_hz: u32) -> Self {
        match hclk_hz {
            0..=35_000_000 => MdcClockRange::Div16,
            35_000_001..=60_000_000 => MdcClockRange::Div26,
            60_000_001..=100_000_000 => MdcClockRange::Div42,
            100_000_001..=150_000_000 => MdcClockRange::Div62,
            150_000_001..=250_000_000 => MdcClockRange::Div102,
            _ => MdcClockRange::Div124,
        }
    }
}

/// Complete driver configuration
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EmacConfig {
    /// MAC address (6 bytes)
    pub mac_address: [u8; 6],
    /// Speed programmed before the first link report
    pub speed: Speed,
    /// Duplex programmed before the first link report
    pub duplex: Duplex,
    /// MDC clock divider
    pub mdc_clock: MdcClockRange,
    /// Enable promiscuous mode (receive all frames)
    pub promiscuous: bool,
    /// DMA burst length
    pub dma_burst_len: DmaBurstLen,
    /// Software reset timeout in milliseconds
    pub sw_reset_timeout_ms: u32,
}

impl Default for EmacConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl EmacConfig {
    /// Create a new configuration with defaults
    #[must_use]
    pub const fn new() -> Self {
        Self {
            mac_address: DEFAULT_MAC_ADDR,
            speed: Speed::Mbps100,
            duplex: Duplex::Full,
            mdc_clock: MdcClockRange::Div102,
            promiscuous: false,
            dma_burst_len: DmaBurstLen::Burst32,
            sw_reset_timeout_ms: SOFT_RESET_TIMEOUT_MS,
        }
    }

    // =========================================================================
    // Builder Methods
    // =========================================================================

    /// Set the MAC address
    ///
    /// If not set, a locally-administered address (02:00:00:00:00:01) is used.
    #[must_use]
    pub const fn with_mac_address(mut self, addr: [u8; 6]) -> Self {
        self.mac_address = addr;
        self
    }

    /// Set the initial link speed
    #[must_use]
    pub const fn with_speed(mut self, speed: Speed) -> Self {
        self.speed = speed;
        self
    }

    /// Set the initial duplex mode
    #[must_use]
    pub const fn with_duplex(mut self, duplex: Duplex) -> Self {
        self.duplex = duplex;
        self
    }

    /// Set the MDC clock divider
    #[must_use]
    pub const fn with_mdc_clock(mut self, range: MdcClockRange) -> Self {
        self.mdc_clock = range;
        self
    }

    /// Enable or disable promiscuous mode
    #[must_use]
    pub const fn with_promiscuous(mut self, enabled: bool) -> Self {
        self.promiscuous = enabled;
        self
    }

    /// Set the DMA burst length
    #[must_use]
    pub const fn with_dma_burst_len(mut self, burst_len: DmaBurstLen) -> Self {
        self.dma_burst_len = burst_len;
        self
    }

    /// Set the software reset timeout
    #[must_use]
    pub const fn with_reset_timeout_ms(mut self, timeout_ms: u32) -> Self {
        self.sw_reset_timeout_ms = timeout_ms;
        self
    }

    /// Check the configuration before it is written to hardware
    pub fn validate(&self) -> ConfigResult<()> {
        // A station address must not be a group address
        if self.mac_address[0] & 0x01 != 0 {
            return Err(ConfigError::InvalidConfig);
        }
        if self.sw_reset_timeout_ms == 0 {
            return Err(ConfigError::InvalidConfig);
        }
        Ok(())
    }
}

/// Driver lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum State {
    /// Not initialized
    #[default]
    Uninitialized = 0,
    /// Initialized but not started
    Initialized = 1,
    /// Running (TX/RX enabled)
    Running = 2,
    /// Stopped (TX/RX disabled but still initialized)
    Stopped = 3,
}

impl State {
    pub(crate) const fn from_u8(value: u8) -> Self {
        match value {
            1 => State::Initialized,
            2 => State::Running,
            3 => State::Stopped,
            _ => State::Uninitialized,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
