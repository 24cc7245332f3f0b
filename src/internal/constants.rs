//! Centralized Constants
//!
//! This module provides a single source of truth for all magic numbers and
//! configuration constants used throughout the driver.
//!
//! # Organization
//!
//! Constants are grouped by category:
//! - **Frame/Buffer sizes**: Ethernet frame dimensions and descriptor limits
//! - **Timing**: Timeouts and polling bounds
//! - **MDIO**: CSR clock range selections
//! - **PTP**: Timestamp unit constants
//!
//! # Note
//!
//! Hardware register bit definitions remain in their respective modules
//! (`register/dma.rs`, `register/mac.rs`, etc.) as they are specific to
//! those hardware blocks.

// =============================================================================
// Frame and Buffer Sizes
// =============================================================================

/// Largest frame the driver reassembles from several descriptors
pub const MAX_FRAME_SIZE: usize = 1536;

/// Largest value of the 14-bit descriptor buffer/packet length fields
pub const MAX_DESCRIPTOR_LENGTH: usize = 0x3FFF;

// =============================================================================
// Timing Constants
// =============================================================================

/// Default soft reset timeout in milliseconds
pub const SOFT_RESET_TIMEOUT_MS: u32 = 100;

/// Reset poll interval in microseconds
pub const RESET_POLL_INTERVAL_US: u32 = 100;

/// Maximum iterations waiting for a timestamp unit command bit to clear
pub const PTP_POLL_LIMIT: u32 = 1_000_000;

// =============================================================================
// MDIO/MDC (IEEE 802.3 Clause 22)
// =============================================================================

/// CSR clock range for 60-100 MHz HCLK (div 42)
pub const CSR_CLOCK_DIV_42: u32 = 0;

/// CSR clock range for 100-150 MHz HCLK (div 62)
pub const CSR_CLOCK_DIV_62: u32 = 1;

/// CSR clock range for 20-35 MHz HCLK (div 16)
pub const CSR_CLOCK_DIV_16: u32 = 2;

/// CSR clock range for 35-60 MHz HCLK (div 26)
pub const CSR_CLOCK_DIV_26: u32 = 3;

/// CSR clock range for 150-250 MHz HCLK (div 102)
pub const CSR_CLOCK_DIV_102: u32 = 4;

/// CSR clock range for 250-300 MHz HCLK (div 124)
pub const CSR_CLOCK_DIV_124: u32 = 5;

/// Highest PHY address on a Clause 22 bus
pub const MAX_PHY_ADDR: u8 = 31;

/// Highest PHY register number on a Clause 22 bus
pub const MAX_PHY_REG: u8 = 31;

// =============================================================================
// MAC Address
// =============================================================================

/// Default locally-administered MAC address
/// Bit 1 of first byte = 1 indicates locally administered
/// Bit 0 of first byte = 0 indicates unicast
pub const DEFAULT_MAC_ADDR: [u8; 6] = [0x02, 0x00, 0x00, 0x00, 0x00, 0x01];

// =============================================================================
// PTP
// =============================================================================

/// Nanoseconds in one second (digital rollover limit)
pub const NANOS_PER_SECOND: u32 = 1_000_000_000;

/// Number of addend write attempts; the timestamp unit only latches MACTSAR
/// after a pipeline delay
pub const ADDEND_WRITE_ATTEMPTS: usize = 8;

/// Seconds between "now" and the first edge of a started pulse train
pub const PULSE_TRAIN_START_DELAY_S: u32 = 2;

/// Number of auxiliary snapshot trigger inputs
pub const AUX_CHANNELS: u8 = 4;
