//! Driver configuration and hardware constants
//!
//! Register map geometry, band plan and timing constants for the Si4702/03
//! are centralized here, together with the runtime [`Config`] a device is
//! created with.

use embassy_time::Duration;

use crate::types::Volume;

/// Fixed 7-bit I2C address of the Si4702/03
pub const SI4703_I2C_ADDR: u8 = 0x10;

/// Number of 16-bit registers in the bank
pub const REGISTER_COUNT: usize = 16;

/// Register the chip starts returning from on every read
pub const READ_START_REGISTER: usize = 0x0A;

/// First register of the writable range
pub const WRITE_START_REGISTER: usize = 0x02;

/// Number of writable registers (0x02..=0x07)
pub const WRITE_REGISTER_COUNT: usize = 6;

/// Bytes returned by a whole-bank read
pub const READ_LEN: usize = REGISTER_COUNT * 2;

/// Bytes sent by a write-range transaction
pub const WRITE_LEN: usize = WRITE_REGISTER_COUNT * 2;

/// Bottom of band 0 (87.5 MHz) in 10 kHz units
pub const BAND_BOTTOM_10KHZ: u32 = 8_750;

/// Top of band 0 (108.0 MHz) in 10 kHz units
pub const BAND_TOP_10KHZ: u32 = 10_800;

/// Channel spacing (200 kHz) in 10 kHz units
pub const CHANNEL_SPACING_10KHZ: u32 = 20;

/// Value written to TEST1 to enable the crystal oscillator
pub const OSCILLATOR_ENABLE: u16 = 0x8100;

/// POWERCFG value that enables the IC (ENABLE=1, DISABLE=0)
pub const POWER_UP: u16 = 0x0001;

/// POWERCFG value written on shutdown
pub const POWER_DOWN: u16 = 0x0000;

/// Reset line hold time (low)
pub const RESET_HOLD: Duration = Duration::from_millis(1000);

/// Settle time after releasing the reset line
pub const RESET_SETTLE: Duration = Duration::from_millis(1000);

/// Crystal oscillator settle time
pub const OSCILLATOR_SETTLE: Duration = Duration::from_millis(500);

/// Maximum power-up time
pub const POWER_UP_SETTLE: Duration = Duration::from_millis(110);

/// RDS poll period
pub const RDS_POLL_PERIOD: Duration = Duration::from_millis(40);

/// Default delay between two completion-flag polls
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Default number of completion-flag polls before giving up
///
/// A full-band seek takes a few seconds on real hardware.
pub const DEFAULT_MAX_POLL_ATTEMPTS: u32 = 5_000;

/// Volume programmed during power-up
pub const DEFAULT_STARTUP_VOLUME: Volume = Volume::saturating(1);

/// Runtime driver configuration
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    /// I2C address of the receiver
    pub address: u8,
    /// Delay between two completion-flag polls
    pub poll_interval: Duration,
    /// Polls allowed per wait before a tune or seek times out
    pub max_poll_attempts: u32,
    /// Period of the RDS poll loop
    pub rds_poll_period: Duration,
    /// Enable the RDS decoder during power-up
    pub rds_enabled: bool,
    /// Volume programmed during power-up
    pub startup_volume: Volume,
}

impl Config {
    /// Create the default configuration
    #[must_use]
    pub const fn new() -> Self {
        Self {
            address: SI4703_I2C_ADDR,
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_poll_attempts: DEFAULT_MAX_POLL_ATTEMPTS,
            rds_poll_period: RDS_POLL_PERIOD,
            rds_enabled: true,
            startup_volume: DEFAULT_STARTUP_VOLUME,
        }
    }

    /// Override the I2C address
    #[must_use]
    pub const fn with_address(mut self, address: u8) -> Self {
        self.address = address & 0x7F;
        self
    }

    /// Override the completion-flag poll interval
    #[must_use]
    pub const fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Override the completion-flag poll budget (at least one poll)
    #[must_use]
    pub const fn with_max_poll_attempts(mut self, attempts: u32) -> Self {
        self.max_poll_attempts = if attempts == 0 { 1 } else { attempts };
        self
    }

    /// Override the RDS poll period
    #[must_use]
    pub const fn with_rds_poll_period(mut self, period: Duration) -> Self {
        self.rds_poll_period = period;
        self
    }

    /// Enable or disable RDS reception
    #[must_use]
    pub const fn with_rds(mut self, enabled: bool) -> Self {
        self.rds_enabled = enabled;
        self
    }

    /// Override the power-up volume
    #[must_use]
    pub const fn with_startup_volume(mut self, volume: Volume) -> Self {
        self.startup_volume = volume;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
