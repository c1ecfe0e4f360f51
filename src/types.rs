//! Shared types used across the driver
//!
//! Domain-specific newtypes for the values the receiver is programmed with,
//! so that band limits, channel widths and volume saturation are enforced in
//! one place instead of at every register write.

use core::fmt;

use crate::config::{BAND_BOTTOM_10KHZ, BAND_TOP_10KHZ, CHANNEL_SPACING_10KHZ};

/// Broadcast frequency in 10 kHz units
///
/// Frequencies built through [`Frequency::from_khz`] or
/// [`Frequency::from_10khz`] lie inside the supported band (87.5 - 108.0 MHz).
/// Frequencies decoded from a channel code are not range-checked because the
/// chip may report any 9-bit code.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Frequency(u32);

impl Frequency {
    /// Lowest tunable frequency (87.5 MHz)
    pub const MIN: Self = Self(BAND_BOTTOM_10KHZ);

    /// Highest tunable frequency (108.0 MHz)
    pub const MAX: Self = Self(BAND_TOP_10KHZ);

    /// Create a frequency from kHz, returns None if outside the band
    #[must_use]
    pub const fn from_khz(khz: u32) -> Option<Self> {
        Self::from_10khz(khz / 10)
    }

    /// Create a frequency from 10 kHz units, returns None if outside the band
    #[must_use]
    pub const fn from_10khz(units: u32) -> Option<Self> {
        if units >= BAND_BOTTOM_10KHZ && units <= BAND_TOP_10KHZ {
            Some(Self(units))
        } else {
            None
        }
    }

    /// Get the frequency in kHz
    #[must_use]
    pub const fn as_khz(self) -> u32 {
        self.0 * 10
    }

    /// Get the frequency in 10 kHz units
    #[must_use]
    pub const fn as_10khz(self) -> u32 {
        self.0
    }

    /// Channel code for this frequency
    ///
    /// Off-grid frequencies truncate down to the channel below.
    #[must_use]
    pub const fn to_channel(self) -> Channel {
        let code = self.0.saturating_sub(BAND_BOTTOM_10KHZ) / CHANNEL_SPACING_10KHZ;
        Channel(code as u16 & Channel::MASK)
    }
}

impl fmt::Debug for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Frequency({} kHz)", self.as_khz())
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02} MHz", self.0 / 100, self.0 % 100)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Frequency {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "{}.{}{} MHz", self.0 / 100, self.0 % 100 / 10, self.0 % 10);
    }
}

/// 9-bit channel code as held in the CHANNEL and READCHAN registers
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Channel(u16);

impl Channel {
    /// Bits of a register word that carry the channel code
    pub const MASK: u16 = 0x01FF;

    /// Create from a raw code, returns None if it does not fit in 9 bits
    #[must_use]
    pub const fn new(code: u16) -> Option<Self> {
        if code <= Self::MASK {
            Some(Self(code))
        } else {
            None
        }
    }

    /// Extract the channel code from a CHANNEL or READCHAN register word
    #[must_use]
    pub const fn from_register(word: u16) -> Self {
        Self(word & Self::MASK)
    }

    /// Get the raw channel code
    #[must_use]
    pub const fn code(self) -> u16 {
        self.0
    }

    /// Frequency this channel tunes to
    #[must_use]
    pub const fn frequency(self) -> Frequency {
        Frequency(self.0 as u32 * CHANNEL_SPACING_10KHZ + BAND_BOTTOM_10KHZ)
    }
}

/// Audio volume (0 = muted output stage, 15 = maximum)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Volume(u8);

impl Volume {
    /// Minimum volume
    pub const MIN: Self = Self(0);

    /// Maximum volume
    pub const MAX: Self = Self(15);

    /// Create a volume, saturating to 0..=15
    #[must_use]
    pub const fn saturating(level: i32) -> Self {
        if level < 0 {
            Self::MIN
        } else if level > Self::MAX.0 as i32 {
            Self::MAX
        } else {
            Self(level as u8)
        }
    }

    /// Get the register field value
    #[must_use]
    pub const fn level(self) -> u8 {
        self.0
    }
}

impl From<u8> for Volume {
    fn from(level: u8) -> Self {
        Self::saturating(i32::from(level))
    }
}

/// Seek direction
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SeekDirection {
    /// Towards higher frequencies
    Up,
    /// Towards lower frequencies
    Down,
}

impl fmt::Display for SeekDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Up => f.write_str("up"),
            Self::Down => f.write_str("down"),
        }
    }
}

/// One run of the tune/seek state machine
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TuneRequest {
    /// Tune directly to a frequency
    Channel(Frequency),
    /// Seek to the next station in a direction
    Seek(SeekDirection),
}
