//! Driver error type

use core::fmt;

/// Multi-step operation a poll wait belonged to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Operation {
    /// Waiting for a tune to complete
    Tune,
    /// Waiting for a seek to complete
    Seek,
    /// Waiting for the completion flag to clear
    Clear,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tune => f.write_str("tune"),
            Self::Seek => f.write_str("seek"),
            Self::Clear => f.write_str("completion flag clear"),
        }
    }
}

/// Errors returned by the driver, generic over the bus error
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// The I2C transaction failed
    Bus(E),
    /// The completion flag did not reach the awaited state in time
    Timeout(Operation),
    /// An abort was requested while waiting on the completion flag
    Cancelled(Operation),
    /// The reset line could not be driven
    ResetPin,
    /// Requested frequency (kHz) lies outside 87.5 - 108.0 MHz
    FrequencyOutOfRange(u32),
}

impl<E> Error<E> {
    /// Whether this error came from the bus
    #[must_use]
    pub const fn is_bus(&self) -> bool {
        matches!(self, Self::Bus(_))
    }
}

impl<E: fmt::Debug> fmt::Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bus(e) => write!(f, "bus transaction failed: {e:?}"),
            Self::Timeout(op) => write!(f, "{op} timed out"),
            Self::Cancelled(op) => write!(f, "{op} cancelled"),
            Self::ResetPin => f.write_str("reset line could not be driven"),
            Self::FrequencyOutOfRange(khz) => write!(f, "{khz} kHz is outside the FM band"),
        }
    }
}

/// Driver operation result
pub type Result<T, E> = core::result::Result<T, Error<E>>;
