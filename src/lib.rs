//! Si4702/Si4703 FM Receiver Driver
//!
//! Async driver for the Silicon Labs Si4702/03 FM broadcast receiver on a
//! two-wire (I2C) bus. The driver keeps a shadow copy of the chip's sixteen
//! registers and implements tuning, seeking, volume and mute control as
//! read-modify-write sequences, with bounded polling of the seek/tune
//! complete flag.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       DEVICE HANDLE                          │
//! │  Lifecycle  │  Volume / Mute  │  Status  │  RDS poll loop    │
//! ├─────────────────────────────────────────────────────────────┤
//! │                 TUNE / SEEK STATE MACHINE                    │
//! │     start bit -> poll STC set -> clear bit -> poll STC clear │
//! ├─────────────────────────────────────────────────────────────┤
//! │                   BUS TRANSACTION LAYER                      │
//! │     read-all (starts at 0x0A)  │  write-range (0x02..=0x07)  │
//! ├─────────────────────────────────────────────────────────────┤
//! │        embedded-hal-async I2c / DelayNs, embassy-sync        │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! let radio: Si4703<CriticalSectionRawMutex, _, _, _> =
//!     Si4703::new(i2c, Delay, GroupQueue::<16>::new(), Config::default());
//! radio.start(&mut reset_pin).await?;
//! radio.set_volume(8).await?;
//! radio.disable_mute().await?;
//! let outcome = radio.tune(Frequency::from_khz(101_100).unwrap()).await?;
//! ```

#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// must come first so the logging macros are visible to every module
mod fmt;

/// Register bus transactions
pub mod bus;

/// Driver configuration and hardware constants
pub mod config;

/// Device handle and public operations
pub mod device;

/// Driver error type
pub mod error;

/// RDS group forwarding and poll loop
pub mod rds;

/// Register map and shadow bank
pub mod registers;

/// Reset line sequencing
pub mod reset;

/// Tune and seek state machine
pub mod tuning;

/// Shared types used across modules
pub mod types;

pub use config::Config;
pub use device::Si4703;
pub use error::{Error, Operation};
pub use rds::{GroupQueue, RdsDecoder, RdsGroup};
pub use registers::{Register, RegisterBank, Status};
pub use tuning::TuneOutcome;
pub use types::{Channel, Frequency, SeekDirection, TuneRequest, Volume};
