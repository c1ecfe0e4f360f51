//! Si4702/03 register map
//!
//! The chip exposes sixteen 16-bit registers. The driver keeps a shadow
//! [`RegisterBank`] that is either the image of the last successful read or
//! that image plus local edits that have not been written yet.

use crate::config::REGISTER_COUNT;
use crate::types::{Channel, Volume};

/// Register indices, in hardware order
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Register {
    /// Part number and manufacturer ID
    DeviceId = 0x00,
    /// Chip revision, device and firmware
    ChipId = 0x01,
    /// Mute, seek and power control
    PowerCfg = 0x02,
    /// TUNE bit and channel code
    Channel = 0x03,
    /// RDS, de-emphasis, AGC, blend
    SysConfig1 = 0x04,
    /// Seek threshold, band, spacing, volume
    SysConfig2 = 0x05,
    /// Seek quality thresholds
    SysConfig3 = 0x06,
    /// Oscillator enable, audio high-Z
    Test1 = 0x07,
    /// Reserved
    Test2 = 0x08,
    /// Reserved
    BootConfig = 0x09,
    /// RDS ready, STC, SF/BL, stereo, RSSI
    StatusRssi = 0x0A,
    /// Block error rates and current channel
    ReadChan = 0x0B,
    /// RDS block A
    RdsA = 0x0C,
    /// RDS block B
    RdsB = 0x0D,
    /// RDS block C
    RdsC = 0x0E,
    /// RDS block D
    RdsD = 0x0F,
}

impl Register {
    /// Index into the register bank
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// POWERCFG bits
pub mod powercfg {
    /// Softmute disable
    pub const DSMUTE: u16 = 1 << 15;
    /// Mute disable
    pub const DMUTE: u16 = 1 << 14;
    /// Force mono
    pub const MONO: u16 = 1 << 13;
    /// RDS verbose mode
    pub const RDSM: u16 = 1 << 11;
    /// Stop seeking at the band limit instead of wrapping
    pub const SKMODE: u16 = 1 << 10;
    /// Seek direction up
    pub const SEEKUP: u16 = 1 << 9;
    /// Start seek
    pub const SEEK: u16 = 1 << 8;
    /// Power-up disable
    pub const DISABLE: u16 = 1 << 6;
    /// Power-up enable
    pub const ENABLE: u16 = 1 << 0;
}

/// CHANNEL bits
pub mod channel {
    /// Start tune
    pub const TUNE: u16 = 1 << 15;
}

/// SYSCONFIG1 bits
pub mod sysconfig1 {
    /// RDS enable
    pub const RDS: u16 = 1 << 12;
    /// De-emphasis 50 us
    pub const DE: u16 = 1 << 11;
    /// AGC disable
    pub const AGCD: u16 = 1 << 10;
}

/// SYSCONFIG2 fields
pub mod sysconfig2 {
    /// Volume field
    pub const VOLUME_MASK: u16 = 0x000F;
}

/// STATUSRSSI bits
pub mod status {
    /// RDS group ready
    pub const RDSR: u16 = 1 << 15;
    /// Seek/tune complete
    pub const STC: u16 = 1 << 14;
    /// Seek fail / band limit
    pub const SFBL: u16 = 1 << 13;
    /// AFC railed
    pub const AFCRL: u16 = 1 << 12;
    /// RDS synchronized
    pub const RDSS: u16 = 1 << 11;
    /// Stereo indicator
    pub const ST: u16 = 1 << 8;
    /// RSSI field
    pub const RSSI_MASK: u16 = 0x00FF;
}

/// Shadow copy of the chip's register bank
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RegisterBank {
    words: [u16; REGISTER_COUNT],
}

impl RegisterBank {
    /// Create a bank of zeros
    #[must_use]
    pub const fn new() -> Self {
        Self {
            words: [0; REGISTER_COUNT],
        }
    }

    /// Create a bank from raw words in register order
    #[must_use]
    pub const fn from_words(words: [u16; REGISTER_COUNT]) -> Self {
        Self { words }
    }

    /// Get all words in register order
    #[must_use]
    pub const fn words(&self) -> &[u16; REGISTER_COUNT] {
        &self.words
    }

    /// Get a register value
    #[must_use]
    pub const fn get(&self, reg: Register) -> u16 {
        self.words[reg.index()]
    }

    /// Set a register value
    pub fn set(&mut self, reg: Register, value: u16) {
        self.words[reg.index()] = value;
    }

    /// Set bits in a register
    pub fn set_bits(&mut self, reg: Register, bits: u16) {
        self.words[reg.index()] |= bits;
    }

    /// Clear bits in a register
    pub fn clear_bits(&mut self, reg: Register, bits: u16) {
        self.words[reg.index()] &= !bits;
    }

    /// Replace the bits selected by `mask` with `value`
    pub fn update(&mut self, reg: Register, mask: u16, value: u16) {
        let word = &mut self.words[reg.index()];
        *word = (*word & !mask) | (value & mask);
    }

    /// Check whether every bit in `bits` is set
    #[must_use]
    pub const fn is_set(&self, reg: Register, bits: u16) -> bool {
        self.words[reg.index()] & bits == bits
    }

    /// Program a channel code and request a tune
    pub fn start_tune(&mut self, code: Channel) {
        self.update(Register::Channel, Channel::MASK, code.code());
        self.set_bits(Register::Channel, channel::TUNE);
    }

    /// Program the volume field
    pub fn set_volume(&mut self, volume: Volume) {
        self.update(
            Register::SysConfig2,
            sysconfig2::VOLUME_MASK,
            u16::from(volume.level()),
        );
    }

    /// Seek/tune complete flag
    #[must_use]
    pub const fn stc(&self) -> bool {
        self.is_set(Register::StatusRssi, status::STC)
    }

    /// Channel the chip is currently tuned to
    #[must_use]
    pub const fn read_channel(&self) -> Channel {
        Channel::from_register(self.get(Register::ReadChan))
    }

    /// Decoded status register
    #[must_use]
    pub const fn status(&self) -> Status {
        Status::from_register(self.get(Register::StatusRssi))
    }

    /// Raw RDS group (blocks A-D)
    #[must_use]
    pub const fn rds_group(&self) -> crate::rds::RdsGroup {
        crate::rds::RdsGroup {
            a: self.get(Register::RdsA),
            b: self.get(Register::RdsB),
            c: self.get(Register::RdsC),
            d: self.get(Register::RdsD),
        }
    }
}

/// Decoded STATUSRSSI register
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Status {
    /// New RDS group ready
    pub rds_ready: bool,
    /// Seek/tune complete
    pub seek_tune_complete: bool,
    /// Seek failed or band limit reached
    pub band_limit: bool,
    /// AFC railed
    pub afc_railed: bool,
    /// RDS decoder synchronized
    pub rds_synchronized: bool,
    /// Receiving in stereo
    pub stereo: bool,
    /// Received signal strength in dBuV
    pub rssi: u8,
}

impl Status {
    /// Decode a STATUSRSSI word
    #[must_use]
    pub const fn from_register(word: u16) -> Self {
        Self {
            rds_ready: word & status::RDSR != 0,
            seek_tune_complete: word & status::STC != 0,
            band_limit: word & status::SFBL != 0,
            afc_railed: word & status::AFCRL != 0,
            rds_synchronized: word & status::RDSS != 0,
            stereo: word & status::ST != 0,
            rssi: (word & status::RSSI_MASK) as u8,
        }
    }
}
