//! Register bus transactions
//!
//! The Si4702/03 has no register address phase. Every read starts at
//! register 0x0A and wraps from 0x0F to 0x00, and every write starts at
//! register 0x02. Reads therefore always fetch the whole bank and writes
//! always send the full writable range 0x02..=0x07.

use embedded_hal_async::i2c::I2c;

use crate::config::{
    READ_LEN, READ_START_REGISTER, REGISTER_COUNT, WRITE_LEN, WRITE_REGISTER_COUNT,
    WRITE_START_REGISTER,
};
use crate::registers::{Register, RegisterBank};

/// Map a whole-bank read response onto register order
///
/// The first word on the wire is register 0x0A, the last is 0x09.
#[must_use]
pub fn decode_read(raw: &[u8; READ_LEN]) -> [u16; REGISTER_COUNT] {
    let mut words = [0u16; REGISTER_COUNT];
    for (i, pair) in raw.chunks_exact(2).enumerate() {
        let reg = (READ_START_REGISTER + i) % REGISTER_COUNT;
        words[reg] = u16::from_be_bytes([pair[0], pair[1]]);
    }
    words
}

/// Encode registers 0x02..=0x07 as one big-endian payload
#[must_use]
pub fn encode_write(bank: &RegisterBank) -> [u8; WRITE_LEN] {
    let mut buf = [0u8; WRITE_LEN];
    let words = &bank.words()[WRITE_START_REGISTER..WRITE_START_REGISTER + WRITE_REGISTER_COUNT];
    for (chunk, word) in buf.chunks_exact_mut(2).zip(words) {
        chunk.copy_from_slice(&word.to_be_bytes());
    }
    buf
}

/// Exclusive handle on the receiver's I2C connection
pub struct RegisterBus<I2C> {
    i2c: I2C,
    address: u8,
    /// POWERCFG as last read from or written to the chip
    powercfg: u16,
}

impl<I2C: I2c> RegisterBus<I2C> {
    /// Create a bus handle for the device at `address`
    #[must_use]
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self {
            i2c,
            address,
            powercfg: 0,
        }
    }

    /// Device address
    #[must_use]
    pub const fn address(&self) -> u8 {
        self.address
    }

    /// POWERCFG value the chip is known to hold
    #[must_use]
    pub const fn powercfg(&self) -> u16 {
        self.powercfg
    }

    /// Refresh the whole bank from the device
    ///
    /// The chip stores the two bytes sent ahead of the read in POWERCFG, so
    /// the last POWERCFG value the chip confirmed is sent, never a pending
    /// value from `bank`. `bank` is only replaced once the transaction has
    /// succeeded.
    pub async fn read_all(&mut self, bank: &mut RegisterBank) -> Result<(), I2C::Error> {
        let prefix = self.powercfg.to_be_bytes();
        let mut raw = [0u8; READ_LEN];
        self.i2c.write_read(self.address, &prefix, &mut raw).await?;
        *bank = RegisterBank::from_words(decode_read(&raw));
        self.powercfg = bank.get(Register::PowerCfg);
        Ok(())
    }

    /// Send registers 0x02..=0x07 in one transaction
    pub async fn write_range(&mut self, bank: &RegisterBank) -> Result<(), I2C::Error> {
        let payload = encode_write(bank);
        self.i2c.write(self.address, &payload).await?;
        self.powercfg = bank.get(Register::PowerCfg);
        Ok(())
    }

    /// Give back the underlying bus
    pub fn release(self) -> I2C {
        self.i2c
    }
}
