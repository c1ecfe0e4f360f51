//! Tune and seek state machine
//!
//! Tuning and seeking share one completion flag (STC) and run the same
//! handshake:
//!
//! ```text
//! read -> set TUNE/SEEK -> write -> poll until STC=1
//!      -> reset RDS decoder -> clear TUNE/SEEK -> write -> poll until STC=0
//! ```
//!
//! Both polls are bounded by [`Config::max_poll_attempts`] and can be
//! aborted through the device's abort signal.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::signal::Signal;
use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::i2c::I2c;

use crate::config::Config;
use crate::device::Inner;
use crate::error::{Error, Operation, Result};
use crate::rds::RdsDecoder;
use crate::registers::{channel, powercfg, Register, RegisterBank, Status};
use crate::types::{Frequency, SeekDirection, TuneRequest};

/// Where a finished tune or seek landed
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TuneOutcome {
    /// Frequency reported by READCHAN when STC was set
    pub frequency: Frequency,
    /// Seek failed or hit the band limit
    pub band_limit: bool,
    /// Status register when STC was set
    pub status: Status,
}

impl TuneOutcome {
    fn from_bank(bank: &RegisterBank) -> Self {
        let status = bank.status();
        Self {
            frequency: bank.read_channel().frequency(),
            band_limit: status.band_limit,
            status,
        }
    }
}

impl TuneRequest {
    /// Register and bit that start this request
    const fn start_bit(self) -> (Register, u16) {
        match self {
            Self::Channel(_) => (Register::Channel, channel::TUNE),
            Self::Seek(_) => (Register::PowerCfg, powercfg::SEEK),
        }
    }

    const fn operation(self) -> Operation {
        match self {
            Self::Channel(_) => Operation::Tune,
            Self::Seek(_) => Operation::Seek,
        }
    }

    /// Apply this request to a freshly read bank
    fn apply(self, bank: &mut RegisterBank) {
        match self {
            Self::Channel(frequency) => bank.start_tune(frequency.to_channel()),
            Self::Seek(direction) => {
                match direction {
                    SeekDirection::Up => bank.set_bits(Register::PowerCfg, powercfg::SEEKUP),
                    SeekDirection::Down => bank.clear_bits(Register::PowerCfg, powercfg::SEEKUP),
                }
                bank.set_bits(Register::PowerCfg, powercfg::SEEK);
            }
        }
    }
}

impl<I2C, D, R> Inner<I2C, D, R>
where
    I2C: I2c,
    D: DelayNs,
    R: RdsDecoder,
{
    /// Drive one tune or seek to completion
    pub(crate) async fn run<M: RawMutex>(
        &mut self,
        request: TuneRequest,
        config: &Config,
        abort: &Signal<M, ()>,
    ) -> Result<TuneOutcome, I2C::Error> {
        let (reg, bit) = request.start_bit();
        let op = request.operation();

        // an abort raised before this run started is stale
        abort.reset();

        self.read_all().await?;
        request.apply(&mut self.bank);
        self.write_range().await?;

        if let Err(e) = self.wait_for_stc(true, op, config, abort).await {
            if !e.is_bus() {
                self.abandon(reg, bit).await;
            }
            return Err(e);
        }
        let outcome = TuneOutcome::from_bank(&self.bank);

        // new frequency, accumulated RDS state belongs to the old one
        self.rds.reset();

        self.bank.clear_bits(reg, bit);
        self.write_range().await?;
        self.wait_for_stc(false, Operation::Clear, config, abort).await?;

        Ok(outcome)
    }

    /// Poll the bank until STC equals `set`
    async fn wait_for_stc<M: RawMutex>(
        &mut self,
        set: bool,
        op: Operation,
        config: &Config,
        abort: &Signal<M, ()>,
    ) -> Result<(), I2C::Error> {
        let interval_us = u32::try_from(config.poll_interval.as_micros()).unwrap_or(u32::MAX);
        for _ in 0..config.max_poll_attempts {
            self.read_all().await?;
            if self.bank.stc() == set {
                return Ok(());
            }
            if abort.try_take().is_some() {
                warn!("{} aborted", op);
                return Err(Error::Cancelled(op));
            }
            self.delay.delay_us(interval_us).await;
        }
        warn!("{} timed out after {} polls", op, config.max_poll_attempts);
        Err(Error::Timeout(op))
    }

    /// Best-effort clear of a start bit after a failed wait
    async fn abandon(&mut self, reg: Register, bit: u16) {
        self.bank.clear_bits(reg, bit);
        if self.write_range().await.is_err() {
            error!("could not clear start bit after failed wait");
        }
    }
}
