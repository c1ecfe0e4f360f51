//! `Si4702`/`Si4703` FM receiver driver
//!
//! [`Si4703`] owns the I2C connection, the shadow register bank, the delay
//! source and the RDS decoder behind one async mutex. Every public operation
//! takes the lock once and keeps it for its whole read-modify-write
//! sequence, so the RDS poll loop and the control path can share a
//! `&Si4703` without interleaving bus transactions.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::mutex::Mutex;
use embassy_sync::signal::Signal;
use embassy_time::Duration;
use embedded_hal::digital::OutputPin;
use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::i2c::I2c;

use crate::bus::RegisterBus;
use crate::config::{
    Config, OSCILLATOR_ENABLE, OSCILLATOR_SETTLE, POWER_DOWN, POWER_UP, POWER_UP_SETTLE,
};
use crate::error::{Error, Result};
use crate::rds::RdsDecoder;
use crate::registers::{powercfg, sysconfig1, Register, RegisterBank, Status};
use crate::reset;
use crate::tuning::TuneOutcome;
use crate::types::{Frequency, SeekDirection, TuneRequest, Volume};

/// State guarded by the device lock
pub(crate) struct Inner<I2C, D, R> {
    pub(crate) bus: RegisterBus<I2C>,
    pub(crate) bank: RegisterBank,
    pub(crate) delay: D,
    pub(crate) rds: R,
}

impl<I2C: I2c, D: DelayNs, R> Inner<I2C, D, R> {
    /// Refresh the shadow bank, leaving it untouched on failure
    pub(crate) async fn read_all(&mut self) -> Result<(), I2C::Error> {
        self.bus.read_all(&mut self.bank).await.map_err(Error::Bus)
    }

    /// Write the writable range of the shadow bank
    pub(crate) async fn write_range(&mut self) -> Result<(), I2C::Error> {
        self.bus.write_range(&self.bank).await.map_err(Error::Bus)
    }

    /// Read, apply `f` to the fresh bank, write back
    async fn modify<F>(&mut self, f: F) -> Result<(), I2C::Error>
    where
        F: FnOnce(&mut RegisterBank),
    {
        self.read_all().await?;
        f(&mut self.bank);
        self.write_range().await
    }

    async fn sleep(&mut self, duration: Duration) {
        let us = u32::try_from(duration.as_micros()).unwrap_or(u32::MAX);
        self.delay.delay_us(us).await;
    }
}

/// `Si4702`/`Si4703` driver
pub struct Si4703<M: RawMutex, I2C, D, R> {
    pub(crate) inner: Mutex<M, Inner<I2C, D, R>>,
    pub(crate) abort: Signal<M, ()>,
    pub(crate) config: Config,
}

impl<M, I2C, D, R> Si4703<M, I2C, D, R>
where
    M: RawMutex,
    I2C: I2c,
    D: DelayNs,
    R: RdsDecoder,
{
    /// Create a driver; no bus traffic until [`Self::power_up`]
    #[must_use]
    pub fn new(i2c: I2C, delay: D, rds: R, config: Config) -> Self {
        Self {
            inner: Mutex::new(Inner {
                bus: RegisterBus::new(i2c, config.address),
                bank: RegisterBank::new(),
                delay,
                rds,
            }),
            abort: Signal::new(),
            config,
        }
    }

    /// Driver configuration
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Pulse the reset line, then power the chip up
    pub async fn start<P: OutputPin>(&self, reset_pin: &mut P) -> Result<(), I2C::Error> {
        {
            let mut inner = self.inner.lock().await;
            reset::hardware_reset(reset_pin, &mut inner.delay)
                .await
                .map_err(|_| Error::ResetPin)?;
        }
        self.power_up().await
    }

    /// Enable the oscillator and the IC
    ///
    /// The chip must have been reset into 2-wire mode beforehand.
    pub async fn power_up(&self) -> Result<(), I2C::Error> {
        let mut inner = self.inner.lock().await;
        info!("enabling oscillator");
        inner
            .modify(|bank| bank.set(Register::Test1, OSCILLATOR_ENABLE))
            .await?;
        inner.sleep(OSCILLATOR_SETTLE).await;

        info!("powering up");
        let config = self.config;
        inner
            .modify(|bank| {
                bank.set(Register::PowerCfg, POWER_UP);
                if config.rds_enabled {
                    bank.set_bits(Register::SysConfig1, sysconfig1::RDS);
                }
                bank.set_volume(config.startup_volume);
            })
            .await?;
        inner.sleep(POWER_UP_SETTLE).await;

        inner.rds.reset();
        Ok(())
    }

    /// Disable the IC
    pub async fn power_down(&self) -> Result<(), I2C::Error> {
        info!("powering down");
        let mut inner = self.inner.lock().await;
        inner
            .modify(|bank| bank.set(Register::PowerCfg, POWER_DOWN))
            .await
    }

    /// Power down and give back the I2C bus
    pub async fn close(self) -> Result<I2C, I2C::Error> {
        self.power_down().await?;
        Ok(self.inner.into_inner().bus.release())
    }

    /// Set the output volume, saturating to 0..=15
    pub async fn set_volume(&self, level: i32) -> Result<Volume, I2C::Error> {
        let volume = Volume::saturating(level);
        let mut inner = self.inner.lock().await;
        inner.modify(|bank| bank.set_volume(volume)).await?;
        debug!("volume {}", volume.level());
        Ok(volume)
    }

    /// Turn softmute off
    pub async fn disable_soft_mute(&self) -> Result<(), I2C::Error> {
        self.update_powercfg(powercfg::DSMUTE, true).await
    }

    /// Turn softmute back on
    pub async fn enable_soft_mute(&self) -> Result<(), I2C::Error> {
        self.update_powercfg(powercfg::DSMUTE, false).await
    }

    /// Unmute the audio output
    pub async fn disable_mute(&self) -> Result<(), I2C::Error> {
        self.update_powercfg(powercfg::DMUTE, true).await
    }

    /// Mute the audio output
    pub async fn enable_mute(&self) -> Result<(), I2C::Error> {
        self.update_powercfg(powercfg::DMUTE, false).await
    }

    async fn update_powercfg(&self, bit: u16, set: bool) -> Result<(), I2C::Error> {
        let mut inner = self.inner.lock().await;
        inner
            .modify(|bank| {
                if set {
                    bank.set_bits(Register::PowerCfg, bit);
                } else {
                    bank.clear_bits(Register::PowerCfg, bit);
                }
            })
            .await
    }

    /// Tune to a frequency
    pub async fn tune(&self, frequency: Frequency) -> Result<TuneOutcome, I2C::Error> {
        self.execute(TuneRequest::Channel(frequency)).await
    }

    /// Tune to a frequency given in kHz
    pub async fn set_channel(&self, khz: u32) -> Result<TuneOutcome, I2C::Error> {
        let frequency = Frequency::from_khz(khz).ok_or(Error::FrequencyOutOfRange(khz))?;
        self.tune(frequency).await
    }

    /// Seek to the next station
    ///
    /// A seek that hits the band limit still completes; check
    /// [`TuneOutcome::band_limit`].
    pub async fn seek(&self, direction: SeekDirection) -> Result<TuneOutcome, I2C::Error> {
        self.execute(TuneRequest::Seek(direction)).await
    }

    /// Run a tune or seek request
    pub async fn execute(&self, request: TuneRequest) -> Result<TuneOutcome, I2C::Error> {
        let mut inner = self.inner.lock().await;
        match request {
            TuneRequest::Channel(frequency) => info!("tuning to {}", frequency),
            TuneRequest::Seek(direction) => info!("seeking {}", direction),
        }
        let outcome = match inner.run(request, &self.config, &self.abort).await {
            Ok(outcome) => outcome,
            Err(e) => {
                if e.is_bus() {
                    error!("bus failure during tune/seek");
                }
                return Err(e);
            }
        };
        info!("tuned to {}", outcome.frequency);
        Ok(outcome)
    }

    /// Abort a tune or seek that is waiting on the completion flag
    pub fn abort(&self) {
        self.abort.signal(());
    }

    /// Read and decode the status register
    pub async fn status(&self) -> Result<Status, I2C::Error> {
        let mut inner = self.inner.lock().await;
        inner.read_all().await?;
        Ok(inner.bank.status())
    }

    /// Read the frequency the chip is tuned to
    pub async fn frequency(&self) -> Result<Frequency, I2C::Error> {
        let mut inner = self.inner.lock().await;
        inner.read_all().await?;
        Ok(inner.bank.read_channel().frequency())
    }

    /// Copy of the shadow bank, without bus traffic
    pub async fn registers(&self) -> RegisterBank {
        self.inner.lock().await.bank
    }

    /// Access the RDS decoder
    pub async fn with_rds<T>(&self, f: impl FnOnce(&mut R) -> T) -> T {
        let mut inner = self.inner.lock().await;
        f(&mut inner.rds)
    }
}
