//! Radio Data System forwarding
//!
//! The driver does not interpret RDS content. It watches the RDS-ready flag
//! and hands each raw group to an [`RdsDecoder`], which keeps whatever state
//! it needs across groups. Tuning and seeking reset the decoder because
//! groups from the old station are meaningless on the new one.

use embassy_futures::select::{select, Either};
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::signal::Signal;
use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::i2c::I2c;
use heapless::Deque;

use crate::device::Si4703;
use crate::error::Result;

/// One RDS group as delivered by the tuner (blocks A-D)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RdsGroup {
    /// Block A (program identification)
    pub a: u16,
    /// Block B (group type, flags)
    pub b: u16,
    /// Block C
    pub c: u16,
    /// Block D
    pub d: u16,
}

impl RdsGroup {
    /// Group type code (0-15) from block B
    #[must_use]
    pub const fn group_type(&self) -> u8 {
        (self.b >> 12) as u8
    }

    /// Version B flag from block B
    #[must_use]
    pub const fn is_version_b(&self) -> bool {
        self.b & (1 << 11) != 0
    }
}

/// Consumer of raw RDS groups
pub trait RdsDecoder {
    /// Accumulate one group
    fn update(&mut self, group: RdsGroup);

    /// Drop all accumulated state
    fn reset(&mut self);
}

/// Decoder that ignores RDS
impl RdsDecoder for () {
    fn update(&mut self, _group: RdsGroup) {}

    fn reset(&mut self) {}
}

/// Bounded queue of raw groups for another task to consume
///
/// When full, the oldest group is dropped.
#[derive(Debug, Default)]
pub struct GroupQueue<const N: usize> {
    groups: Deque<RdsGroup, N>,
    dropped: u32,
}

impl<const N: usize> GroupQueue<N> {
    /// Create an empty queue
    #[must_use]
    pub const fn new() -> Self {
        Self {
            groups: Deque::new(),
            dropped: 0,
        }
    }

    /// Take the oldest queued group
    pub fn pop(&mut self) -> Option<RdsGroup> {
        self.groups.pop_front()
    }

    /// Number of queued groups
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Check if no group is queued
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Groups discarded because the queue was full
    #[must_use]
    pub const fn dropped(&self) -> u32 {
        self.dropped
    }
}

impl<const N: usize> RdsDecoder for GroupQueue<N> {
    fn update(&mut self, group: RdsGroup) {
        if self.groups.is_full() {
            self.groups.pop_front();
            self.dropped = self.dropped.saturating_add(1);
        }
        // cannot fail, a slot was just freed
        let _ = self.groups.push_back(group);
    }

    fn reset(&mut self) {
        self.groups.clear();
        self.dropped = 0;
    }
}

impl<M, I2C, D, R> Si4703<M, I2C, D, R>
where
    M: RawMutex,
    I2C: I2c,
    D: DelayNs,
    R: RdsDecoder,
{
    /// Run one RDS poll tick
    ///
    /// Reads the bank and forwards blocks A-D to the decoder if the
    /// RDS-ready flag is set. Returns whether a group was forwarded.
    pub async fn poll_rds_once(&self) -> Result<bool, I2C::Error> {
        let mut guard = self.inner.lock().await;
        let inner = &mut *guard;
        inner.read_all().await?;
        if !inner.bank.status().rds_ready {
            return Ok(false);
        }
        let group = inner.bank.rds_group();
        trace!("rds group {:x} {:x} {:x} {:x}", group.a, group.b, group.c, group.d);
        inner.rds.update(group);
        Ok(true)
    }

    /// Poll for RDS groups until `stop` is signalled
    ///
    /// Ticks every `Config::rds_poll_period`, waiting on `delay` without
    /// holding the device lock. A failed tick is logged and the loop carries
    /// on with the next one. Returns the number of groups forwarded.
    pub async fn run_rds<T: DelayNs>(&self, mut delay: T, stop: &Signal<M, ()>) -> u32 {
        let period_us = u32::try_from(self.config.rds_poll_period.as_micros()).unwrap_or(u32::MAX);
        let mut forwarded = 0u32;
        info!("rds poll loop started");
        loop {
            if let Either::First(()) = select(stop.wait(), delay.delay_us(period_us)).await {
                info!("rds poll loop stopped after {} groups", forwarded);
                return forwarded;
            }
            match self.poll_rds_once().await {
                Ok(true) => forwarded = forwarded.wrapping_add(1),
                Ok(false) => {}
                Err(_) => warn!("rds poll read failed"),
            }
        }
    }
}
