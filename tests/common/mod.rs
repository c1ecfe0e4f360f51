//! Test doubles: a simulated Si4703 behind a mock I2C bus, delays, a reset
//! pin and a recording RDS decoder.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use embassy_sync::signal::Signal;
use embedded_hal::digital;
use embedded_hal::i2c::{ErrorKind, NoAcknowledgeSource};
use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::i2c::{ErrorType, I2c, Operation};

use si4703_radio::registers::{channel, powercfg, status};
use si4703_radio::{Config, RdsDecoder, RdsGroup, Si4703};

pub const ADDRESS: u8 = 0x10;

pub type Radio = Si4703<NoopRawMutex, MockI2c, NoopDelay, Recorder>;

/// Simulated register file and completion-flag behaviour
#[derive(Debug, Default)]
pub struct Model {
    pub regs: [u16; 16],
    /// Reads after a start bit before STC sets, None = never
    pub stc_after: Option<u32>,
    /// Reads after the start bit clears before STC clears, None = never
    pub clear_after: Option<u32>,
    /// Channel a seek lands on
    pub seek_target: u16,
    /// Seek reports band limit
    pub seek_band_limit: bool,
    /// Per-read RDS data, None = RDSR clear
    pub rds_script: VecDeque<Option<[u16; 4]>>,
    /// Number of upcoming reads that fail
    pub fail_reads: u32,
    /// Number of upcoming writes that fail
    pub fail_writes: u32,
    /// Fail every read after this many successful ones
    pub fail_reads_after: Option<u32>,

    pub reads: u32,
    pub writes: Vec<Vec<u8>>,
    pub read_prefixes: Vec<Vec<u8>>,

    set_countdown: Option<u32>,
    clear_countdown: Option<u32>,
}

impl Model {
    pub fn new() -> Self {
        Self {
            stc_after: Some(2),
            clear_after: Some(1),
            ..Default::default()
        }
    }

    fn busy(&self) -> bool {
        self.regs[3] & channel::TUNE != 0 || self.regs[2] & powercfg::SEEK != 0
    }

    fn step(&mut self) {
        let stc = self.regs[10] & status::STC != 0;
        if self.busy() && !stc {
            if let Some(n) = self.set_countdown {
                if n == 0 {
                    self.set_countdown = None;
                    self.complete();
                } else {
                    self.set_countdown = Some(n - 1);
                }
            }
        } else if !self.busy() && stc {
            if let Some(n) = self.clear_countdown {
                if n == 0 {
                    self.clear_countdown = None;
                    self.regs[10] &= !(status::STC | status::SFBL);
                } else {
                    self.clear_countdown = Some(n - 1);
                }
            }
        }

        match self.rds_script.pop_front() {
            Some(Some(blocks)) => {
                self.regs[10] |= status::RDSR;
                self.regs[12..16].copy_from_slice(&blocks);
            }
            _ => self.regs[10] &= !status::RDSR,
        }
    }

    fn complete(&mut self) {
        self.regs[10] |= status::STC;
        if self.regs[2] & powercfg::SEEK != 0 {
            self.regs[11] = (self.regs[11] & !0x01FF) | self.seek_target;
            if self.seek_band_limit {
                self.regs[10] |= status::SFBL;
            }
        } else {
            self.regs[11] = (self.regs[11] & !0x01FF) | (self.regs[3] & 0x01FF);
        }
    }

    fn read(&mut self, prefix: &[u8], buf: &mut [u8]) -> Result<(), ErrorKind> {
        self.read_prefixes.push(prefix.to_vec());
        if self.fail_reads > 0 {
            self.fail_reads -= 1;
            return Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address));
        }
        if let Some(n) = self.fail_reads_after {
            if self.reads >= n {
                return Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address));
            }
        }
        self.reads += 1;
        self.step();
        assert_eq!(buf.len(), 32);
        for (i, pair) in buf.chunks_exact_mut(2).enumerate() {
            let reg = (0x0A + i) % 16;
            pair.copy_from_slice(&self.regs[reg].to_be_bytes());
        }
        Ok(())
    }

    fn write(&mut self, data: &[u8]) -> Result<(), ErrorKind> {
        if self.fail_writes > 0 {
            self.fail_writes -= 1;
            return Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Data));
        }
        assert_eq!(data.len(), 12);
        self.writes.push(data.to_vec());
        let was_busy = self.busy();
        for (i, pair) in data.chunks_exact(2).enumerate() {
            self.regs[2 + i] = u16::from_be_bytes([pair[0], pair[1]]);
        }
        let busy = self.busy();
        if busy && !was_busy {
            self.set_countdown = self.stc_after;
        }
        if !busy && was_busy {
            self.clear_countdown = self.clear_after;
        }
        Ok(())
    }

    /// POWERCFG bytes sent ahead of the most recent read
    pub fn last_prefix(&self) -> u16 {
        let prefix = self.read_prefixes.last().expect("no read recorded");
        u16::from_be_bytes([prefix[0], prefix[1]])
    }

    /// Decode the register words of a recorded write
    pub fn written_words(&self, index: usize) -> [u16; 6] {
        let mut words = [0u16; 6];
        for (w, pair) in words.iter_mut().zip(self.writes[index].chunks_exact(2)) {
            *w = u16::from_be_bytes([pair[0], pair[1]]);
        }
        words
    }
}

/// I2C bus wired to a shared [`Model`]
pub struct MockI2c {
    pub model: Rc<RefCell<Model>>,
}

impl ErrorType for MockI2c {
    type Error = ErrorKind;
}

impl I2c for MockI2c {
    async fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        assert_eq!(address, ADDRESS);
        let mut model = self.model.borrow_mut();
        match operations {
            [Operation::Write(prefix), Operation::Read(buf)] => {
                model.read(&prefix[..], &mut buf[..])
            }
            [Operation::Write(data)] => model.write(&data[..]),
            _ => panic!("unexpected transaction shape"),
        }
    }
}

/// Delay that completes immediately and sums requested time
#[derive(Clone, Default)]
pub struct NoopDelay {
    pub total_ns: Rc<Cell<u64>>,
    /// Yield to the executor once per delay
    pub yielding: bool,
}

impl DelayNs for NoopDelay {
    async fn delay_ns(&mut self, ns: u32) {
        self.total_ns.set(self.total_ns.get() + u64::from(ns));
        if self.yielding {
            embassy_futures::yield_now().await;
        }
    }
}

/// Reset pin that records levels
#[derive(Default)]
pub struct MockPin {
    pub levels: Vec<bool>,
    pub broken: bool,
}

impl digital::ErrorType for MockPin {
    type Error = digital::ErrorKind;
}

impl digital::OutputPin for MockPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        if self.broken {
            return Err(digital::ErrorKind::Other);
        }
        self.levels.push(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        if self.broken {
            return Err(digital::ErrorKind::Other);
        }
        self.levels.push(true);
        Ok(())
    }
}

/// Decoder that records every call
#[derive(Default)]
pub struct Recorder {
    pub groups: Vec<RdsGroup>,
    pub resets: u32,
    /// Signal `stop` once this many groups have been recorded
    pub stop_after: Option<(usize, Rc<Signal<NoopRawMutex, ()>>)>,
}

impl RdsDecoder for Recorder {
    fn update(&mut self, group: RdsGroup) {
        self.groups.push(group);
        if let Some((n, stop)) = &self.stop_after {
            if self.groups.len() >= *n {
                stop.signal(());
            }
        }
    }

    fn reset(&mut self) {
        self.resets += 1;
    }
}

pub struct Fixture {
    pub radio: Radio,
    pub model: Rc<RefCell<Model>>,
    pub delay_ns: Rc<Cell<u64>>,
}

pub fn fixture_with(model: Model, config: Config, recorder: Recorder, yielding: bool) -> Fixture {
    let model = Rc::new(RefCell::new(model));
    let delay = NoopDelay {
        total_ns: Rc::new(Cell::new(0)),
        yielding,
    };
    let delay_ns = delay.total_ns.clone();
    let radio = Si4703::new(
        MockI2c {
            model: model.clone(),
        },
        delay,
        recorder,
        config,
    );
    Fixture {
        radio,
        model,
        delay_ns,
    }
}

pub fn fixture(model: Model) -> Fixture {
    fixture_with(model, Config::default(), Recorder::default(), false)
}
