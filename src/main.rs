//! Si4703 FM Receiver Demo
//!
//! Entry point for the STM32G474 demo board. Resets and powers up the
//! receiver, runs the RDS poll loop in its own task and steps through
//! stations from the main task.

#![no_std]
#![no_main]

use defmt::{info, warn};
use embassy_executor::Spawner;
use embassy_stm32::gpio::{Level, Output, Speed};
use embassy_stm32::i2c::I2c;
use embassy_stm32::mode::Async;
use embassy_stm32::time::Hertz;
use embassy_stm32::{bind_interrupts, peripherals};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embassy_time::{Delay, Duration, Timer};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use si4703_radio::{Config, GroupQueue, SeekDirection, Si4703};

type Radio = Si4703<CriticalSectionRawMutex, I2c<'static, Async>, Delay, GroupQueue<16>>;

static RADIO: StaticCell<Radio> = StaticCell::new();
static RDS_STOP: Signal<CriticalSectionRawMutex, ()> = Signal::new();

bind_interrupts!(struct Irqs {
    I2C1_EV => embassy_stm32::i2c::EventInterruptHandler<peripherals::I2C1>;
    I2C1_ER => embassy_stm32::i2c::ErrorInterruptHandler<peripherals::I2C1>;
});

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Si4703 demo v{}", env!("CARGO_PKG_VERSION"));

    let p = embassy_stm32::init(embassy_stm32::Config::default());

    // PB8 = SCL, PB9 = SDA; SDIO must be held low while reset rises to select 2-wire mode
    let i2c = I2c::new(
        p.I2C1,
        p.PB8,
        p.PB9,
        Irqs,
        p.DMA1_CH1,
        p.DMA1_CH2,
        Hertz(400_000),
        Default::default(),
    );
    let mut reset = Output::new(p.PA8, Level::High, Speed::Low);

    let radio: &'static Radio = RADIO.init(Si4703::new(
        i2c,
        Delay,
        GroupQueue::new(),
        Config::default(),
    ));

    if let Err(e) = radio.start(&mut reset).await {
        warn!("start failed: {}", e);
        return;
    }
    info!("receiver powered up");

    if radio.set_volume(8).await.is_err() || radio.disable_mute().await.is_err() {
        warn!("audio setup failed");
    }

    if spawner.spawn(rds_task(radio)).is_err() {
        warn!("rds task not spawned");
    }

    loop {
        match radio.seek(SeekDirection::Up).await {
            Ok(outcome) if outcome.band_limit => {
                info!("band limit reached at {}", outcome.frequency);
            }
            Ok(outcome) => {
                info!("station at {} rssi {}", outcome.frequency, outcome.status.rssi);
            }
            Err(e) => warn!("seek failed: {}", e),
        }

        Timer::after(Duration::from_secs(10)).await;

        let queued = radio
            .with_rds(|q| {
                let mut n = 0u32;
                while q.pop().is_some() {
                    n += 1;
                }
                n
            })
            .await;
        info!("{} rds groups since last station", queued);
    }
}

/// Background RDS polling
#[embassy_executor::task]
async fn rds_task(radio: &'static Radio) {
    let groups = radio.run_rds(Delay, &RDS_STOP).await;
    info!("rds task done, {} groups", groups);
}
