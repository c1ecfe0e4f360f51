//! RDS Forwarding Tests
//!
//! Single poll ticks, the stoppable poll loop and the bundled group queue.

mod common;

use std::rc::Rc;

use common::{fixture, fixture_with, MockI2c, Model, NoopDelay, Recorder};
use embassy_futures::block_on;
use embassy_futures::join::join;
use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use embassy_sync::signal::Signal;
use si4703_radio::{Config, Frequency, GroupQueue, RdsGroup, Si4703};

const BLOCKS: [u16; 4] = [0x54A8, 0x0408, 0xE0CD, 0x4D41];

fn blocks_group(blocks: [u16; 4]) -> RdsGroup {
    RdsGroup {
        a: blocks[0],
        b: blocks[1],
        c: blocks[2],
        d: blocks[3],
    }
}

// ============================================================================
// Single tick
// ============================================================================

#[test]
fn tick_without_rds_ready_forwards_nothing() {
    let f = fixture(Model::new());

    assert!(!block_on(f.radio.poll_rds_once()).unwrap());

    assert!(block_on(f.radio.with_rds(|r| r.groups.is_empty())));
}

#[test]
fn tick_forwards_each_ready_group_once() {
    let mut model = Model::new();
    model.rds_script.push_back(Some(BLOCKS));
    model.rds_script.push_back(None);
    model.rds_script.push_back(Some([1, 2, 3, 4]));
    let f = fixture(model);

    assert!(block_on(f.radio.poll_rds_once()).unwrap());
    assert!(!block_on(f.radio.poll_rds_once()).unwrap());
    assert!(block_on(f.radio.poll_rds_once()).unwrap());

    let groups = block_on(f.radio.with_rds(|r| r.groups.clone()));
    assert_eq!(groups, vec![blocks_group(BLOCKS), blocks_group([1, 2, 3, 4])]);
}

#[test]
fn tick_reports_read_failure() {
    let mut model = Model::new();
    model.fail_reads = 1;
    let f = fixture(model);

    assert!(block_on(f.radio.poll_rds_once()).is_err());
}

// ============================================================================
// Poll loop
// ============================================================================

#[test]
fn loop_stops_when_signalled() {
    let stop = Rc::new(Signal::<NoopRawMutex, ()>::new());
    let mut model = Model::new();
    for n in 0..5 {
        model.rds_script.push_back(Some([n, n, n, n]));
        model.rds_script.push_back(None);
    }
    let recorder = Recorder {
        stop_after: Some((3, stop.clone())),
        ..Default::default()
    };
    let f = fixture_with(model, Config::default(), recorder, false);
    let loop_delay = NoopDelay::default();
    let slept = loop_delay.total_ns.clone();

    let forwarded = block_on(f.radio.run_rds(loop_delay, &stop));

    assert_eq!(forwarded, 3);
    // three groups took five ticks
    assert_eq!(f.model.borrow().reads, 5);
    assert_eq!(slept.get(), 5 * 40_000_000);
    // the control-path delay was not used
    assert_eq!(f.delay_ns.get(), 0);
}

#[test]
fn loop_exits_without_polling_when_already_stopped() {
    let f = fixture(Model::new());
    let stop = Signal::<NoopRawMutex, ()>::new();
    stop.signal(());

    let forwarded = block_on(f.radio.run_rds(NoopDelay::default(), &stop));

    assert_eq!(forwarded, 0);
    assert_eq!(f.model.borrow().reads, 0);
}

#[test]
fn loop_survives_read_failure() {
    let stop = Rc::new(Signal::<NoopRawMutex, ()>::new());
    let mut model = Model::new();
    model.fail_reads = 2;
    model.rds_script.push_back(Some(BLOCKS));
    let recorder = Recorder {
        stop_after: Some((1, stop.clone())),
        ..Default::default()
    };
    let f = fixture_with(model, Config::default(), recorder, false);

    let forwarded = block_on(f.radio.run_rds(NoopDelay::default(), &stop));

    assert_eq!(forwarded, 1);
    assert_eq!(f.model.borrow().reads, 1);
    let groups = block_on(f.radio.with_rds(|r| r.groups.clone()));
    assert_eq!(groups, vec![blocks_group(BLOCKS)]);
}

#[test]
fn loop_uses_configured_period() {
    let stop = Rc::new(Signal::<NoopRawMutex, ()>::new());
    let mut model = Model::new();
    model.rds_script.push_back(Some(BLOCKS));
    let recorder = Recorder {
        stop_after: Some((1, stop.clone())),
        ..Default::default()
    };
    let config = Config::default().with_rds_poll_period(embassy_time::Duration::from_millis(87));
    let f = fixture_with(model, config, recorder, false);
    let loop_delay = NoopDelay::default();
    let slept = loop_delay.total_ns.clone();

    block_on(f.radio.run_rds(loop_delay, &stop));

    assert_eq!(slept.get(), 87_000_000);
}

#[test]
fn loop_waits_for_running_tune() {
    let stop = Signal::<NoopRawMutex, ()>::new();
    let mut model = Model::new();
    // every read carries a group tagged with its read number
    for n in 1..=20 {
        model.rds_script.push_back(Some([n, n, n, n]));
    }
    let f = fixture_with(model, Config::default(), Recorder::default(), true);
    let loop_delay = NoopDelay {
        yielding: true,
        ..Default::default()
    };

    let (forwarded, (outcome, tune_reads)) = block_on(join(
        f.radio.run_rds(loop_delay, &stop),
        async {
            let outcome = f.radio.tune(Frequency::from_khz(101_100).unwrap()).await;
            let tune_reads = f.model.borrow().reads;
            stop.signal(());
            (outcome, tune_reads)
        },
    ));

    assert_eq!(outcome.unwrap().frequency, Frequency::from_khz(101_100).unwrap());
    assert_eq!(forwarded, 1);
    let (groups, resets) = block_on(f.radio.with_rds(|r| (r.groups.clone(), r.resets)));
    assert_eq!(resets, 1);
    // the only forwarded group was read after the tune released the device
    let first_after_tune = u16::try_from(tune_reads).unwrap() + 1;
    assert_eq!(groups, vec![blocks_group([first_after_tune; 4])]);
}

// ============================================================================
// Group queue as the device decoder
// ============================================================================

#[test]
fn queue_collects_groups_and_clears_on_tune() {
    let model = Rc::new(std::cell::RefCell::new(Model::new()));
    {
        let mut m = model.borrow_mut();
        m.rds_script.push_back(Some(BLOCKS));
        m.rds_script.push_back(Some([5, 6, 7, 8]));
    }
    let radio: Si4703<NoopRawMutex, _, _, _> = Si4703::new(
        MockI2c {
            model: model.clone(),
        },
        NoopDelay::default(),
        GroupQueue::<4>::new(),
        Config::default(),
    );

    block_on(radio.poll_rds_once()).unwrap();
    block_on(radio.poll_rds_once()).unwrap();
    assert_eq!(block_on(radio.with_rds(|q| q.len())), 2);
    assert_eq!(
        block_on(radio.with_rds(|q| q.pop())),
        Some(blocks_group(BLOCKS))
    );

    block_on(radio.tune(Frequency::from_khz(99_900).unwrap())).unwrap();
    assert!(block_on(radio.with_rds(|q| q.is_empty())));
}
