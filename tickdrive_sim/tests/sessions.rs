//! End-to-end demo sessions driven through the public harness API.

use approx::assert_relative_eq;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tickdrive_core::{EndReason, KeyboardPoller, RunMode, ScheduleState, TickScheduler};
use tickdrive_env::{ManualClock, ModelRunner};
use tickdrive_sim::{prepare, DemoOptions, RoadWorld, ScenarioId, SimError};

fn session(
    scenario: ScenarioId,
    options: DemoOptions,
    keys: &[u8],
) -> (TickScheduler<RoadWorld>, RunMode, ManualClock) {
    let keyboard = if keys.is_empty() {
        KeyboardPoller::stub()
    } else {
        KeyboardPoller::replay(keys.to_vec())
    };
    let demo = prepare(scenario, &options, keyboard, Arc::new(AtomicBool::new(false))).unwrap();
    let clock = ManualClock::new();
    (demo.scheduler.with_clock(clock.clone()), demo.mode, clock)
}

fn bounded(duration_secs: f64, realtime_rate: f64) -> DemoOptions {
    DemoOptions {
        duration_secs,
        realtime_rate,
        ..Default::default()
    }
}

#[test]
fn test_crash_scenario_pauses_on_first_collision() {
    let (mut scheduler, _, _) = session(ScenarioId::Crash, DemoOptions::default(), &[]);
    
    let mut ticks = 0;
    while scheduler.state() == ScheduleState::Running {
        scheduler.tick().unwrap();
        ticks += 1;
        assert!(ticks < 1000, "no collision after {} ticks", ticks);
    }
    
    assert_eq!(scheduler.state(), ScheduleState::Paused);
    assert!(!scheduler.runner().collisions().unwrap().is_empty());
    assert!(scheduler.runner().cars().iter().any(|car| car.crashed));
    
    // paused: further ticks are dropped and the world stands still
    let before = scheduler.runner().sim_time();
    for _ in 0..10 {
        assert!(!scheduler.tick().unwrap());
    }
    assert_eq!(scheduler.runner().sim_time(), before);
}

#[test]
fn test_bounded_session_exhausts() {
    let (mut scheduler, mode, clock) = session(ScenarioId::Keyop, bounded(1.0, 1.0), &[]);
    assert_eq!(mode, RunMode::Bounded(50));
    
    let summary = scheduler.start(mode).unwrap();
    
    assert_eq!(summary.ticks, 50);
    assert_eq!(summary.end_reason, EndReason::Exhausted);
    assert_relative_eq!(summary.simulated_secs, 1.0, epsilon = 1e-9);
    assert_eq!(clock.sleeps().len(), 50);
    assert!(scheduler.is_released());
}

#[test]
fn test_crash_session_with_duration_ends_after_collision_pause() {
    let (mut scheduler, mode, _) = session(ScenarioId::Crash, bounded(30.0, 1.0), &[]);
    assert_eq!(mode, RunMode::Bounded(1500));
    
    let summary = scheduler.start(mode).unwrap();
    
    assert_eq!(summary.end_reason, EndReason::Exhausted);
    assert_eq!(summary.cycles, 1500);
    assert!(summary.ticks > 400 && summary.ticks < 1500, "ticks = {}", summary.ticks);
    assert!(scheduler.runner().cars().iter().any(|car| car.crashed));
    assert_eq!(scheduler.state(), ScheduleState::Terminated);
    assert!(scheduler.is_released());
}

#[test]
fn test_paused_headless_session_with_duration_ends() {
    let options = DemoOptions {
        duration_secs: 1.0,
        paused: true,
        ..Default::default()
    };
    let (mut scheduler, mode, clock) = session(ScenarioId::Keyop, options, &[]);
    
    let summary = scheduler.start(mode).unwrap();
    
    assert_eq!(summary.end_reason, EndReason::Exhausted);
    assert_eq!(summary.ticks, 0);
    assert_eq!(summary.cycles, 50);
    assert_eq!(clock.sleeps().len(), 50);
    assert!(scheduler.is_released());
}

#[test]
fn test_quit_key_ends_endless_session() {
    let (mut scheduler, mode, _) = session(ScenarioId::Crash, DemoOptions::default(), b"q");
    assert_eq!(mode, RunMode::Indefinite);
    
    let summary = scheduler.start(mode).unwrap();
    
    assert_eq!(summary.end_reason, EndReason::Quit);
    assert_eq!(summary.ticks, 0);
}

#[test]
fn test_paused_start_steps_on_key() {
    let options = DemoOptions {
        paused: true,
        ..Default::default()
    };
    let (mut scheduler, mode, _) = session(ScenarioId::Keyop, options, b"xssq");
    
    let summary = scheduler.start(mode).unwrap();
    
    assert_eq!(summary.ticks, 2);
    assert_eq!(summary.commands, 3);
    assert_eq!(summary.end_reason, EndReason::Quit);
}

#[test]
fn test_signal_ends_paused_session() {
    let options = DemoOptions {
        paused: true,
        ..Default::default()
    };
    let demo = prepare(ScenarioId::Crash, &options, KeyboardPoller::stub(), Arc::new(AtomicBool::new(true))).unwrap();
    let mut scheduler = demo.scheduler.with_clock(ManualClock::new());
    
    let summary = scheduler.start(demo.mode).unwrap();
    
    assert_eq!(summary.end_reason, EndReason::Quit);
    assert_eq!(summary.ticks, 0);
}

#[test]
fn test_scriptlets_speed_up_after_ten_seconds() {
    let (mut scheduler, mode, _) = session(ScenarioId::Scriptlets, bounded(10.5, 0.0), &[]);
    
    scheduler.start(mode).unwrap();
    
    let rail = scheduler.runner().velocity(&"rail0".into()).unwrap();
    assert_relative_eq!(rail.speed(), 20.0, epsilon = 1e-9);
}

#[test]
fn test_realtime_rate_cycles_from_zero() {
    let (mut scheduler, mode, clock) = session(ScenarioId::Realtime, bounded(4.0, 0.0), &[]);
    
    let summary = scheduler.start(mode).unwrap();
    
    // 0.0 -> 0.2 on the first tick, 0.2 -> 0.4 on tick 82
    assert_eq!(summary.ticks, 200);
    assert_relative_eq!(summary.final_rate, 0.4, epsilon = 1e-9);
    assert_relative_eq!(scheduler.runner().rate(), 0.4, epsilon = 1e-9);
    assert_eq!(clock.sleeps()[1], scheduler.period().div_f64(0.2));
}

#[test]
fn test_negative_rate_rejected() {
    let result = prepare(
        ScenarioId::Crash,
        &bounded(1.0, -0.5),
        KeyboardPoller::stub(),
        Arc::new(AtomicBool::new(false)),
    );
    assert!(matches!(result, Err(SimError::InvalidRate(r)) if r == -0.5));
}
