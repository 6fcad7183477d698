//! The tick scheduler - the interactive real-time drive loop.
//!
//! One cycle of [`TickScheduler::start`]:
//!
//! ```text
//! poll key ──► dispatch command ──► sync runner ──► tick() ──► throttle sleep
//!                                                    │
//!                              pre-tick hooks ─► advance(Δt) ─► post-tick hooks
//! ```
//!
//! Everything runs on the caller's thread. The only suspension points are
//! the throttle sleep and the (never blocking) keyboard poll. A stop request
//! is honoured at the next loop boundary, never in the middle of a tick.

use crate::commands::KeyCommandDispatcher;
use crate::config::{RunMode, SessionConfig};
use crate::controls::SessionControls;
use crate::error::SchedulerError;
use crate::hooks::{HookContext, HookPhase, HookRegistry, TickHook};
use crate::interrupt::{EndReason, InterruptProtocol};
use crate::pause::{PauseController, ScheduleState};
use crate::rate::RealtimeRateController;
use serde::Serialize;
use std::time::Duration;
use tickdrive_env::{Clock, ModelRunner, WallClock};
use tracing::{debug, error, info};

/// Outcome of a finished session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    /// Number of model advances executed
    pub ticks: u64,
    
    /// Loop cycles run, including paused ones
    pub cycles: u64,
    
    /// Simulated time reached (seconds)
    pub simulated_secs: f64,
    
    /// Wall-clock time spent in the drive loop (seconds)
    pub wall_secs: f64,
    
    /// Realtime rate at the end of the session
    pub final_rate: f64,
    
    /// Operator commands applied
    pub commands: u64,
    
    /// How the session ended
    pub end_reason: EndReason,
}

/// Drives a [`ModelRunner`] tick by tick under operator control.
pub struct TickScheduler<R: ModelRunner> {
    runner: R,
    period: Duration,
    hooks: HookRegistry,
    controls: SessionControls,
    interrupt: InterruptProtocol,
    dispatcher: KeyCommandDispatcher,
    clock: Box<dyn Clock>,
    tick_count: u64,
    cycles: u64,
    wall_elapsed: Duration,
    end_reason: Option<EndReason>,
}

impl<R: ModelRunner> TickScheduler<R> {
    /// Creates a scheduler with no keyboard, no launcher and the wall clock.
    ///
    /// # Errors
    /// * `SchedulerError::NonPositivePeriod` - zero tick period
    /// * `SchedulerError::InvalidRate` - negative or non-finite initial rate
    pub fn new(mut runner: R, config: SessionConfig) -> Result<Self, SchedulerError> {
        if config.period.is_zero() {
            return Err(SchedulerError::NonPositivePeriod(config.period));
        }
        let rate = if config.startup_window {
            RealtimeRateController::for_startup(config.initial_rate)?
        } else {
            RealtimeRateController::new(config.initial_rate)?
        };
        let pause = PauseController::new(config.start_paused);
        
        runner.set_rate(rate.rate());
        if pause.is_paused() {
            runner.pause();
        }
        
        Ok(Self {
            runner,
            period: config.period,
            hooks: HookRegistry::new(),
            controls: SessionControls::new(pause, rate),
            interrupt: InterruptProtocol::headless(),
            dispatcher: KeyCommandDispatcher::new(),
            clock: Box::new(WallClock::new()),
            tick_count: 0,
            cycles: 0,
            wall_elapsed: Duration::ZERO,
            end_reason: None,
        })
    }
    
    /// Hands the session's keyboard and launcher to the scheduler.
    pub fn with_interrupt(mut self, interrupt: InterruptProtocol) -> Self {
        self.interrupt = interrupt;
        self
    }
    
    /// Replaces the clock used for throttling.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }
    
    /// Appends a pre-tick hook.
    pub fn register_pre(&mut self, hook: impl TickHook + 'static) {
        self.hooks.register_pre(hook);
    }
    
    /// Appends a post-tick hook.
    pub fn register_post(&mut self, hook: impl TickHook + 'static) {
        self.hooks.register_post(hook);
    }
    
    /// Registered hooks.
    pub fn hooks(&self) -> &HookRegistry {
        &self.hooks
    }
    
    /// Fixed tick period.
    pub fn period(&self) -> Duration {
        self.period
    }
    
    /// Number of model advances executed so far.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }
    
    /// Number of loop cycles run so far, paused or not.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }
    
    /// Current scheduling state.
    pub fn state(&self) -> ScheduleState {
        self.controls.pause.state()
    }
    
    /// Session control state.
    pub fn controls(&self) -> &SessionControls {
        &self.controls
    }
    
    /// Mutable session control state.
    pub fn controls_mut(&mut self) -> &mut SessionControls {
        &mut self.controls
    }
    
    /// The model being driven.
    pub fn runner(&self) -> &R {
        &self.runner
    }
    
    /// Mutable access to the model.
    pub fn runner_mut(&mut self) -> &mut R {
        &mut self.runner
    }
    
    /// True once the keyboard and launcher have been released.
    pub fn is_released(&self) -> bool {
        self.interrupt.is_released()
    }
    
    /// Emits one tick if the pause state allows it.
    ///
    /// Returns whether the model advanced. Dropped ticks (paused or
    /// terminated) are not queued.
    pub fn tick(&mut self) -> Result<bool, SchedulerError> {
        if !self.controls.pause.admit_tick() {
            return Ok(false);
        }
        let index = self.tick_count;
        
        let mut ctx = HookContext {
            tick: index,
            period: self.period,
            runner: &mut self.runner,
            controls: &mut self.controls,
        };
        self.hooks.run(HookPhase::PreTick, &mut ctx)?;
        
        self.runner.advance(self.period).map_err(SchedulerError::Advance)?;
        self.tick_count += 1;
        
        let mut ctx = HookContext {
            tick: index,
            period: self.period,
            runner: &mut self.runner,
            controls: &mut self.controls,
        };
        self.hooks.run(HookPhase::PostTick, &mut ctx)?;
        
        debug!("tick {} done", index);
        Ok(true)
    }
    
    /// Terminates the session after the tick in flight and releases the
    /// keyboard and launcher. Safe to call any number of times.
    pub fn request_stop(&mut self) {
        if self.end_reason.is_none() {
            self.end_reason = Some(EndReason::Quit);
        }
        self.interrupt.request_stop(&mut self.controls.pause);
    }
    
    /// Runs the drive loop until the bound is reached or a stop is requested.
    ///
    /// A bounded run counts loop cycles, so a session left paused still
    /// ends once the bound is reached. Cleanup runs exactly once however the
    /// loop ends, including on error.
    pub fn start(&mut self, mode: RunMode) -> Result<SessionSummary, SchedulerError> {
        match mode {
            RunMode::Indefinite => info!("Running simulation indefinitely."),
            RunMode::Bounded(n) => info!(
                "Running simulation for {} seconds.",
                n as f64 * self.period.as_secs_f64()
            ),
        }
        
        let started = self.clock.now();
        let outcome = self.drive(mode);
        self.wall_elapsed += self.clock.now().saturating_sub(started);
        let reason = match &outcome {
            Ok(reason) => *reason,
            Err(e) => {
                error!("Simulation aborted: {}", e);
                EndReason::Failed
            }
        };
        if self.end_reason.is_none() {
            self.end_reason = Some(reason);
        }
        self.interrupt.request_stop(&mut self.controls.pause);
        
        outcome.map(|_| self.summary())
    }
    
    /// Summary of the session so far.
    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            ticks: self.tick_count,
            cycles: self.cycles,
            wall_secs: self.wall_elapsed.as_secs_f64(),
            simulated_secs: self.runner.sim_time().as_secs_f64(),
            final_rate: self.controls.rate.rate(),
            commands: self.dispatcher.handled(),
            end_reason: self.end_reason.unwrap_or(EndReason::Quit),
        }
    }
    
    fn drive(&mut self, mode: RunMode) -> Result<EndReason, SchedulerError> {
        loop {
            if self.controls.pause.is_terminated() {
                return Ok(EndReason::Quit);
            }
            if let RunMode::Bounded(limit) = mode {
                if self.cycles >= limit {
                    return Ok(EndReason::Exhausted);
                }
            }
            
            if let Some(key) = self.interrupt.poll_key() {
                self.dispatcher.dispatch(key, &mut self.controls, self.period);
            }
            if self.interrupt.signalled() {
                self.controls.request_stop();
            }
            if self.controls.stop_requested() {
                self.request_stop();
                return Ok(EndReason::Quit);
            }
            self.sync_runner();
            
            let ticked = self.tick()?;
            self.cycles += 1;
            if self.controls.stop_requested() {
                self.request_stop();
                return Ok(EndReason::Quit);
            }
            self.sync_runner();
            
            // Idle (paused) cycles wait one period so the loop does not spin.
            let wait = if ticked {
                self.controls.rate.throttle(self.period)
            } else {
                self.period
            };
            if !wait.is_zero() {
                self.clock.sleep(wait);
            }
        }
    }
    
    fn sync_runner(&mut self) {
        let paused = self.controls.pause.is_paused();
        if paused != self.runner.is_paused() {
            if paused {
                self.runner.pause();
            } else {
                self.runner.resume();
            }
        }
        let rate = self.controls.rate.rate();
        if rate != self.runner.rate() {
            self.runner.set_rate(rate);
        }
    }
}

impl<R: ModelRunner> std::fmt::Debug for TickScheduler<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TickScheduler")
            .field("period", &self.period)
            .field("state", &self.state())
            .field("tick_count", &self.tick_count)
            .field("hooks", &self.hooks)
            .finish()
    }
}
