//! Built-in tick hooks used by the demos.

use crate::hooks::{HookContext, TickHook};
use nalgebra::Vector3;
use std::collections::BTreeSet;
use std::time::{Duration, Instant};
use tickdrive_env::{AgentName, Collision, EnvError, ModelRunner, Pose};
use tracing::info;

// =============================================================================
// COLLISION MONITOR (pre-tick)
// =============================================================================

/// One side of a reported collision.
#[derive(Debug, Clone, PartialEq)]
pub struct CrashReport {
    /// The agent being described
    pub agent: AgentName,
    
    /// The agent it hit
    pub other: AgentName,
    
    /// Contact point
    pub location: Vector3<f64>,
    
    /// Speed before impact (m/s)
    pub speed: f64,
    
    /// Where the agent came to rest
    pub rest_pose: Pose,
}

/// Pauses the session whenever agents start colliding.
///
/// A colliding pair is reported once; it only counts as a new collision event
/// after it has separated and collided again.
#[derive(Debug, Clone, Default)]
pub struct CollisionMonitor {
    active: BTreeSet<(AgentName, AgentName)>,
    reports: Vec<CrashReport>,
    events: u64,
}

impl CollisionMonitor {
    /// Creates a monitor with no known collisions.
    pub fn new() -> Self {
        Self::default()
    }
    
    /// Number of collision events that paused the session.
    pub fn events(&self) -> u64 {
        self.events
    }
    
    /// Every crash report produced so far.
    pub fn reports(&self) -> &[CrashReport] {
        &self.reports
    }
    
    fn describe(
        runner: &dyn ModelRunner,
        collision: &Collision,
        agent: &AgentName,
        other: &AgentName,
    ) -> Result<CrashReport, EnvError> {
        let speed = runner.velocity(agent)?.speed();
        let rest_pose = runner.pose(agent)?;
        info!("--> {} was going at {:.2} m/s and hit {}.", agent, speed, other);
        info!("    It now rests at {}.", rest_pose);
        Ok(CrashReport {
            agent: agent.clone(),
            other: other.clone(),
            location: collision.location,
            speed,
            rest_pose,
        })
    }
}

impl TickHook for CollisionMonitor {
    fn name(&self) -> &str {
        "collision_monitor"
    }
    
    fn on_tick(&mut self, ctx: &mut HookContext<'_>) -> Result<(), EnvError> {
        let collisions = ctx.runner.collisions()?;
        let current: BTreeSet<_> = collisions.iter().map(Collision::key).collect();
        self.active.retain(|pair| current.contains(pair));
        
        let mut fresh = Vec::new();
        for collision in &collisions {
            if self.active.insert(collision.key()) {
                fresh.push(collision);
            }
        }
        if fresh.is_empty() {
            return Ok(());
        }
        
        info!("Collisions have been detected!");
        for collision in fresh {
            let (a, b) = (&collision.agent_a, &collision.agent_b);
            let loc = collision.location;
            info!("{} and {} have crashed at ({:.2}, {:.2}, {:.2})!", a, b, loc.x, loc.y, loc.z);
            let first = Self::describe(&*ctx.runner, collision, a, b)?;
            let second = Self::describe(&*ctx.runner, collision, b, a)?;
            self.reports.push(first);
            self.reports.push(second);
        }
        
        ctx.controls.pause.pause();
        self.events += 1;
        info!("Simulation paused.");
        Ok(())
    }
}

// =============================================================================
// RATE CYCLER (post-tick)
// =============================================================================

/// Drives the realtime rate cycling policy once per tick.
#[derive(Debug, Clone, Default)]
pub struct RateCycler {
    changes: u64,
}

impl RateCycler {
    /// Creates a cycler.
    pub fn new() -> Self {
        Self::default()
    }
    
    /// Number of automatic rate changes applied.
    pub fn changes(&self) -> u64 {
        self.changes
    }
}

impl TickHook for RateCycler {
    fn name(&self) -> &str {
        "rate_cycler"
    }
    
    fn on_tick(&mut self, ctx: &mut HookContext<'_>) -> Result<(), EnvError> {
        let measured = ctx.runner.measured_rate();
        if let Some(change) = ctx.controls.rate.on_post_tick(measured) {
            ctx.runner.set_rate(change.rate);
            self.changes += 1;
            info!(
                "Running at real-time rate {:.1} for {} steps. Last real-time measure was {:.3}",
                change.rate, change.steps, change.last_measured
            );
        }
        Ok(())
    }
}

// =============================================================================
// STEP TIMING STATS (post-tick)
// =============================================================================

/// Averages the wall time between consecutive ticks.
///
/// Every `window` samples the average is logged and the statistics reset.
#[derive(Debug, Clone)]
pub struct StepTimingStats {
    window: usize,
    total: Duration,
    samples: usize,
    last: Option<Instant>,
}

impl StepTimingStats {
    /// Creates stats that report every `window` samples.
    pub fn new(window: usize) -> Self {
        Self {
            window: window.max(1),
            total: Duration::ZERO,
            samples: 0,
            last: None,
        }
    }
    
    /// Sets the instant the first interval is measured from.
    pub fn started_at(mut self, now: Instant) -> Self {
        self.last = Some(now);
        self
    }
    
    /// Records a tick completing at `now`; returns the window average when
    /// a window completes. Without a start instant the first call only
    /// marks the start.
    pub fn record(&mut self, now: Instant) -> Option<Duration> {
        let previous = self.last.replace(now)?;
        self.total += now.saturating_duration_since(previous);
        self.samples += 1;
        if self.samples < self.window {
            return None;
        }
        let average = self.total / self.samples as u32;
        self.total = Duration::ZERO;
        self.samples = 0;
        Some(average)
    }
}

impl Default for StepTimingStats {
    fn default() -> Self {
        Self::new(1000)
    }
}

impl TickHook for StepTimingStats {
    fn name(&self) -> &str {
        "step_timing_stats"
    }
    
    fn on_tick(&mut self, _ctx: &mut HookContext<'_>) -> Result<(), EnvError> {
        if let Some(average) = self.record(Instant::now()) {
            info!("Average simulation step takes {:.3}ms", average.as_secs_f64() * 1000.0);
        }
        Ok(())
    }
}

// =============================================================================
// DELAYED SPEED CHANGE (pre-tick)
// =============================================================================

/// Changes one agent's speed once simulated time reaches a threshold.
#[derive(Debug, Clone)]
pub struct SpeedChangeAt {
    agent: AgentName,
    speed: f64,
    at: Duration,
    done: bool,
}

impl SpeedChangeAt {
    /// Sets `agent` to `speed` m/s once `at` of simulated time has passed.
    pub fn new(agent: impl Into<String>, speed: f64, at: Duration) -> Self {
        Self {
            agent: AgentName::new(agent),
            speed,
            at,
            done: false,
        }
    }
    
    /// True once the change has been applied.
    pub fn is_done(&self) -> bool {
        self.done
    }
}

impl TickHook for SpeedChangeAt {
    fn name(&self) -> &str {
        "speed_change"
    }
    
    fn on_tick(&mut self, ctx: &mut HookContext<'_>) -> Result<(), EnvError> {
        if !self.done && ctx.runner.sim_time() >= self.at {
            ctx.runner.set_speed(&self.agent, self.speed)?;
            self.done = true;
            info!("Speed up! {} now drives at {} m/s", self.agent, self.speed);
        }
        Ok(())
    }
}
