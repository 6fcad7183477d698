//! Recording model runner for tests and dry runs.

use crate::error::EnvError;
use crate::runner::{Launcher, ModelRunner};
use crate::types::{AgentName, Collision, Pose, Velocity};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// A mutating call observed by [`MockRunner`].
#[derive(Debug, Clone, PartialEq)]
pub enum RunnerCall {
    Advance(Duration),
    Pause,
    Resume,
    SetRate(f64),
    SetSpeed(AgentName, f64),
}

/// Model runner that records calls and serves scripted state.
#[derive(Debug, Clone)]
pub struct MockRunner {
    /// Mutating calls in order
    pub calls: Vec<RunnerCall>,
    
    /// Collisions returned by `collisions()`
    pub collisions: Vec<Collision>,
    
    /// Agent state returned by `velocity()`/`pose()`
    pub agents: BTreeMap<AgentName, (Velocity, Pose)>,
    
    /// Value returned by `measured_rate()`
    pub measured_rate: f64,
    
    /// When set, the n-th advance (1-based) fails as unreachable
    pub fail_on_advance: Option<u64>,
    
    paused: bool,
    rate: f64,
    sim_time: Duration,
    advances: u64,
}

impl MockRunner {
    /// Creates a runner with no agents, running at rate 1.0.
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            collisions: Vec::new(),
            agents: BTreeMap::new(),
            measured_rate: 1.0,
            fail_on_advance: None,
            paused: false,
            rate: 1.0,
            sim_time: Duration::ZERO,
            advances: 0,
        }
    }
    
    /// Adds an agent with the given state.
    pub fn with_agent(mut self, name: &str, velocity: Velocity, pose: Pose) -> Self {
        self.agents.insert(AgentName::new(name), (velocity, pose));
        self
    }
    
    /// Adds a collision between two agents.
    pub fn with_collision(mut self, collision: Collision) -> Self {
        self.collisions.push(collision);
        self
    }
    
    /// Number of successful `advance` calls.
    pub fn advance_count(&self) -> u64 {
        self.advances
    }
    
    fn agent(&self, agent: &AgentName) -> Result<&(Velocity, Pose), EnvError> {
        self.agents.get(agent).ok_or_else(|| EnvError::unknown_agent(agent))
    }
}

impl Default for MockRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelRunner for MockRunner {
    fn advance(&mut self, dt: Duration) -> Result<(), EnvError> {
        if self.fail_on_advance == Some(self.advances + 1) {
            return Err(EnvError::unreachable("mock runner scripted failure"));
        }
        self.calls.push(RunnerCall::Advance(dt));
        self.sim_time += dt;
        self.advances += 1;
        Ok(())
    }
    
    fn pause(&mut self) {
        self.calls.push(RunnerCall::Pause);
        self.paused = true;
    }
    
    fn resume(&mut self) {
        self.calls.push(RunnerCall::Resume);
        self.paused = false;
    }
    
    fn is_paused(&self) -> bool {
        self.paused
    }
    
    fn set_rate(&mut self, rate: f64) {
        self.calls.push(RunnerCall::SetRate(rate));
        self.rate = rate;
    }
    
    fn rate(&self) -> f64 {
        self.rate
    }
    
    fn measured_rate(&self) -> f64 {
        self.measured_rate
    }
    
    fn collisions(&self) -> Result<Vec<Collision>, EnvError> {
        Ok(self.collisions.clone())
    }
    
    fn velocity(&self, agent: &AgentName) -> Result<Velocity, EnvError> {
        self.agent(agent).map(|(v, _)| *v)
    }
    
    fn pose(&self, agent: &AgentName) -> Result<Pose, EnvError> {
        self.agent(agent).map(|(_, p)| *p)
    }
    
    fn set_speed(&mut self, agent: &AgentName, speed: f64) -> Result<(), EnvError> {
        self.agent(agent)?;
        self.calls.push(RunnerCall::SetSpeed(agent.clone(), speed));
        Ok(())
    }
    
    fn sim_time(&self) -> Duration {
        self.sim_time
    }
}

/// Launcher that counts `terminate` calls through a shared counter.
#[derive(Debug, Clone, Default)]
pub struct CountingLauncher {
    terminations: Arc<AtomicUsize>,
}

impl CountingLauncher {
    /// Creates a launcher with a zeroed counter.
    pub fn new() -> Self {
        Self::default()
    }
    
    /// Number of times `terminate` has been called on any clone.
    pub fn terminations(&self) -> usize {
        self.terminations.load(Ordering::SeqCst)
    }
}

impl Launcher for CountingLauncher {
    fn terminate(&mut self) -> Result<(), EnvError> {
        self.terminations.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
