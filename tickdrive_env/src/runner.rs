//! Model runner and launcher abstractions.

use crate::error::EnvError;
use crate::types::{AgentName, Collision, Pose, Velocity};
use std::time::Duration;

/// The simulation being driven by the tick-control loop.
///
/// The control core treats the model as opaque: it advances it, mirrors
/// pause/rate state into it, and reads back collisions and agent state for
/// reporting. Agent behaviour, road geometry and collision detection live
/// entirely behind this trait.
///
/// # Implementations
///
/// - **Demos**: `RoadWorld` in `tickdrive_sim` (planar kinematics)
/// - **Tests**: [`crate::mock::MockRunner`] (records every call)
pub trait ModelRunner {
    /// Advances simulated time by `dt`.
    ///
    /// # Errors
    /// * `EnvError::Unreachable` - the backing simulation is gone
    fn advance(&mut self, dt: Duration) -> Result<(), EnvError>;
    
    /// Marks the model as paused (informational for presentation layers).
    fn pause(&mut self);
    
    /// Clears the paused mark.
    fn resume(&mut self);
    
    /// Returns whether the model is marked as paused.
    fn is_paused(&self) -> bool;
    
    /// Sets the target simulated/real time ratio.
    fn set_rate(&mut self, rate: f64);
    
    /// Returns the target simulated/real time ratio.
    fn rate(&self) -> f64;
    
    /// Returns the ratio actually achieved since the last rate change.
    fn measured_rate(&self) -> f64;
    
    /// Returns the agent pairs currently in contact.
    fn collisions(&self) -> Result<Vec<Collision>, EnvError>;
    
    /// Returns an agent's current velocity.
    fn velocity(&self, agent: &AgentName) -> Result<Velocity, EnvError>;
    
    /// Returns an agent's current pose.
    fn pose(&self, agent: &AgentName) -> Result<Pose, EnvError>;
    
    /// Sets an agent's speed along its direction of travel (m/s).
    fn set_speed(&mut self, agent: &AgentName, speed: f64) -> Result<(), EnvError>;
    
    /// Returns the total simulated time.
    fn sim_time(&self) -> Duration;
}

/// The presentation side of a session (visualizer process, GUI, ...).
///
/// The core only ever signals it to terminate when the session ends.
pub trait Launcher {
    /// Terminates the presentation resource.
    fn terminate(&mut self) -> Result<(), EnvError>;
}

/// Launcher used when no presentation resource exists.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopLauncher;

impl Launcher for NoopLauncher {
    fn terminate(&mut self) -> Result<(), EnvError> {
        Ok(())
    }
}
