//! Demo scenarios.
//!
//! Each scenario builds a [`RoadWorld`], adjusts the session configuration
//! and installs its hooks on the scheduler.

use crate::world::{RoadWorld, WorldConfig};
use std::f64::consts::{FRAC_PI_2, PI};
use std::time::{Duration, Instant};
use tickdrive_core::{
    CollisionMonitor, RateCycler, SessionConfig, SessionControls, SpeedChangeAt, StepTimingStats,
    TickScheduler, DEFAULT_PERIOD, INSTRUCTIONS,
};
use tracing::info;

/// Simulated time after which the scriptlets rail car speeds up.
const SPEED_UP_AT: Duration = Duration::from_secs(10);

/// Scenario identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioId {
    /// One idle car; the realtime rate cycles through 0.6..1.4
    Realtime,
    
    /// Four cars converging on an intersection
    Crash,
    
    /// One car and the operator's keyboard
    Keyop,
    
    /// A rail car that speeds up mid-run, with step timing statistics
    Scriptlets,
}

impl ScenarioId {
    /// Returns a list of all scenarios.
    pub fn all() -> Vec<ScenarioId> {
        vec![
            ScenarioId::Realtime,
            ScenarioId::Crash,
            ScenarioId::Keyop,
            ScenarioId::Scriptlets,
        ]
    }
    
    /// Returns the scenario name.
    pub fn name(&self) -> &'static str {
        match self {
            ScenarioId::Realtime => "realtime",
            ScenarioId::Crash => "crash",
            ScenarioId::Keyop => "keyop",
            ScenarioId::Scriptlets => "scriptlets",
        }
    }
    
    /// Returns a description of the scenario.
    pub fn description(&self) -> &'static str {
        match self {
            ScenarioId::Realtime => "Realtime rate manipulation at startup and at runtime",
            ScenarioId::Crash => "Four cars on collision courses; pauses on every crash",
            ScenarioId::Keyop => "Pause, step and quit the simulation from the keyboard",
            ScenarioId::Scriptlets => "Scripted speed change after 10s plus step timing stats",
        }
    }
    
    /// Operator banner printed before the session starts.
    pub fn banner(&self) -> Option<&'static str> {
        match self {
            ScenarioId::Keyop => Some(INSTRUCTIONS),
            _ => None,
        }
    }
    
    /// Builds the scene.
    pub fn build_world(&self) -> RoadWorld {
        let world = RoadWorld::new(WorldConfig::default());
        match self {
            ScenarioId::Realtime | ScenarioId::Keyop => world.with_car("simple0", 0.0, 0.0, 0.0, 0.0),
            ScenarioId::Crash => world
                .with_car("racer0", 0.0, -50.0, FRAC_PI_2, 5.0)
                .with_car("racer1", -50.0, 0.0, 0.0, 5.1)
                .with_car("racer2", 0.0, 50.0, -FRAC_PI_2, 5.0)
                .with_car("racer3", 50.0, 0.0, PI, 5.1),
            ScenarioId::Scriptlets => world
                .with_car("simple0", 0.0, 0.0, 0.0, 0.0)
                .with_car("rail0", 0.0, 4.0, 0.0, 4.0),
        }
    }
    
    /// Adjusts the operator-supplied configuration for this scenario.
    pub fn session_config(&self, base: SessionConfig) -> SessionConfig {
        let config = base.with_period(DEFAULT_PERIOD);
        match self {
            ScenarioId::Realtime => config.with_startup_window(true),
            _ => config,
        }
    }
    
    /// Startup message for scenarios that announce their initial rate window.
    pub fn startup_notice(&self, controls: &SessionControls) -> Option<String> {
        match self {
            ScenarioId::Realtime => Some(format!(
                "Running at real-time rate {:.1} for {} steps",
                controls.rate.rate(),
                controls.rate.countdown()
            )),
            _ => None,
        }
    }
    
    /// Registers the scenario's hooks.
    pub fn install(&self, scheduler: &mut TickScheduler<RoadWorld>) {
        if let Some(notice) = self.startup_notice(scheduler.controls()) {
            info!("{}", notice);
        }
        match self {
            ScenarioId::Realtime => scheduler.register_post(RateCycler::new()),
            ScenarioId::Crash => scheduler.register_pre(CollisionMonitor::new()),
            ScenarioId::Keyop => {}
            ScenarioId::Scriptlets => {
                scheduler.register_pre(SpeedChangeAt::new("rail0", 20.0, SPEED_UP_AT));
                scheduler.register_post(StepTimingStats::default().started_at(Instant::now()));
            }
        }
    }
}

impl std::fmt::Display for ScenarioId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for ScenarioId {
    type Err = String;
    
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "realtime" => Ok(ScenarioId::Realtime),
            "crash" => Ok(ScenarioId::Crash),
            "keyop" => Ok(ScenarioId::Keyop),
            "scriptlets" => Ok(ScenarioId::Scriptlets),
            _ => Err(format!("Unknown scenario: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tickdrive_core::HookPhase;
    
    #[test]
    fn test_names_round_trip() {
        for id in ScenarioId::all() {
            assert_eq!(id.name().parse::<ScenarioId>().unwrap(), id);
        }
        assert_eq!("CRASH".parse::<ScenarioId>().unwrap(), ScenarioId::Crash);
        assert!("dragway".parse::<ScenarioId>().is_err());
    }
    
    #[test]
    fn test_realtime_uses_startup_window() {
        let config = ScenarioId::Realtime.session_config(SessionConfig::default());
        assert!(config.startup_window);
        assert!(!ScenarioId::Crash.session_config(SessionConfig::default()).startup_window);
    }
    
    #[test]
    fn test_crash_installs_collision_monitor() {
        let id = ScenarioId::Crash;
        let mut scheduler = TickScheduler::new(id.build_world(), id.session_config(SessionConfig::default())).unwrap();
        id.install(&mut scheduler);
        assert_eq!(scheduler.hooks().names(HookPhase::PreTick), vec!["collision_monitor"]);
        assert!(scheduler.hooks().names(HookPhase::PostTick).is_empty());
        assert_eq!(scheduler.runner().cars().len(), 4);
    }
    
    #[test]
    fn test_realtime_announces_startup_window() {
        let id = ScenarioId::Realtime;
        let scheduler = TickScheduler::new(id.build_world(), id.session_config(SessionConfig::default())).unwrap();
        assert_eq!(
            id.startup_notice(scheduler.controls()).as_deref(),
            Some("Running at real-time rate 1.0 for 800 steps")
        );
        assert!(ScenarioId::Crash.startup_notice(scheduler.controls()).is_none());
    }
    
    #[test]
    fn test_only_keyop_has_banner() {
        assert!(ScenarioId::Keyop.banner().is_some());
        assert!(ScenarioId::Crash.banner().is_none());
    }
}
