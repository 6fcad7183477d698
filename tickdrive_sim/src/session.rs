//! Session assembly shared by the binary and the integration tests.

use crate::error::SimError;
use crate::launcher::VisualizerLauncher;
use crate::scenarios::ScenarioId;
use crate::world::RoadWorld;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tickdrive_core::{InterruptProtocol, KeyboardPoller, RunMode, SessionConfig, TickScheduler};
use tickdrive_env::{Launcher, NoopLauncher};
use tracing::info;

/// Operator choices for one demo run.
#[derive(Debug, Clone)]
pub struct DemoOptions {
    /// Requested duration in seconds (negative = run until quit)
    pub duration_secs: f64,
    
    /// Initial realtime rate
    pub realtime_rate: f64,
    
    /// Start paused
    pub paused: bool,
    
    /// Visualizer command line, if one should be launched
    pub visualizer: Option<String>,
}

impl Default for DemoOptions {
    fn default() -> Self {
        Self {
            duration_secs: -1.0,
            realtime_rate: 1.0,
            paused: false,
            visualizer: None,
        }
    }
}

/// A ready-to-start session.
pub struct Demo {
    /// The configured scheduler, hooks installed
    pub scheduler: TickScheduler<RoadWorld>,
    
    /// How long to run
    pub mode: RunMode,
}

/// Builds the world, launcher and scheduler for `scenario`.
///
/// `signal` is raised asynchronously (SIGINT) to end the session.
pub fn prepare(
    scenario: ScenarioId,
    options: &DemoOptions,
    keyboard: KeyboardPoller,
    signal: Arc<AtomicBool>,
) -> Result<Demo, SimError> {
    if !options.realtime_rate.is_finite() || options.realtime_rate < 0.0 {
        return Err(SimError::InvalidRate(options.realtime_rate));
    }
    
    let config = scenario.session_config(
        SessionConfig::default()
            .with_rate(options.realtime_rate)
            .with_start_paused(options.paused),
    );
    
    let launcher: Box<dyn Launcher> = match &options.visualizer {
        Some(command) => Box::new(VisualizerLauncher::spawn(command)?),
        None => Box::new(NoopLauncher),
    };
    let interrupt = InterruptProtocol::new(keyboard, launcher).with_signal(signal);
    
    let mut scheduler = TickScheduler::new(scenario.build_world(), config)?.with_interrupt(interrupt);
    scenario.install(&mut scheduler);
    
    let mode = RunMode::from_duration(options.duration_secs, scheduler.period());
    info!("Scenario {}: {}", scenario, scenario.description());
    Ok(Demo { scheduler, mode })
}
