//! Error types for the demo harness.

use thiserror::Error;
use tickdrive_core::SchedulerError;

/// Errors raised while setting up or running a demo session.
#[derive(Debug, Error)]
pub enum SimError {
    /// The requested scenario does not exist
    #[error("Unknown scenario: {0}")]
    UnknownScenario(String),
    
    /// The visualizer command was empty or could not be spawned
    #[error("Failed to launch visualizer `{command}`: {reason}")]
    Launch { command: String, reason: String },
    
    /// The realtime rate given on the command line is unusable
    #[error("Invalid realtime rate {0}: must be a finite value >= 0")]
    InvalidRate(f64),
    
    /// Terminal setup failed
    #[error("Terminal error: {0}")]
    Terminal(#[from] std::io::Error),
    
    /// The SIGINT handler could not be installed
    #[error("Signal handler error: {0}")]
    Signal(#[from] ctrlc::Error),
    
    /// The session failed
    #[error(transparent)]
    Scheduler(#[from] SchedulerError),
}
