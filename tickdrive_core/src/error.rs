//! Error types for the tick-control core.

use thiserror::Error;
use tickdrive_env::EnvError;

/// Errors raised while configuring or driving a session.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// The tick period must be strictly positive
    #[error("Tick period must be positive, got {0:?}")]
    NonPositivePeriod(std::time::Duration),
    
    /// Realtime rates must be finite and non-negative
    #[error("Invalid realtime rate: {0}")]
    InvalidRate(f64),
    
    /// A hook failed; the session was shut down
    #[error("Hook '{hook}' failed: {source}")]
    Hook {
        hook: String,
        #[source]
        source: EnvError,
    },
    
    /// The model runner failed while advancing
    #[error("Model advance failed: {0}")]
    Advance(#[source] EnvError),
    
    /// Terminal setup or input failed
    #[error("Terminal error: {0}")]
    Terminal(#[from] std::io::Error),
}
