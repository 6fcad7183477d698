//! Error types for the tickdrive environment abstraction.

use thiserror::Error;

/// Errors raised by model runners and launchers.
#[derive(Debug, Error)]
pub enum EnvError {
    /// The model runner cannot be reached (crashed backend, closed bridge)
    #[error("Model runner unreachable: {0}")]
    Unreachable(String),
    
    /// An agent lookup failed
    #[error("Unknown agent: {0}")]
    UnknownAgent(String),
    
    /// The launcher failed to start or stop its resource
    #[error("Launcher error: {0}")]
    LauncherError(String),
}

impl EnvError {
    /// Creates an unreachable error.
    pub fn unreachable(msg: impl Into<String>) -> Self {
        Self::Unreachable(msg.into())
    }
    
    /// Creates an unknown-agent error.
    pub fn unknown_agent(agent: impl std::fmt::Display) -> Self {
        Self::UnknownAgent(agent.to_string())
    }
    
    /// Creates a launcher error.
    pub fn launcher(msg: impl Into<String>) -> Self {
        Self::LauncherError(msg.into())
    }
}
