//! Visualizer process management.

use crate::error::SimError;
use std::process::{Child, Command, Stdio};
use tickdrive_env::{EnvError, Launcher};
use tracing::{debug, info};

/// An external visualizer process started with the session.
///
/// The command line is split on whitespace; the first word is the program.
/// Terminating kills the process (if still alive) and reaps it.
#[derive(Debug)]
pub struct VisualizerLauncher {
    command: String,
    child: Option<Child>,
}

impl VisualizerLauncher {
    /// Spawns `command` with its standard streams detached from the
    /// terminal the session owns.
    pub fn spawn(command: &str) -> Result<Self, SimError> {
        let mut words = command.split_whitespace();
        let program = words.next().ok_or_else(|| SimError::Launch {
            command: command.to_string(),
            reason: "empty command".to_string(),
        })?;
        
        let child = Command::new(program)
            .args(words)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| SimError::Launch {
                command: command.to_string(),
                reason: e.to_string(),
            })?;
        
        info!("Launched visualizer `{}` (pid {})", command, child.id());
        Ok(Self {
            command: command.to_string(),
            child: Some(child),
        })
    }
    
    /// True while the process has not been terminated by us.
    pub fn is_running(&self) -> bool {
        self.child.is_some()
    }
}

impl Launcher for VisualizerLauncher {
    fn terminate(&mut self) -> Result<(), EnvError> {
        let Some(mut child) = self.child.take() else {
            return Ok(());
        };
        
        match child.try_wait() {
            Ok(Some(status)) => {
                debug!("Visualizer already exited with {}", status);
                return Ok(());
            }
            Ok(None) => {}
            Err(e) => return Err(EnvError::launcher(format!("{}: {}", self.command, e))),
        }
        
        child
            .kill()
            .and_then(|_| child.wait())
            .map_err(|e| EnvError::launcher(format!("{}: {}", self.command, e)))?;
        info!("Visualizer `{}` terminated", self.command);
        Ok(())
    }
}
