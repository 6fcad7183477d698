//! Pause/step state machine gating tick emission.

use serde::Serialize;
use tracing::{info, warn};

/// Scheduling state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ScheduleState {
    /// Ticks are emitted every cycle
    Running,
    
    /// Ticks are dropped
    Paused,
    
    /// Paused, but `remaining` more ticks will run before pausing again
    Stepping { remaining: u32 },
    
    /// The session is over; absorbing
    Terminated,
}

/// Result of a control request, for reporting to the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The state changed
    Changed { from: ScheduleState, to: ScheduleState },
    
    /// The request did not apply in the current state
    Ignored { state: ScheduleState, reason: &'static str },
}

impl Transition {
    /// Returns true if the state changed.
    pub fn changed(&self) -> bool {
        matches!(self, Transition::Changed { .. })
    }
}

/// The pause/step state machine.
///
/// | From | Event | To |
/// |---|---|---|
/// | Running | `pause()` | Paused |
/// | Paused / Stepping | `resume()` | Running |
/// | Paused | `step(n)` | Stepping(n) |
/// | Stepping(k) | `step(n)` | Stepping(k + n) |
/// | Stepping(1) | tick emitted | Paused |
/// | Running | `step(n)` | Running (ignored) |
/// | any | `terminate()` | Terminated |
#[derive(Debug, Clone)]
pub struct PauseController {
    state: ScheduleState,
}

impl PauseController {
    /// Creates a controller, optionally paused from the start.
    pub fn new(start_paused: bool) -> Self {
        let state = if start_paused {
            ScheduleState::Paused
        } else {
            ScheduleState::Running
        };
        Self { state }
    }
    
    /// Current state.
    pub fn state(&self) -> ScheduleState {
        self.state
    }
    
    /// True while paused or stepping.
    pub fn is_paused(&self) -> bool {
        matches!(self.state, ScheduleState::Paused | ScheduleState::Stepping { .. })
    }
    
    /// True once terminated.
    pub fn is_terminated(&self) -> bool {
        self.state == ScheduleState::Terminated
    }
    
    /// Stops tick emission. Idempotent.
    pub fn pause(&mut self) -> Transition {
        match self.state {
            ScheduleState::Running => self.go(ScheduleState::Paused),
            state => Transition::Ignored { state, reason: "already paused" },
        }
    }
    
    /// Resumes tick emission.
    pub fn resume(&mut self) -> Transition {
        match self.state {
            ScheduleState::Paused | ScheduleState::Stepping { .. } => {
                self.go(ScheduleState::Running)
            }
            state => Transition::Ignored { state, reason: "not paused" },
        }
    }
    
    /// Requests `n` ticks while paused.
    pub fn step(&mut self, n: u32) -> Transition {
        match self.state {
            _ if n == 0 => Transition::Ignored { state: self.state, reason: "zero steps requested" },
            ScheduleState::Paused => self.go(ScheduleState::Stepping { remaining: n }),
            ScheduleState::Stepping { remaining } => self.go(ScheduleState::Stepping {
                remaining: remaining.saturating_add(n),
            }),
            ScheduleState::Running => {
                warn!("Simulation step only supported in paused mode.");
                Transition::Ignored {
                    state: ScheduleState::Running,
                    reason: "step only valid while paused",
                }
            }
            ScheduleState::Terminated => Transition::Ignored {
                state: ScheduleState::Terminated,
                reason: "session terminated",
            },
        }
    }
    
    /// Moves to the absorbing terminal state.
    pub fn terminate(&mut self) -> Transition {
        match self.state {
            ScheduleState::Terminated => Transition::Ignored {
                state: ScheduleState::Terminated,
                reason: "already terminated",
            },
            _ => self.go(ScheduleState::Terminated),
        }
    }
    
    /// Claims permission to emit one tick.
    ///
    /// Returns false when the tick must be dropped. A granted step consumes
    /// one unit of the countdown and falls back to `Paused` at zero.
    pub fn admit_tick(&mut self) -> bool {
        match self.state {
            ScheduleState::Running => true,
            ScheduleState::Stepping { remaining } => {
                self.state = if remaining <= 1 {
                    ScheduleState::Paused
                } else {
                    ScheduleState::Stepping { remaining: remaining - 1 }
                };
                true
            }
            ScheduleState::Paused | ScheduleState::Terminated => false,
        }
    }
    
    fn go(&mut self, to: ScheduleState) -> Transition {
        let from = self.state;
        self.state = to;
        match to {
            ScheduleState::Running => info!("Simulation is now running."),
            ScheduleState::Paused => info!("Simulation is now paused."),
            _ => {}
        }
        Transition::Changed { from, to }
    }
}

impl Default for PauseController {
    fn default() -> Self {
        Self::new(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    
    #[test]
    fn test_pause_resume_cycle() {
        let mut pc = PauseController::new(false);
        assert!(pc.pause().changed());
        assert!(pc.is_paused());
        assert!(!pc.pause().changed());
        assert!(pc.resume().changed());
        assert_eq!(pc.state(), ScheduleState::Running);
    }
    
    #[test]
    fn test_step_while_running_is_ignored() {
        let mut pc = PauseController::new(false);
        let t = pc.step(3);
        assert_eq!(
            t,
            Transition::Ignored {
                state: ScheduleState::Running,
                reason: "step only valid while paused",
            }
        );
        assert_eq!(pc.state(), ScheduleState::Running);
    }
    
    #[test]
    fn test_stepping_returns_to_paused() {
        let mut pc = PauseController::new(true);
        pc.step(2);
        assert_eq!(pc.state(), ScheduleState::Stepping { remaining: 2 });
        assert!(pc.admit_tick());
        assert_eq!(pc.state(), ScheduleState::Stepping { remaining: 1 });
        assert!(pc.admit_tick());
        assert_eq!(pc.state(), ScheduleState::Paused);
        assert!(!pc.admit_tick());
    }
    
    #[test]
    fn test_step_extends_countdown() {
        let mut pc = PauseController::new(true);
        pc.step(1);
        pc.step(2);
        assert_eq!(pc.state(), ScheduleState::Stepping { remaining: 3 });
    }
    
    #[test]
    fn test_terminated_is_absorbing() {
        let mut pc = PauseController::new(false);
        assert!(pc.terminate().changed());
        assert!(!pc.resume().changed());
        assert!(!pc.pause().changed());
        assert!(!pc.step(1).changed());
        assert!(!pc.terminate().changed());
        assert!(!pc.admit_tick());
        assert!(pc.is_terminated());
    }
    
    proptest! {
        #[test]
        fn prop_step_n_admits_exactly_n(n in 1u32..500) {
            let mut pc = PauseController::new(true);
            pc.step(n);
            let mut admitted = 0;
            for _ in 0..(n + 50) {
                if pc.admit_tick() {
                    admitted += 1;
                }
            }
            prop_assert_eq!(admitted, n);
            prop_assert_eq!(pc.state(), ScheduleState::Paused);
        }
    }
}
