//! Operator key commands.

use crate::controls::SessionControls;
use crate::keyboard::KeyEvent;
use crate::pause::Transition;
use std::time::Duration;
use tracing::{debug, info};

/// Byte produced by Ctrl-C while the terminal is in raw mode.
const CTRL_C: u8 = 0x03;

/// Operator banner describing the key bindings.
pub const INSTRUCTIONS: &str = "\n\
************************************************************\n\
* Instructions for running the demo:                       *\n\
* <p> will pause the simulation if unpaused and viceversa. *\n\
* <s> will step the simulation once if paused.             *\n\
* <q> will stop the simulation and quit the demo.          *\n\
************************************************************\n";

/// What a key press resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// `p`: pause if running, resume if paused
    TogglePause,
    
    /// `s`: single step (only while paused)
    Step,
    
    /// `q` / Ctrl-C: end the session
    Quit,
    
    /// Any other key
    Unbound,
}

impl Command {
    /// Maps a key to its command.
    pub fn from_key(key: &KeyEvent) -> Self {
        if key.as_bytes() == [CTRL_C] {
            return Command::Quit;
        }
        match key.as_char() {
            Some('p') => Command::TogglePause,
            Some('s') => Command::Step,
            Some('q') => Command::Quit,
            _ => Command::Unbound,
        }
    }
}

/// Applies operator keys to the session controls.
#[derive(Debug, Clone, Default)]
pub struct KeyCommandDispatcher {
    handled: u64,
}

impl KeyCommandDispatcher {
    /// Creates a dispatcher.
    pub fn new() -> Self {
        Self::default()
    }
    
    /// Number of keys that resolved to a command.
    pub fn handled(&self) -> u64 {
        self.handled
    }
    
    /// Applies one key and returns the command it resolved to.
    pub fn dispatch(&mut self, key: KeyEvent, controls: &mut SessionControls, period: Duration) -> Command {
        let command = Command::from_key(&key);
        match command {
            Command::TogglePause => {
                if controls.pause.is_paused() {
                    controls.pause.resume();
                } else {
                    controls.pause.pause();
                }
            }
            Command::Step => {
                if let Transition::Changed { .. } = controls.pause.step(1) {
                    info!("Simulation step of {}s executed.", period.as_secs_f64());
                }
            }
            Command::Quit => controls.request_stop(),
            Command::Unbound => {
                debug!("Ignoring key {}", key);
                return command;
            }
        }
        self.handled += 1;
        command
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pause::{PauseController, ScheduleState};
    use crate::rate::RealtimeRateController;
    
    const PERIOD: Duration = Duration::from_millis(20);
    
    fn controls(paused: bool) -> SessionControls {
        SessionControls::new(PauseController::new(paused), RealtimeRateController::new(1.0).unwrap())
    }
    
    #[test]
    fn test_p_toggles() {
        let mut d = KeyCommandDispatcher::new();
        let mut c = controls(false);
        d.dispatch(KeyEvent::from_byte(b'p'), &mut c, PERIOD);
        assert!(c.pause.is_paused());
        d.dispatch(KeyEvent::from_byte(b'P'), &mut c, PERIOD);
        assert_eq!(c.pause.state(), ScheduleState::Running);
    }
    
    #[test]
    fn test_s_steps_only_when_paused() {
        let mut d = KeyCommandDispatcher::new();
        let mut running = controls(false);
        d.dispatch(KeyEvent::from_byte(b's'), &mut running, PERIOD);
        assert_eq!(running.pause.state(), ScheduleState::Running);
        
        let mut paused = controls(true);
        d.dispatch(KeyEvent::from_byte(b's'), &mut paused, PERIOD);
        assert_eq!(paused.pause.state(), ScheduleState::Stepping { remaining: 1 });
    }
    
    #[test]
    fn test_q_and_ctrl_c_request_stop() {
        let mut d = KeyCommandDispatcher::new();
        let mut c = controls(false);
        assert_eq!(d.dispatch(KeyEvent::from_byte(b'q'), &mut c, PERIOD), Command::Quit);
        assert!(c.stop_requested());
        
        let mut c = controls(true);
        assert_eq!(d.dispatch(KeyEvent::from_byte(CTRL_C), &mut c, PERIOD), Command::Quit);
        assert!(c.stop_requested());
    }
    
    #[test]
    fn test_unbound_keys_are_ignored() {
        let mut d = KeyCommandDispatcher::new();
        let mut c = controls(false);
        let extended = KeyEvent::decode(0x00, || Some(b'p'));
        assert_eq!(d.dispatch(extended, &mut c, PERIOD), Command::Unbound);
        assert_eq!(d.dispatch(KeyEvent::from_byte(b'x'), &mut c, PERIOD), Command::Unbound);
        assert_eq!(d.handled(), 0);
        assert_eq!(c.pause.state(), ScheduleState::Running);
    }
}
