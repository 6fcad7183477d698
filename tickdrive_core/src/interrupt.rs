//! Session termination and guaranteed, one-time resource release.

use crate::keyboard::{KeyEvent, KeyboardPoller};
use crate::pause::PauseController;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tickdrive_env::Launcher;
use tracing::{debug, warn};

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    /// The operator (or a hook) requested a stop
    Quit,
    
    /// The bounded iteration count was reached
    Exhausted,
    
    /// A hook or the model failed
    Failed,
}

/// Owns the session's external resources and releases them exactly once.
///
/// Release happens on the first of: an explicit [`release`](Self::release),
/// [`request_stop`](Self::request_stop), or drop (which also covers
/// unwinding out of a panicking hook).
pub struct InterruptProtocol {
    keyboard: Option<KeyboardPoller>,
    launcher: Option<Box<dyn Launcher>>,
    signal: Option<Arc<AtomicBool>>,
    released: bool,
}

impl InterruptProtocol {
    /// Takes ownership of the session's poller and launcher.
    pub fn new(keyboard: KeyboardPoller, launcher: Box<dyn Launcher>) -> Self {
        Self {
            keyboard: Some(keyboard),
            launcher: Some(launcher),
            signal: None,
            released: false,
        }
    }
    
    /// A protocol with no keyboard and no launcher.
    pub fn headless() -> Self {
        Self::new(KeyboardPoller::stub(), Box::new(tickdrive_env::NoopLauncher))
    }
    
    /// Watches a flag set asynchronously (e.g. by a SIGINT handler).
    ///
    /// The loop checks it at every cycle boundary and treats it as a quit.
    pub fn with_signal(mut self, flag: Arc<AtomicBool>) -> Self {
        self.signal = Some(flag);
        self
    }
    
    /// True if the watched flag has been raised.
    pub fn signalled(&self) -> bool {
        self.signal
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::SeqCst))
    }
    
    /// Polls the keyboard, if it has not been released yet.
    pub fn poll_key(&mut self) -> Option<KeyEvent> {
        self.keyboard.as_mut().and_then(KeyboardPoller::poll)
    }
    
    /// Terminates the schedule and releases resources.
    pub fn request_stop(&mut self, pause: &mut PauseController) {
        pause.terminate();
        self.release();
    }
    
    /// True once resources have been released.
    pub fn is_released(&self) -> bool {
        self.released
    }
    
    /// Restores the terminal and terminates the launcher. Idempotent.
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        
        if let Some(mut keyboard) = self.keyboard.take() {
            keyboard.release();
        }
        if let Some(mut launcher) = self.launcher.take() {
            if let Err(e) = launcher.terminate() {
                warn!("Launcher did not terminate cleanly: {}", e);
            }
        }
        debug!("Session resources released");
    }
}

impl Drop for InterruptProtocol {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for InterruptProtocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InterruptProtocol")
            .field("keyboard", &self.keyboard)
            .field("released", &self.released)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pause::ScheduleState;
    use tickdrive_env::mock::CountingLauncher;
    
    #[test]
    fn test_request_stop_twice_releases_once() {
        let launcher = CountingLauncher::new();
        let mut protocol = InterruptProtocol::new(KeyboardPoller::replay(*b"pp"), Box::new(launcher.clone()));
        let mut pause = PauseController::new(false);
        
        protocol.request_stop(&mut pause);
        protocol.request_stop(&mut pause);
        drop(protocol);
        
        assert_eq!(launcher.terminations(), 1);
        assert_eq!(pause.state(), ScheduleState::Terminated);
    }
    
    #[test]
    fn test_release_stops_input() {
        let mut protocol = InterruptProtocol::new(
            KeyboardPoller::replay(*b"q"),
            Box::new(CountingLauncher::new()),
        );
        protocol.release();
        assert!(protocol.poll_key().is_none());
        assert!(protocol.is_released());
    }
    
    #[test]
    fn test_signal_flag() {
        let flag = Arc::new(AtomicBool::new(false));
        let protocol = InterruptProtocol::headless().with_signal(Arc::clone(&flag));
        assert!(!protocol.signalled());
        flag.store(true, Ordering::SeqCst);
        assert!(protocol.signalled());
    }
    
    #[test]
    fn test_drop_releases() {
        let launcher = CountingLauncher::new();
        {
            let _protocol = InterruptProtocol::new(KeyboardPoller::stub(), Box::new(launcher.clone()));
        }
        assert_eq!(launcher.terminations(), 1);
    }
    
    #[test]
    fn test_unwinding_releases() {
        let launcher = CountingLauncher::new();
        let handle = launcher.clone();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(move || {
            let _protocol = InterruptProtocol::new(KeyboardPoller::stub(), Box::new(handle));
            panic!("hook blew up");
        }));
        assert!(result.is_err());
        assert_eq!(launcher.terminations(), 1);
    }
}
