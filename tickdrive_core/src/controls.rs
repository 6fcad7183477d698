//! Control state shared by the loop, hooks and key commands.

use crate::pause::PauseController;
use crate::rate::RealtimeRateController;
use tracing::info;

/// All mutable control state of a session.
///
/// The scheduler owns exactly one of these and lends it to hooks and the
/// key dispatcher, so every read and write of pause/rate/stop state goes
/// through a single owner.
#[derive(Debug, Clone)]
pub struct SessionControls {
    /// Pause/step state machine
    pub pause: PauseController,
    
    /// Realtime rate and cycling countdown
    pub rate: RealtimeRateController,
    
    stop_requested: bool,
}

impl SessionControls {
    /// Bundles the two controllers.
    pub fn new(pause: PauseController, rate: RealtimeRateController) -> Self {
        Self {
            pause,
            rate,
            stop_requested: false,
        }
    }
    
    /// Asks the loop to end after the tick in flight.
    pub fn request_stop(&mut self) {
        if !self.stop_requested {
            info!("Quitting simulation.");
        }
        self.stop_requested = true;
    }
    
    /// True once a stop has been requested.
    pub fn stop_requested(&self) -> bool {
        self.stop_requested
    }
}
