//! tickdrive Environment Abstraction Layer
//!
//! This crate describes everything the tick-control core treats as an
//! external collaborator:
//! - **Model**: the simulation being advanced (`ModelRunner`)
//! - **Presentation**: the visualizer/launcher terminated at session end (`Launcher`)
//! - **Time**: the wall clock the throttle sleeps on (`Clock`)
//!
//! The core never reaches past these traits, so a real road world, a
//! recording mock, or a remote bridge can all be driven by the same loop.
//!
//! # Example
//!
//! ```ignore
//! use tickdrive_env::{ModelRunner, Clock, WallClock};
//!
//! fn drive<R: ModelRunner>(runner: &mut R, clock: &WallClock) {
//!     let period = std::time::Duration::from_millis(20);
//!     loop {
//!         runner.advance(period).unwrap();
//!         clock.sleep(period.div_f64(runner.rate()));
//!     }
//! }
//! ```

mod clock;
mod error;
mod runner;
mod types;
pub mod mock;

pub use clock::{Clock, ManualClock, WallClock};
pub use error::EnvError;
pub use runner::{Launcher, ModelRunner, NoopLauncher};
pub use types::{AgentName, Collision, Pose, Velocity};
