//! tickdrive demo harness
//!
//! A planar road world driven interactively by the `tickdrive_core` control
//! loop, plus the scenarios and launchers used by the `tickdrive` binary.
//!
//! # Usage
//!
//! ```ignore
//! use tickdrive_sim::{prepare, DemoOptions, ScenarioId};
//! use tickdrive_core::KeyboardPoller;
//!
//! let mut demo = prepare(ScenarioId::Crash, &DemoOptions::default(), KeyboardPoller::detect()?, flag)?;
//! let summary = demo.scheduler.start(demo.mode)?;
//! ```

mod error;
mod launcher;
mod session;
mod world;
pub mod scenarios;

pub use error::SimError;
pub use launcher::VisualizerLauncher;
pub use scenarios::ScenarioId;
pub use session::{prepare, Demo, DemoOptions};
pub use world::{Car, RoadWorld, WorldConfig};
