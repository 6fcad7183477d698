//! tickdrive Core - Interactive Real-Time Tick Control
//!
//! This library advances a simulation at a fixed time step while an operator
//! can pause, single-step, resume, quit, and retarget the realtime rate:
//! 1. **Input**: non-blocking keyboard polling with raw-mode ownership
//! 2. **Gating**: a pause/step state machine deciding which ticks run
//! 3. **Pacing**: a realtime rate controller driving the throttle sleep
//! 4. **Hooks**: ordered pre/post-tick callbacks (collision monitor, rate cycler)
//! 5. **Shutdown**: one-time release of terminal and launcher on every exit path
//!
//! # Usage
//!
//! ```ignore
//! use tickdrive_core::{RunMode, SessionConfig, TickScheduler, CollisionMonitor};
//!
//! let mut scheduler = TickScheduler::new(world, SessionConfig::default())?;
//! scheduler.register_pre(CollisionMonitor::new());
//! let summary = scheduler.start(RunMode::from_duration(30.0, scheduler.period()))?;
//! ```

pub mod commands;
pub mod config;
pub mod controls;
pub mod error;
pub mod hooks;
pub mod interrupt;
pub mod keyboard;
pub mod monitors;
pub mod pause;
pub mod rate;
pub mod scheduler;

// Re-export key types for convenience
pub use commands::{Command, KeyCommandDispatcher, INSTRUCTIONS};
pub use config::{RunMode, SessionConfig, DEFAULT_PERIOD};
pub use controls::SessionControls;
pub use error::SchedulerError;
pub use hooks::{hook_fn, HookContext, HookPhase, HookRegistry, TickHook};
pub use interrupt::{EndReason, InterruptProtocol};
pub use keyboard::{KeyEvent, KeyboardPoller};
pub use monitors::{CollisionMonitor, CrashReport, RateCycler, SpeedChangeAt, StepTimingStats};
pub use pause::{PauseController, ScheduleState, Transition};
pub use rate::{RateChange, RealtimeRateController};
pub use scheduler::{SessionSummary, TickScheduler};
