//! Realtime rate state and the demo auto-cycling policy.
//!
//! The cycling constants are a fixed demonstration policy (step up by 0.2
//! from the current rate, wrap to 0.6 once 1.6 is reached, hold each rate for
//! `rate * 400` ticks). They are kept exactly as the demos have always used
//! them and are not meant as a general rate controller.

use crate::error::SchedulerError;
use serde::Serialize;
use std::time::Duration;

/// Increment applied at every automatic change.
pub const RATE_STEP: f64 = 0.2;

/// Rates at or above this wrap around.
pub const RATE_CEILING: f64 = 1.6;

/// Rate used after wrapping.
pub const RATE_FLOOR: f64 = 0.6;

/// Ticks held per unit of rate.
pub const TICKS_PER_RATE: f64 = 400.0;

/// Startup window multiplier, absorbs startup latency.
pub const STARTUP_TICKS_PER_RATE: f64 = 800.0;

/// Rate arithmetic is snapped to multiples of `1 / RATE_RESOLUTION`.
const RATE_RESOLUTION: f64 = 1e6;

/// An automatic rate change, reported to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RateChange {
    /// The new rate
    pub rate: f64,
    
    /// Ticks the new rate will be held for
    pub steps: u64,
    
    /// Achieved rate measured over the previous window
    pub last_measured: f64,
}

/// Holds the current simulated/real time ratio and the cycling countdown.
#[derive(Debug, Clone)]
pub struct RealtimeRateController {
    rate: f64,
    countdown: u64,
}

impl RealtimeRateController {
    /// Creates a controller with a regular `floor(rate * 400)` window.
    pub fn new(rate: f64) -> Result<Self, SchedulerError> {
        let rate = validate(rate)?;
        Ok(Self {
            rate,
            countdown: window(rate, TICKS_PER_RATE),
        })
    }
    
    /// Creates a controller with the doubled `floor(rate * 800)` startup window.
    pub fn for_startup(rate: f64) -> Result<Self, SchedulerError> {
        let rate = validate(rate)?;
        Ok(Self {
            rate,
            countdown: window(rate, STARTUP_TICKS_PER_RATE),
        })
    }
    
    /// Current rate.
    pub fn rate(&self) -> f64 {
        self.rate
    }
    
    /// Ticks left before the next automatic change.
    pub fn countdown(&self) -> u64 {
        self.countdown
    }
    
    /// Sets the rate directly, leaving the countdown untouched.
    pub fn set_rate(&mut self, rate: f64) -> Result<(), SchedulerError> {
        self.rate = validate(rate)?;
        Ok(())
    }
    
    /// Wall-clock time to wait after a tick of `period`.
    ///
    /// Zero when the rate is zero ("as fast as possible"). Rates so small
    /// that the wait does not fit a `Duration` saturate to `Duration::MAX`.
    pub fn throttle(&self, period: Duration) -> Duration {
        if self.rate > 0.0 {
            Duration::try_from_secs_f64(period.as_secs_f64() / self.rate).unwrap_or(Duration::MAX)
        } else {
            Duration::ZERO
        }
    }
    
    /// Advances the cycling policy by one post-tick invocation.
    ///
    /// `measured` is the achieved rate read from the model; it is only
    /// carried into the report.
    pub fn on_post_tick(&mut self, measured: f64) -> Option<RateChange> {
        if self.countdown > 0 {
            self.countdown -= 1;
            return None;
        }
        
        let mut rate = snap(self.rate + RATE_STEP);
        if rate >= RATE_CEILING {
            rate = RATE_FLOOR;
        }
        self.rate = rate;
        self.countdown = window(rate, TICKS_PER_RATE);
        
        Some(RateChange {
            rate,
            steps: self.countdown,
            last_measured: measured,
        })
    }
}

fn validate(rate: f64) -> Result<f64, SchedulerError> {
    if rate.is_finite() && rate >= 0.0 {
        Ok(rate)
    } else {
        Err(SchedulerError::InvalidRate(rate))
    }
}

fn snap(rate: f64) -> f64 {
    (rate * RATE_RESOLUTION).round() / RATE_RESOLUTION
}

fn window(rate: f64, ticks_per_rate: f64) -> u64 {
    // The epsilon keeps e.g. 1.2 * 400 = 479.99999... from flooring to 479.
    (rate * ticks_per_rate + 1e-9).floor() as u64
}
