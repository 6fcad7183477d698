//! Session configuration.

use serde::Serialize;
use std::time::Duration;

/// Tick period used by every demo (seconds of simulated time per tick).
pub const DEFAULT_PERIOD: Duration = Duration::from_millis(20);

/// How long a session runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RunMode {
    /// Until the operator quits
    Indefinite,
    
    /// Until this many ticks have been emitted
    Bounded(u64),
}

impl RunMode {
    /// Converts a requested duration in seconds into a run mode.
    ///
    /// Negative durations mean "run indefinitely"; otherwise the bound is
    /// `floor(duration / period)` ticks.
    pub fn from_duration(duration_secs: f64, period: Duration) -> Self {
        if duration_secs < 0.0 || period.is_zero() {
            RunMode::Indefinite
        } else {
            RunMode::Bounded((duration_secs / period.as_secs_f64()).floor() as u64)
        }
    }
}

/// Configuration for one interactive session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionConfig {
    /// Simulated time advanced per tick
    pub period: Duration,
    
    /// Realtime rate at startup (0 = as fast as possible)
    pub initial_rate: f64,
    
    /// Start in the paused state
    pub start_paused: bool,
    
    /// Use the doubled `rate * 800` window before the first automatic rate change
    pub startup_window: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            period: DEFAULT_PERIOD,
            initial_rate: 1.0,
            start_paused: false,
            startup_window: false,
        }
    }
}

impl SessionConfig {
    /// Sets the tick period.
    pub fn with_period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }
    
    /// Sets the initial realtime rate.
    pub fn with_rate(mut self, rate: f64) -> Self {
        self.initial_rate = rate;
        self
    }
    
    /// Starts the session paused.
    pub fn with_start_paused(mut self, paused: bool) -> Self {
        self.start_paused = paused;
        self
    }
    
    /// Enables the doubled startup window.
    pub fn with_startup_window(mut self, enabled: bool) -> Self {
        self.startup_window = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    
    #[test]
    fn test_negative_duration_is_indefinite() {
        assert_eq!(RunMode::from_duration(-1.0, DEFAULT_PERIOD), RunMode::Indefinite);
    }
    
    #[test]
    fn test_duration_bound() {
        assert_eq!(RunMode::from_duration(10.0, DEFAULT_PERIOD), RunMode::Bounded(500));
        assert_eq!(RunMode::from_duration(0.0, DEFAULT_PERIOD), RunMode::Bounded(0));
        assert_eq!(RunMode::from_duration(0.03, DEFAULT_PERIOD), RunMode::Bounded(1));
    }
    
    proptest! {
        #[test]
        fn prop_bound_is_floor_of_ratio(ticks in 0u64..100_000, extra in 0.0f64..0.99) {
            let period = Duration::from_millis(50);
            let duration = (ticks as f64 + extra) * 0.05;
            let expected = (duration / 0.05).floor() as u64;
            prop_assert_eq!(RunMode::from_duration(duration, period), RunMode::Bounded(expected));
        }
    }
}
