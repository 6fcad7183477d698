//! Wall-clock abstraction used by the real-time throttle.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Source of wall-clock time for the scheduler.
///
/// - **Production**: [`WallClock`] - `Instant` + `std::thread::sleep`
/// - **Tests**: [`ManualClock`] - virtual time, sleeps are recorded
pub trait Clock {
    /// Returns the monotonic time since the clock was created.
    fn now(&self) -> Duration;
    
    /// Suspends the caller for the given duration.
    fn sleep(&self, duration: Duration);
}

/// Clock backed by the operating system.
#[derive(Debug, Clone, Copy)]
pub struct WallClock {
    start: Instant,
}

impl WallClock {
    /// Creates a new WallClock.
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for WallClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for WallClock {
    fn now(&self) -> Duration {
        self.start.elapsed()
    }
    
    fn sleep(&self, duration: Duration) {
        if !duration.is_zero() {
            std::thread::sleep(duration);
        }
    }
}

/// Virtual clock whose time only moves when something sleeps on it.
///
/// Clones share the same timeline and sleep log, so a test can hand one
/// clone to the scheduler and inspect the other.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    /// Current virtual time
    now: Arc<Mutex<Duration>>,
    
    /// Every sleep request, in order (zero-length included)
    sleeps: Arc<Mutex<Vec<Duration>>>,
}

impl ManualClock {
    /// Creates a clock at time zero.
    pub fn new() -> Self {
        Self::default()
    }
    
    /// Advances virtual time without recording a sleep.
    pub fn advance(&self, duration: Duration) {
        *lock(&self.now) += duration;
    }
    
    /// Returns all recorded sleep requests.
    pub fn sleeps(&self) -> Vec<Duration> {
        lock(&self.sleeps).clone()
    }
    
    /// Returns the sum of all recorded sleeps.
    pub fn total_slept(&self) -> Duration {
        lock(&self.sleeps).iter().sum()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        *lock(&self.now)
    }
    
    fn sleep(&self, duration: Duration) {
        lock(&self.sleeps).push(duration);
        *lock(&self.now) += duration;
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
