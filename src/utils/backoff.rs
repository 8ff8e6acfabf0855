//! Exponential backoff schedule for readiness polling.

use std::time::Duration;

/// Produces a growing sequence of delays: initial, initial * multiplier,
/// ... capped at a maximum. The caller owns the loop and the deadline.
#[derive(Debug, Clone)]
pub struct Backoff {
    delay: Duration,
    multiplier: f64,
    max_delay: Duration,
}

impl Backoff {
    pub fn new(initial_delay: Duration, multiplier: f64, max_delay: Duration) -> Self {
        Self {
            delay: initial_delay,
            multiplier,
            max_delay,
        }
    }

    /// Return the current delay and advance the schedule.
    pub fn next_delay(&mut self) -> Duration {
        let current = self.delay;
        self.delay = Duration::from_secs_f64(self.delay.as_secs_f64() * self.multiplier)
            .min(self.max_delay);
        current
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new(Duration::from_millis(500), 2.0, Duration::from_secs(10))
    }
}
