//! Reconnect delay schedule.
//!
//! Pure state: no timers, no I/O. The connection manager asks for the next
//! delay on every close and treats an exhausted budget as terminal.

#[cfg(test)]
#[path = "backoff_test.rs"]
mod backoff_test;

use std::time::Duration;

/// Growth factor applied after every scheduled attempt.
pub const BACKOFF_MULTIPLIER: f64 = 1.5;

#[derive(Clone, Debug, PartialEq)]
pub struct ReconnectState {
    /// Reconnects scheduled since the last successful open.
    pub attempts: u32,
    /// Delay the next scheduled reconnect will wait.
    pub delay: Duration,
    pub max_attempts: u32,
    pub initial_delay: Duration,
}

impl ReconnectState {
    #[must_use]
    pub fn new(initial_delay: Duration, max_attempts: u32) -> Self {
        Self { attempts: 0, delay: initial_delay, max_attempts, initial_delay }
    }

    /// Advance the schedule and return the delay to wait before reconnecting.
    ///
    /// Growth is uncapped: after `n` calls the returned delay is
    /// `initial_delay * 1.5^(n - 1)`.
    pub fn next_delay(&mut self) -> Duration {
        let wait = self.delay;
        self.attempts = self.attempts.saturating_add(1);
        let exponent = i32::try_from(self.attempts).unwrap_or(i32::MAX);
        let scaled = self.initial_delay.as_secs_f64() * BACKOFF_MULTIPLIER.powi(exponent);
        self.delay = Duration::try_from_secs_f64(scaled).unwrap_or(Duration::MAX);
        wait
    }

    /// Forget all history after a successful open.
    pub fn reset(&mut self) {
        self.attempts = 0;
        self.delay = self.initial_delay;
    }

    /// True once more attempts were requested than the budget allows.
    #[must_use]
    pub fn exhausted(&self) -> bool {
        self.attempts > self.max_attempts
    }
}
