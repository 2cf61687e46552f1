//! Trailing-edge debounce for free-text input.
//!
//! Every input replaces the pending value and restarts the delay; only the
//! last value is released once input has been quiet for the full delay.
//! Time is passed in so callers can drive it from any clock.

use std::time::{Duration, Instant};

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<T>,
    dirty_since: Option<Instant>,
}

impl<T> Default for Debouncer<T> {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
            dirty_since: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Record an input at `at`, replacing anything pending
    pub fn input(&mut self, value: T, at: Instant) {
        self.pending = Some(value);
        self.dirty_since = Some(at);
    }

    /// When the pending value becomes due, if any
    pub fn deadline(&self) -> Option<Instant> {
        self.dirty_since.map(|since| since + self.delay)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Release the pending value if the delay has elapsed by `now`
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match self.deadline() {
            Some(deadline) if now >= deadline => self.flush(),
            _ => None,
        }
    }

    /// Release the pending value immediately
    pub fn flush(&mut self) -> Option<T> {
        self.dirty_since = None;
        self.pending.take()
    }

    pub fn cancel(&mut self) {
        self.pending = None;
        self.dirty_since = None;
    }
}
