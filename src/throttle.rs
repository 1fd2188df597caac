//! Generic rate limiter with leading-edge and optional trailing-edge calls.
//!
//! Time is injected through [`Instant`] parameters so callers decide how the
//! clock advances; nothing here sleeps. The runner feeds it wall-clock
//! instants and polls [`Throttle::trailing_deadline`] from its select loop.

use std::time::{Duration, Instant};

/// Outcome of offering a call to the limiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    /// The call may run now.
    Run,
    /// The call falls inside the window and is suppressed. With trailing
    /// semantics a deferred run fires at the window edge instead.
    Suppressed,
}

#[derive(Debug)]
pub struct Throttle {
    interval: Duration,
    trailing: bool,
    last_run: Option<Instant>,
    pending: bool,
}

impl Throttle {
    /// Limiter with trailing-edge semantics: suppressed calls are coalesced
    /// into one deferred run at the end of the window.
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            trailing: true,
            last_run: None,
            pending: false,
        }
    }

    /// Limiter that drops suppressed calls outright.
    #[must_use]
    pub fn leading_only(interval: Duration) -> Self {
        Self {
            trailing: false,
            ..Self::new(interval)
        }
    }

    /// Offer a call at `now`.
    pub fn accept(&mut self, now: Instant) -> Gate {
        if self.window_open(now) {
            self.last_run = Some(now);
            self.pending = false;
            Gate::Run
        } else {
            if self.trailing {
                self.pending = true;
            }
            Gate::Suppressed
        }
    }

    /// When the next trailing run becomes due, if one is pending.
    #[must_use]
    pub fn trailing_deadline(&self) -> Option<Instant> {
        if !self.pending {
            return None;
        }
        self.last_run.map(|last| last + self.interval)
    }

    /// Consume the pending trailing run if its deadline has passed.
    ///
    /// Returns `true` when the deferred call should run now.
    pub fn fire_trailing(&mut self, now: Instant) -> bool {
        match self.trailing_deadline() {
            Some(deadline) if now >= deadline => {
                self.last_run = Some(now);
                self.pending = false;
                true
            }
            _ => false,
        }
    }

    fn window_open(&self, now: Instant) -> bool {
        match self.last_run {
            None => true,
            Some(last) => now.duration_since(last) >= self.interval,
        }
    }
}
