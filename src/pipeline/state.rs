// src/pipeline/state.rs

//! Loop state carried from one poll cycle to the next.
//!
//! Holds the notified set with its global reset timer and the
//! consecutive-failure counter that drives the backoff sleep.

use std::collections::HashSet;
use std::time::Duration;

use tokio::time::Instant;

use crate::models::{BackoffConfig, BackoffPolicy, NotificationKey};

/// Failure-driven sleep policy.
#[derive(Debug, Clone)]
pub struct Backoff {
    step: Duration,
    max_failures: u32,
    policy: BackoffPolicy,
    failures: u32,
}

impl Backoff {
    pub fn new(config: &BackoffConfig) -> Self {
        Self {
            step: Duration::from_secs(config.step_secs),
            max_failures: config.max_failures,
            policy: config.policy,
            failures: 0,
        }
    }

    /// Current consecutive failure count.
    pub fn failures(&self) -> u32 {
        self.failures
    }

    /// Record a failed request and return how long to sleep.
    ///
    /// With `Reset`, the sleep uses the incremented count and the counter
    /// drops to 1 afterwards once it exceeds `max_failures`. With `Clamp`,
    /// the counter never exceeds `max_failures`. The sleep saturates at
    /// `Duration::MAX` instead of overflowing.
    pub fn record_failure(&mut self) -> Duration {
        self.failures = self.failures.saturating_add(1);
        if self.policy == BackoffPolicy::Clamp {
            self.failures = self.failures.min(self.max_failures);
        }

        let sleep = self.step.saturating_mul(self.failures);

        if self.policy == BackoffPolicy::Reset && self.failures > self.max_failures {
            self.failures = 1;
        }
        sleep
    }

    /// Record a successful request.
    pub fn record_success(&mut self) {
        self.failures = 0;
    }
}

/// Set of already-notified subscriptions, cleared as a whole on a timer.
#[derive(Debug, Clone)]
pub struct NotifiedSet {
    keys: HashSet<NotificationKey>,
    window: Duration,
    last_reset: Instant,
}

impl NotifiedSet {
    pub fn new(window: Duration, now: Instant) -> Self {
        Self {
            keys: HashSet::new(),
            window,
            last_reset: now,
        }
    }

    /// Clear the set if the window has elapsed since the last reset.
    ///
    /// Returns `true` when a reset happened.
    pub fn reset_if_due(&mut self, now: Instant) -> bool {
        if now.saturating_duration_since(self.last_reset) >= self.window {
            self.keys.clear();
            self.last_reset = now;
            true
        } else {
            false
        }
    }

    pub fn contains(&self, key: &NotificationKey) -> bool {
        self.keys.contains(key)
    }

    pub fn insert(&mut self, key: NotificationKey) -> bool {
        self.keys.insert(key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Everything the poll loop remembers between cycles.
#[derive(Debug, Clone)]
pub struct WatchState {
    pub notified: NotifiedSet,
    pub backoff: Backoff,
}

impl WatchState {
    pub fn new(backoff: &BackoffConfig, dedup_window: Duration, now: Instant) -> Self {
        Self {
            notified: NotifiedSet::new(dedup_window, now),
            backoff: Backoff::new(backoff),
        }
    }
}
