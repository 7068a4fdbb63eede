//! Bounded polling.
//!
//! Every wait in the suite goes through [`await_condition`]: evaluate a probe,
//! sleep a fixed interval, repeat until the probe yields a value or the
//! deadline passes. The calling thread blocks for the duration.

use crate::error::{ProbeError, ProbeResult};
use std::time::{Duration, Instant};
use tracing::debug;

/// Default timeout for wait operations (30 seconds)
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 30_000;

/// Default polling interval (100ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = crate::config::DEFAULT_POLL_INTERVAL_MS;

/// Options for wait operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    /// Timeout in milliseconds
    pub timeout_ms: u64,
    /// Polling interval in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_WAIT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl WaitOptions {
    /// Create new wait options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set timeout in milliseconds
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set polling interval in milliseconds
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Get timeout as Duration
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Get poll interval as Duration
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// A value produced by a successful wait
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Waited<T> {
    /// What the probe yielded
    pub value: T,
    /// Time spent waiting
    pub elapsed: Duration,
    /// Number of probe evaluations
    pub polls: u32,
}

/// Outcome of [`await_persistence`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Persistence {
    /// The condition held for the whole window
    Held,
    /// The condition stopped holding after the given time
    Lapsed(Duration),
}

/// Poll `probe` until it yields `Some` or the deadline passes.
///
/// The clock is checked before each evaluation, so a zero timeout never
/// evaluates the probe. Errors from the probe abort the wait immediately.
pub fn await_condition<T, F>(
    description: &str,
    options: &WaitOptions,
    mut probe: F,
) -> ProbeResult<Waited<T>>
where
    F: FnMut() -> ProbeResult<Option<T>>,
{
    let start = Instant::now();
    let timeout = options.timeout();
    let poll_interval = options.poll_interval();
    let mut polls = 0_u32;

    while start.elapsed() < timeout {
        polls = polls.saturating_add(1);
        if let Some(value) = probe()? {
            let elapsed = start.elapsed();
            debug!(condition = description, ?elapsed, polls, "condition met");
            return Ok(Waited {
                value,
                elapsed,
                polls,
            });
        }
        let remaining = timeout.saturating_sub(start.elapsed());
        std::thread::sleep(poll_interval.min(remaining));
    }

    debug!(condition = description, polls, "condition timed out");
    Err(ProbeError::timeout(description, options.timeout_ms))
}

/// Poll a boolean predicate; returns the time it took to hold
pub fn await_true<F>(description: &str, options: &WaitOptions, mut predicate: F) -> ProbeResult<Duration>
where
    F: FnMut() -> ProbeResult<bool>,
{
    await_condition(description, options, || Ok(predicate()?.then_some(())))
        .map(|waited| waited.elapsed)
}

/// Check that `predicate` keeps holding for the whole timeout window.
///
/// This is the inverse of [`await_true`]: running out the clock is success.
pub fn await_persistence<F>(
    description: &str,
    options: &WaitOptions,
    mut predicate: F,
) -> ProbeResult<Persistence>
where
    F: FnMut() -> ProbeResult<bool>,
{
    match await_true(description, options, || predicate().map(|holds| !holds)) {
        Ok(elapsed) => Ok(Persistence::Lapsed(elapsed)),
        Err(ProbeError::Timeout { .. }) => Ok(Persistence::Held),
        Err(other) => Err(other),
    }
}

/// Wait for a fixed duration (prefer a condition where one exists)
pub fn pause(duration: Duration) {
    if !duration.is_zero() {
        std::thread::sleep(duration);
    }
}
