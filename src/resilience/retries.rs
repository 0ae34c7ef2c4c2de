//! Retry logic.
//!
//! # Responsibilities
//! - Hold the configured retry budget and backoff bounds
//! - Hand out a fresh [`RetryState`] for every dispatched call
//! - Decide per failed attempt whether to sleep-and-retry or give up
//!
//! # Design Decisions
//! - Disabled retry is an attempt budget of one, not a separate code path
//! - State is never shared between calls, so no locking is needed
//! - Only transport failures reach this module; topology errors never do

use std::time::{Duration, Instant};

use crate::config::RetryConfig;
use crate::error::{DispatchError, RetryableError};
use crate::observability::metrics;
use crate::resilience::backoff::{calculate_backoff, with_jitter};

/// Factory for per-call retry state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    period: Duration,
    max_period: Duration,
    jitter: bool,
}

impl RetryPolicy {
    /// Create an enabled policy.
    pub fn new(period: Duration, max_period: Duration, max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            period,
            max_period,
            jitter: false,
        }
    }

    /// A policy that treats the first failure as terminal.
    pub fn never() -> Self {
        Self {
            max_attempts: 1,
            period: Duration::ZERO,
            max_period: Duration::ZERO,
            jitter: false,
        }
    }

    /// Build the policy described by the `retry.*` register properties.
    pub fn from_config(config: &RetryConfig) -> Self {
        if !config.enabled {
            return Self::never();
        }
        Self::new(
            Duration::from_millis(config.period_ms),
            Duration::from_millis(config.max_period_ms),
            config.max_attempts,
        )
        .with_jitter(config.jitter)
    }

    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Start tracking a new call. The first attempt is already counted.
    pub fn new_state(&self) -> RetryState {
        RetryState {
            policy: *self,
            attempt: 1,
            delay: Duration::ZERO,
            started: Instant::now(),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}

/// Per-call retry counters.
#[derive(Debug)]
pub struct RetryState {
    policy: RetryPolicy,
    attempt: u32,
    delay: Duration,
    started: Instant,
}

impl RetryState {
    /// Number of attempts made so far, the one in flight included.
    pub fn attempt_count(&self) -> u32 {
        self.attempt
    }

    /// The delay slept before the current attempt (zero for the first one).
    pub fn current_delay(&self) -> Duration {
        self.delay
    }

    /// Time since the call started.
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Delay that would precede the next attempt.
    pub fn next_delay(&self) -> Duration {
        let delay = calculate_backoff(
            self.attempt,
            self.policy.period.as_millis() as u64,
            self.policy.max_period.as_millis() as u64,
        );
        if self.policy.jitter {
            with_jitter(delay)
        } else {
            delay
        }
    }

    /// Sleep and return `Ok` if another attempt is allowed, otherwise turn
    /// `err` into the terminal error.
    ///
    /// Only the calling task is suspended.
    pub async fn continue_or_propagate(&mut self, err: RetryableError) -> Result<(), DispatchError> {
        if self.attempt >= self.policy.max_attempts {
            return Err(DispatchError::Io {
                method: err.method,
                url: err.url,
                attempts: self.attempt,
                elapsed: self.elapsed(),
                source: err.source,
            });
        }

        let delay = self.next_delay();
        tracing::info!(
            attempt = self.attempt,
            max_attempts = self.policy.max_attempts,
            delay = ?delay,
            error = %err,
            "Retrying request"
        );
        metrics::record_retry(&err.method);

        tokio::time::sleep(delay).await;
        self.attempt += 1;
        self.delay = delay;
        Ok(())
    }
}
