// crates/moneta-orchestration/src/eventually.rs
// ============================================================================
// Module: Convergence Poller
// Description: Bounded retry of a fallible check until success or timeout.
// Purpose: Wait on asynchronously-converging state without arbitrary sleeps.
// Dependencies: tokio, thiserror
// ============================================================================

//! ## Overview
//! [`Eventually`] retries an arbitrary check at a fixed or backing-off
//! interval until it succeeds or a timeout elapses. One attempt is in flight
//! at a time and the poller suspends the calling task between attempts, so
//! checks with side effects are safe to re-run. Past the deadline the last
//! observed failure is what the caller sees; intermediate failures are
//! discarded, matching a most-recent-evidence policy over idempotent checks.
//! Invariants:
//! - The final failure is never silently swallowed.
//! - A check failing N times before success costs at least N sleep intervals.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use std::time::Instant;

use thiserror::Error;
use tokio::time::sleep;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// The check never converged within the timeout.
#[derive(Debug, Error)]
#[error(
    "no convergence after {attempts} attempts in {} ms: {last_error}",
    elapsed.as_millis()
)]
pub struct ConvergenceError {
    /// Attempts made, including the final one.
    pub attempts: u32,
    /// Time spent polling before giving up.
    pub elapsed: Duration,
    /// The last failure observed, verbatim.
    pub last_error: String,
}

// ============================================================================
// SECTION: Poller
// ============================================================================

/// Retry-until-success-or-timeout primitive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Eventually {
    /// Total budget before the last failure is surfaced.
    timeout: Duration,
    /// Sleep between attempts.
    interval: Duration,
    /// Multiplier applied to the interval after each failed attempt.
    backoff: f64,
}

impl Default for Eventually {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            interval: Duration::from_millis(100),
            backoff: 1.0,
        }
    }
}

impl Eventually {
    /// Returns a poller with the given total timeout.
    #[must_use]
    pub fn within(timeout: Duration) -> Self {
        Self {
            timeout,
            ..Self::default()
        }
    }

    /// Overrides the sleep interval between attempts.
    #[must_use]
    pub const fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Applies a backoff multiplier to the interval after each failure.
    #[must_use]
    pub const fn backoff(mut self, factor: f64) -> Self {
        self.backoff = factor;
        self
    }

    /// Retries `check` until it succeeds or the timeout elapses.
    ///
    /// # Errors
    ///
    /// Returns [`ConvergenceError`] carrying the last failure once the
    /// deadline has passed.
    pub async fn run<T, E, F, Fut>(&self, mut check: F) -> Result<T, ConvergenceError>
    where
        E: Display,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let started = Instant::now();
        let mut attempts: u32 = 0;
        let mut delay = self.interval;
        loop {
            attempts = attempts.saturating_add(1);
            match check().await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    if started.elapsed() >= self.timeout {
                        return Err(ConvergenceError {
                            attempts,
                            elapsed: started.elapsed(),
                            last_error: err.to_string(),
                        });
                    }
                    sleep(delay).await;
                    if self.backoff > 1.0 {
                        delay = delay.mul_f64(self.backoff);
                    }
                }
            }
        }
    }

    /// Retries a boolean predicate; a false result counts as a failure
    /// described by `what`.
    ///
    /// # Errors
    ///
    /// Returns [`ConvergenceError`] once the deadline has passed with the
    /// predicate still false.
    pub async fn run_until<F, Fut>(&self, what: &str, mut predicate: F) -> Result<(), ConvergenceError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = bool>,
    {
        self.run(|| {
            let attempt = predicate();
            async move {
                if attempt.await { Ok(()) } else { Err(format!("still waiting: {what}")) }
            }
        })
        .await
    }

    /// Returns the configured sleep interval.
    #[must_use]
    pub const fn interval_duration(&self) -> Duration {
        self.interval
    }
}

/// Retries `check` with the default ten-second budget.
///
/// # Errors
///
/// Returns [`ConvergenceError`] carrying the last failure once the default
/// deadline has passed.
pub async fn eventually<T, E, F, Fut>(check: F) -> Result<T, ConvergenceError>
where
    E: Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    Eventually::default().run(check).await
}
