// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Bounded retry policy for remote session creation.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::{OrchestratorError, RemoteError};

/// Default number of attempts, including the first.
pub const DEFAULT_RETRY_ATTEMPTS: u32 = 3;

/// Default delay unit in milliseconds.
pub const DEFAULT_RETRY_BASE_DELAY_MS: u64 = 1000;

/// Attempt-indexed backoff: after failed attempt `n` the policy waits `base_delay * n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_RETRY_ATTEMPTS,
            base_delay: Duration::from_millis(DEFAULT_RETRY_BASE_DELAY_MS),
        }
    }
}

impl RetryPolicy {
    /// Create a policy. At least one attempt is always made.
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay to wait after failed attempt `attempt` (1-based).
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(attempt)
    }

    /// Run `operation` until it succeeds or the attempt budget is spent.
    ///
    /// Every [`RemoteError`] is retried. When the budget is exhausted the last
    /// error is returned wrapped in [`OrchestratorError::RetriesExhausted`].
    /// The sleep between attempts only suspends the calling task.
    pub async fn run<T, F, Fut>(&self, operation_name: &str, mut operation: F) -> Result<T, OrchestratorError>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, RemoteError>>,
    {
        let mut attempt = 1;
        loop {
            match operation(attempt).await {
                Ok(value) => {
                    if attempt > 1 {
                        debug!(operation = operation_name, attempt, "Succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(err) if attempt >= self.max_attempts => {
                    warn!(operation = operation_name, attempts = attempt, status = ?err.status_code(), error = %err, "Retries exhausted");
                    return Err(OrchestratorError::RetriesExhausted {
                        attempts: attempt,
                        last: err,
                    });
                }
                Err(err) => {
                    let delay = self.delay_after(attempt);
                    if err.is_retryable() {
                        debug!(operation = operation_name, attempt, error = %err, ?delay, "Transient failure, retrying");
                    } else {
                        warn!(operation = operation_name, attempt, status = ?err.status_code(), error = %err, ?delay, "Attempt failed, retrying");
                    }
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}
