//! Async condition helper for eventually-consistent assertions
//!
//! `eventually` polls a condition at a fixed interval until it becomes
//! true or the window closes. The observed cluster is eventually
//! consistent, so a predicate that queries it should map a transient
//! query error to `false` (and log it) rather than abort the poll.
//!
//! # Example
//!
//! ```ignore
//! use snapcheck::eventually;
//! use std::time::Duration;
//!
//! // Wait for the webhook deployment's annotations to change
//! eventually(|| async {
//!     webhook.template_annotations(&ctx).await.map(|a| a != before).unwrap_or(false)
//! })
//! .describe("webhook template annotations updated")
//! .await_condition()
//! .await?;
//!
//! // With a custom window
//! eventually(|| async { check_something().await })
//!     .timeout(Duration::from_secs(60))
//!     .iterations(12)
//!     .await_condition()
//!     .await?;
//! ```

use std::future::Future;
use std::time::Duration;
use tokio::time::{sleep, Instant};

use crate::config::{DEFAULT_ITERATIONS, DEFAULT_MAX_WAIT};

/// Error type for eventually checks
#[derive(Debug, thiserror::Error)]
pub enum ConditionError {
    #[error(
        "{condition} not met after {attempts} attempts over {elapsed:?} (timeout {timeout:?})"
    )]
    EventuallyFailed {
        condition: String,
        attempts: u32,
        elapsed: Duration,
        timeout: Duration,
    },
}

/// Builder for eventually checks
pub struct Eventually<F, Fut>
where
    F: Fn() -> Fut,
    Fut: Future<Output = bool>,
{
    condition: F,
    description: String,
    timeout: Duration,
    interval: Duration,
}

/// Create an eventually check that retries until the condition is true
///
/// Default timeout: 300 seconds, polled 20 times (every 15 seconds).
pub fn eventually<F, Fut>(condition: F) -> Eventually<F, Fut>
where
    F: Fn() -> Fut,
    Fut: Future<Output = bool>,
{
    Eventually {
        condition,
        description: "condition".to_string(),
        timeout: DEFAULT_MAX_WAIT,
        interval: DEFAULT_MAX_WAIT / DEFAULT_ITERATIONS,
    }
}

impl<F, Fut> Eventually<F, Fut>
where
    F: Fn() -> Fut,
    Fut: Future<Output = bool>,
{
    /// Name the condition for the timeout error message
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the total timeout; the interval is rescaled to keep the
    /// default iteration count
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self.interval = timeout / DEFAULT_ITERATIONS;
        self
    }

    /// Set the polling interval explicitly
    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Spread the current timeout over `iterations` polls
    pub fn iterations(mut self, iterations: u32) -> Self {
        self.interval = self.timeout / iterations.max(1);
        self
    }

    /// Run the check, retrying until success or timeout
    pub async fn await_condition(self) -> Result<(), ConditionError> {
        let start = Instant::now();
        let mut attempts = 0u32;

        loop {
            attempts += 1;

            if (self.condition)().await {
                return Ok(());
            }

            let elapsed = start.elapsed();
            if elapsed >= self.timeout {
                return Err(ConditionError::EventuallyFailed {
                    condition: self.description,
                    attempts,
                    elapsed,
                    timeout: self.timeout,
                });
            }

            sleep(self.interval).await;
        }
    }
}
