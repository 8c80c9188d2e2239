//! Bounded retry with exponential backoff for model calls.

use std::future::Future;
use std::time::Duration;

use super::error::NarrativeError;

/// Default number of attempts per call.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default base delay; waits are 2s then 4s.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        RetryPolicy {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay after the given number of failed attempts: `base * 2^failures`.
    pub fn delay_after(&self, failures: u32) -> Duration {
        self.base_delay.saturating_mul(2u32.saturating_pow(failures))
    }

    /// Run `f` until it succeeds, fails with a final error, or the attempts
    /// are exhausted. `f` receives the 1-based attempt number.
    pub async fn run<T, F, Fut>(&self, operation: &str, mut f: F) -> Result<T, NarrativeError>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, NarrativeError>>,
    {
        let mut attempt = 1;
        loop {
            match f(attempt).await {
                Ok(value) => return Ok(value),
                Err(e) if attempt < self.max_attempts && e.is_retryable() => {
                    let delay = self.delay_after(attempt);
                    tracing::warn!(
                        operation,
                        attempt,
                        max_attempts = self.max_attempts,
                        "Model call failed, retrying in {delay:?}: {e}"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    tracing::error!(operation, attempt, error = %e, "Model call failed");
                    return Err(e);
                }
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy::new(DEFAULT_MAX_ATTEMPTS, DEFAULT_BASE_DELAY)
    }
}
