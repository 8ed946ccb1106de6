//! Bounded retry with a fixed delay

use crate::config::RetryConfig;
use crate::error::SolcResult;
use std::future::Future;
use std::time::Duration;

/// Retry policy applied around catalog acquisition and resolution.
///
/// `max_attempts` counts real attempts: a policy of 5 calls the operation at
/// most five times. Only errors reporting [`is_transient`] are retried; any
/// other error, and the error of the final attempt, is returned unchanged.
///
/// [`is_transient`]: crate::SolcError::is_transient
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    /// Single attempt, no delay
    pub fn none() -> Self {
        Self::new(1, Duration::ZERO)
    }

    /// Total attempts, including the first
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Pause between attempts
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Run `operation`, passing the 1-based attempt number.
    pub async fn run<T, F, Fut>(&self, mut operation: F) -> SolcResult<T>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = SolcResult<T>>,
    {
        let mut attempt = 1;
        loop {
            match operation(attempt).await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_transient() && attempt < self.max_attempts => {
                    tracing::warn!(
                        attempt,
                        max_attempts = self.max_attempts,
                        error = %err,
                        "Transient failure, retrying"
                    );
                    tokio::time::sleep(self.delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryConfig::default().into()
    }
}

impl From<RetryConfig> for RetryPolicy {
    fn from(config: RetryConfig) -> Self {
        Self::new(config.max_attempts, Duration::from_millis(config.delay_ms))
    }
}
