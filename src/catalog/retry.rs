//! Bounded retry with configurable delay schedules
//!
//! Two schedules exist on purpose: the synchronous resolver backs off
//! exponentially, while the latency-sensitive streaming job uses a short
//! fixed delay. They stay separately configured rather than unified.
//!
//! Only failures classified as transient by the catalog client are
//! retried; provider-reported failures fail fast on the first attempt.

use crate::catalog::client::ClientError;
use std::future::Future;
use std::time::Duration;

/// Delay schedule for retrying transient catalog failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryPolicy {
    /// Delay `base * 2^(attempt-1)` after the attempt-th failure
    ExponentialBackoff { attempts: u32, base: Duration },
    /// Constant delay between attempts
    FixedDelay { attempts: u32, delay: Duration },
}

impl RetryPolicy {
    /// Total attempt budget (first try included)
    pub fn attempts(&self) -> u32 {
        match self {
            RetryPolicy::ExponentialBackoff { attempts, .. } => *attempts,
            RetryPolicy::FixedDelay { attempts, .. } => *attempts,
        }
    }

    /// Delay to sleep after the given 1-based failed attempt
    pub fn delay_after(&self, attempt: u32) -> Duration {
        match self {
            RetryPolicy::ExponentialBackoff { base, .. } => {
                *base * 2u32.saturating_pow(attempt.saturating_sub(1))
            }
            RetryPolicy::FixedDelay { delay, .. } => *delay,
        }
    }
}

/// Run an operation under a retry policy
///
/// Retries only transient failures, sleeping per the policy schedule
/// between attempts. The final error is returned once the budget is
/// exhausted or a non-transient failure occurs.
pub async fn with_retry<T, F, Fut>(policy: &RetryPolicy, mut op: F) -> Result<T, ClientError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ClientError>>,
{
    let mut attempt = 1u32;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_transient() && attempt < policy.attempts() => {
                let delay = policy.delay_after(attempt);
                tracing::info!(
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    "retrying catalog call after transient failure: {}",
                    err
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}
