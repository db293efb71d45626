//! Retry budget and backoff schedule.

use std::time::Duration;

use crate::error::SdkError;

/// Verdict for a failed attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDecision {
    /// Try again after sleeping `delay`.
    Retry { delay: Duration },
    /// Surface the failure to the caller.
    GiveUp,
}

/// Decides whether failed attempts are retried and how long to back off.
///
/// The schedule allows `max_retries` attempts beyond the first. The delay is
/// the server's `Retry-After` when the failed response carried one,
/// otherwise exponential backoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetrySchedule {
    pub max_retries: u32,
}

impl RetrySchedule {
    pub fn new(max_retries: u32) -> Self {
        Self { max_retries }
    }

    /// Verdict for the failure of `attempt` (1-based).
    pub fn decide(&self, attempt: u32, error: &SdkError) -> RetryDecision {
        if attempt > self.max_retries || !error.is_retryable() {
            return RetryDecision::GiveUp;
        }
        RetryDecision::Retry {
            delay: self.delay_for(attempt, error),
        }
    }

    fn delay_for(&self, attempt: u32, error: &SdkError) -> Duration {
        if let SdkError::Api(api) = error {
            if let Some(delay) = api.retry_after {
                return delay;
            }
        }
        backoff_delay(attempt)
    }
}

/// Exponential backoff: attempt 1 waits 2s, attempt 2 waits 4s, and so on.
fn backoff_delay(attempt: u32) -> Duration {
    Duration::from_secs(2u64.saturating_pow(attempt))
}
