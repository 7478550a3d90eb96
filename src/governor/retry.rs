//! Retry classification and backoff schedule

use crate::error::{Error, RETRYABLE_STATUSES};
use crate::types::BackoffType;
use std::collections::BTreeSet;
use std::time::Duration;

/// Decides which failures are worth resending and how long to wait
///
/// Failures without a response are always retryable; responses are
/// retryable only when their status is in the configured set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    max_retries: u32,
    base_delay: Duration,
    max_delay: Duration,
    backoff_type: BackoffType,
    retryable_statuses: BTreeSet<u16>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(1), Duration::from_secs(30))
    }
}

impl RetryPolicy {
    /// Exponential policy over the default retryable statuses
    pub fn new(max_retries: u32, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
            max_delay,
            backoff_type: BackoffType::Exponential,
            retryable_statuses: RETRYABLE_STATUSES.into_iter().collect(),
        }
    }

    /// Replace the backoff curve
    #[must_use]
    pub fn with_backoff(mut self, backoff_type: BackoffType) -> Self {
        self.backoff_type = backoff_type;
        self
    }

    /// Replace the set of retryable statuses
    #[must_use]
    pub fn with_statuses(mut self, statuses: impl IntoIterator<Item = u16>) -> Self {
        self.retryable_statuses = statuses.into_iter().collect();
        self
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub fn base_delay(&self) -> Duration {
        self.base_delay
    }

    pub fn max_delay(&self) -> Duration {
        self.max_delay
    }

    pub fn retryable_statuses(&self) -> &BTreeSet<u16> {
        &self.retryable_statuses
    }

    /// Classify a failure
    pub fn is_retryable(&self, error: &Error) -> bool {
        if error.is_network() {
            return true;
        }
        error
            .status()
            .is_some_and(|status| self.retryable_statuses.contains(&status))
    }

    /// Whether attempt number `attempt` (zero-based) may be followed by a resend
    pub fn should_retry(&self, error: &Error, attempt: u32) -> bool {
        attempt < self.max_retries && self.is_retryable(error)
    }

    /// Backoff before resend number `attempt + 1`
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let delay = match self.backoff_type {
            BackoffType::Constant => self.base_delay,
            BackoffType::Linear => self.base_delay.saturating_mul(attempt.saturating_add(1)),
            BackoffType::Exponential => {
                let factor = 2u32.saturating_pow(attempt);
                self.base_delay.saturating_mul(factor)
            }
        };

        std::cmp::min(delay, self.max_delay)
    }
}
