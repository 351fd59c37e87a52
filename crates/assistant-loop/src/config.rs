use std::time::Duration;

use assistant_core::RetrySettings;

/// Retry budget and timing for one `ask` call.
///
/// Attempts are numbered from 1. Attempt `n` may run for
/// `timeout_base + n * timeout_step`; a failed attempt `n` is followed by a
/// pause of `backoff_base * 2^(n-1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub backoff_base: Duration,
    pub timeout_base: Duration,
    pub timeout_step: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetrySettings::default().into()
    }
}

impl From<RetrySettings> for RetryPolicy {
    fn from(settings: RetrySettings) -> Self {
        Self {
            max_retries: settings.max_retries,
            backoff_base: Duration::from_millis(settings.backoff_base_ms),
            timeout_base: Duration::from_millis(settings.timeout_base_ms),
            timeout_step: Duration::from_millis(settings.timeout_step_ms),
        }
    }
}

impl RetryPolicy {
    /// Initial attempt plus retries.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    pub fn timeout_for(&self, attempt: u32) -> Duration {
        self.timeout_step
            .checked_mul(attempt)
            .and_then(|step| self.timeout_base.checked_add(step))
            .unwrap_or(Duration::MAX)
    }

    pub fn backoff_for(&self, attempt: u32) -> Duration {
        2u32.checked_pow(attempt.saturating_sub(1))
            .and_then(|factor| self.backoff_base.checked_mul(factor))
            .unwrap_or(Duration::MAX)
    }
}
