//! Retry bookkeeping for one logical batch lifecycle.
//!
//! A lifecycle starts when a batch of fresh items is submitted and ends when
//! the provider has accepted every item of it. Each resubmission of the
//! unprocessed remainder is one retry attempt; the attempt counter is only
//! reset once the remainder drains.
//!
//! The backoff grows without bound: a provider that keeps returning
//! unprocessed items makes the executor wait ever longer.

use std::time::Duration;

/// Delay before retry attempt `attempt`: `base * 2^(attempt - 1)`, or zero
/// for the first submission. Saturates instead of overflowing.
pub fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    if attempt == 0 {
        return Duration::ZERO;
    }
    let factor = 2u64.saturating_pow(attempt - 1);
    let millis = u64::try_from(base.as_millis()).unwrap_or(u64::MAX);
    Duration::from_millis(millis.saturating_mul(factor))
}

/// Retry counter for the batch currently being drained.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RetryState {
    attempt: u32,
}

impl RetryState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of retries made for the current batch so far.
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Returns `true` while unprocessed items of the current batch remain.
    pub fn is_retrying(&self) -> bool {
        self.attempt > 0
    }

    /// Record that the provider left items unprocessed.
    pub fn begin_retry(&mut self) {
        self.attempt = self.attempt.saturating_add(1);
    }

    /// Start a fresh lifecycle.
    pub fn reset(&mut self) {
        self.attempt = 0;
    }

    /// Delay to wait before the next submission.
    pub fn backoff(&self, base: Duration) -> Duration {
        backoff_delay(base, self.attempt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: Duration = Duration::from_millis(100);

    #[test]
    fn first_submission_has_no_delay() {
        assert_eq!(backoff_delay(BASE, 0), Duration::ZERO);
    }

    #[test]
    fn delay_doubles_per_attempt() {
        assert_eq!(backoff_delay(BASE, 1), Duration::from_millis(100));
        assert_eq!(backoff_delay(BASE, 2), Duration::from_millis(200));
        assert_eq!(backoff_delay(BASE, 3), Duration::from_millis(400));
        assert_eq!(backoff_delay(BASE, 4), Duration::from_millis(800));
    }

    #[test]
    fn delay_saturates() {
        let huge = backoff_delay(BASE, 200);
        assert_eq!(huge, Duration::from_millis(u64::MAX));
    }

    #[test]
    fn state_counts_and_resets() {
        let mut state = RetryState::new();
        assert!(!state.is_retrying());
        state.begin_retry();
        state.begin_retry();
        assert_eq!(state.attempt(), 2);
        assert_eq!(state.backoff(BASE), Duration::from_millis(200));
        state.reset();
        assert_eq!(state.attempt(), 0);
        assert_eq!(state.backoff(BASE), Duration::ZERO);
    }
}
