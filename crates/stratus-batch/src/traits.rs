use std::time::Duration;

use serde::{Deserialize, Serialize};
use stratus_types::BatchItem;

use crate::error::SubmitError;

/// Provider response to one batch submission.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SubmissionResult {
    /// Items the provider declined to apply; empty on full success.
    pub unprocessed_items: Vec<BatchItem>,
    /// Provider-reported cost of the call.
    pub consumed_capacity_units: f64,
}

impl SubmissionResult {
    /// Every item applied.
    pub fn complete(consumed_capacity_units: f64) -> Self {
        Self {
            unprocessed_items: Vec::new(),
            consumed_capacity_units,
        }
    }

    pub fn partial(unprocessed_items: Vec<BatchItem>, consumed_capacity_units: f64) -> Self {
        Self {
            unprocessed_items,
            consumed_capacity_units,
        }
    }
}

/// Remote batch-write endpoint.
///
/// Implementations map their native response onto [`SubmissionResult`].
/// Delete items must be safe to resubmit; put items overwrite, so they are
/// idempotent by nature.
pub trait BatchSubmitter {
    /// Submit one batch of at most `max_batch_size` items.
    fn submit(&mut self, batch: &[BatchItem]) -> Result<SubmissionResult, SubmitError>;
}

impl<F> BatchSubmitter for F
where
    F: FnMut(&[BatchItem]) -> Result<SubmissionResult, SubmitError>,
{
    fn submit(&mut self, batch: &[BatchItem]) -> Result<SubmissionResult, SubmitError> {
        self(batch)
    }
}

/// Blocking wait used for backoff between retries.
pub trait Sleeper {
    fn sleep(&mut self, delay: Duration);
}

/// Sleeps the current thread.
#[derive(Clone, Copy, Debug, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&mut self, delay: Duration) {
        std::thread::sleep(delay);
    }
}

/// Records requested delays without waiting.
#[derive(Clone, Debug, Default)]
pub struct RecordingSleeper {
    delays: Vec<Duration>,
}

impl RecordingSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delays requested so far, in order.
    pub fn delays(&self) -> &[Duration] {
        &self.delays
    }

    pub fn total(&self) -> Duration {
        self.delays.iter().sum()
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&mut self, delay: Duration) {
        self.delays.push(delay);
    }
}
