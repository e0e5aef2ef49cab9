use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{BatchError, BatchResult};

/// Provider ceiling on items per batch-write call.
pub const DEFAULT_MAX_BATCH_SIZE: usize = 25;

/// Base delay of the exponential backoff between retries.
pub const DEFAULT_BACKOFF_BASE_MS: u64 = 100;

/// Configuration for the [`BatchExecutor`](crate::BatchExecutor).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    /// Name of the target table, used in error messages.
    pub target: String,
    /// Maximum items per submission. Must be at least 1; values above the
    /// provider ceiling are passed through unchanged.
    pub max_batch_size: usize,
    /// Delay before the first retry; doubles on every further retry.
    pub backoff_base_ms: u64,
    /// Whether consumed capacity reported by the submitter is accumulated.
    pub track_consumed_capacity: bool,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            target: String::new(),
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
            backoff_base_ms: DEFAULT_BACKOFF_BASE_MS,
            track_consumed_capacity: true,
        }
    }
}

impl ExecutorConfig {
    /// Default configuration writing to the named target.
    pub fn for_target(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            ..Default::default()
        }
    }

    pub fn with_max_batch_size(mut self, max_batch_size: usize) -> Self {
        self.max_batch_size = max_batch_size;
        self
    }

    pub fn with_backoff_base_ms(mut self, backoff_base_ms: u64) -> Self {
        self.backoff_base_ms = backoff_base_ms;
        self
    }

    pub fn with_capacity_tracking(mut self, enabled: bool) -> Self {
        self.track_consumed_capacity = enabled;
        self
    }

    pub fn backoff_base(&self) -> Duration {
        Duration::from_millis(self.backoff_base_ms)
    }

    pub fn validate(&self) -> BatchResult<()> {
        if self.max_batch_size == 0 {
            return Err(BatchError::InvalidConfig(
                "max_batch_size must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
