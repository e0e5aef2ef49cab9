//! Bounded batch writes with partial-failure retry.
//!
//! Batch-write endpoints (DynamoDB `BatchWriteItem` and similar) cap the
//! number of items per call and may apply only part of a batch, returning the
//! rest as "unprocessed". This crate drains a stream of put/delete items
//! through such an endpoint:
//!
//! 1. Items are grouped into batches of at most `max_batch_size`.
//! 2. Unprocessed items are resubmitted on their own, after an exponential
//!    backoff, before any fresh item is taken.
//! 3. Consumed capacity is summed over every call.
//!
//! The endpoint is injected through [`BatchSubmitter`], which closures
//! implement too, so put and delete runs share one [`BatchExecutor`].
//! [`InMemoryTable`] is a submitter for tests and local use.

pub mod cancel;
pub mod config;
pub mod error;
pub mod executor;
pub mod memory;
pub mod report;
pub mod retry;
pub mod traits;

pub use cancel::CancellationToken;
pub use config::{ExecutorConfig, DEFAULT_BACKOFF_BASE_MS, DEFAULT_MAX_BATCH_SIZE};
pub use error::{BatchError, BatchResult, SubmitError};
pub use executor::{submit_and_drain, AggregateResult, BatchExecutor};
pub use memory::{InMemoryTable, ScriptedCall};
pub use report::CapacityReport;
pub use retry::{backoff_delay, RetryState};
pub use traits::{BatchSubmitter, RecordingSleeper, Sleeper, SubmissionResult, ThreadSleeper};
