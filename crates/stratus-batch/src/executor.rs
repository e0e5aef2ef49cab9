use serde::{Deserialize, Serialize};
use stratus_types::BatchItem;
use tracing::{debug, warn};

use crate::cancel::CancellationToken;
use crate::config::ExecutorConfig;
use crate::error::{BatchError, BatchResult, SubmitError};
use crate::retry::RetryState;
use crate::traits::{BatchSubmitter, Sleeper, ThreadSleeper};

/// Totals for one drain.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregateResult {
    /// Sum of consumed capacity over every submission, retries included.
    /// Stays zero when capacity tracking is disabled.
    pub total_consumed_capacity_units: f64,
    /// Number of submissions that left items unprocessed.
    pub total_retry_cycles: u64,
    /// Number of submitter calls.
    pub submissions: u64,
    /// Items the provider applied.
    pub items_written: u64,
}

/// Writes a stream of items in bounded batches, resubmitting whatever the
/// provider leaves unprocessed.
///
/// Items are pulled lazily from the source, at most `max_batch_size` at a
/// time. When a submission leaves items unprocessed, exactly those items
/// form the next batch; no fresh input is taken until they drain. Each such
/// retry waits `backoff_base * 2^(attempt - 1)` first.
///
/// Throttling, a missing target and transport failures end the drain
/// immediately. The cancellation token is polled before every submission;
/// the backoff wait itself is not interruptible.
pub struct BatchExecutor<S = ThreadSleeper> {
    config: ExecutorConfig,
    sleeper: S,
    cancel: CancellationToken,
}

impl BatchExecutor<ThreadSleeper> {
    /// Executor that blocks the current thread during backoff.
    pub fn new(config: ExecutorConfig) -> BatchResult<Self> {
        Self::with_sleeper(config, ThreadSleeper)
    }
}

impl<S: Sleeper> BatchExecutor<S> {
    pub fn with_sleeper(config: ExecutorConfig, sleeper: S) -> BatchResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            sleeper,
            cancel: CancellationToken::new(),
        })
    }

    /// Use a caller-owned cancellation token.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    pub fn sleeper(&self) -> &S {
        &self.sleeper
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Submit every item of `items` through `submitter` and wait until all
    /// of them have been applied.
    pub fn submit_and_drain<I, B>(
        &mut self,
        items: I,
        submitter: &mut B,
    ) -> BatchResult<AggregateResult>
    where
        I: IntoIterator<Item = BatchItem>,
        B: BatchSubmitter + ?Sized,
    {
        let max = self.config.max_batch_size;
        let mut source = items.into_iter().fuse();
        let mut retry = RetryState::new();
        let mut batch: Vec<BatchItem> = Vec::with_capacity(max);
        let mut total = AggregateResult::default();

        loop {
            if !retry.is_retrying() {
                batch.extend(source.by_ref().take(max - batch.len()));
            }
            if batch.is_empty() {
                break;
            }
            if self.cancel.is_cancelled() {
                debug!(submissions = total.submissions, "batch drain cancelled");
                return Err(BatchError::Cancelled {
                    submissions: total.submissions,
                });
            }

            let delay = retry.backoff(self.config.backoff_base());
            if !delay.is_zero() {
                warn!(
                    table = %self.config.target,
                    attempt = retry.attempt(),
                    pending = batch.len(),
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    "resubmitting unprocessed items after backoff"
                );
                self.sleeper.sleep(delay);
            }

            let result = submitter
                .submit(&batch)
                .map_err(|e| self.convert(e, retry.attempt(), total.submissions))?;
            total.submissions += 1;

            let unprocessed = result.unprocessed_items.len();
            if unprocessed > batch.len() {
                return Err(BatchError::UnexpectedUnprocessed {
                    submitted: batch.len(),
                    unprocessed,
                });
            }
            if self.config.track_consumed_capacity {
                total.total_consumed_capacity_units += result.consumed_capacity_units;
            }
            total.items_written += (batch.len() - unprocessed) as u64;
            debug!(
                submission = total.submissions,
                size = batch.len(),
                unprocessed,
                "batch submitted"
            );

            if unprocessed == 0 {
                retry.reset();
                batch.clear();
            } else {
                retry.begin_retry();
                total.total_retry_cycles += 1;
                batch = result.unprocessed_items;
            }
        }

        debug!(
            submissions = total.submissions,
            retries = total.total_retry_cycles,
            items = total.items_written,
            "batch drain complete"
        );
        Ok(total)
    }

    fn convert(&self, err: SubmitError, attempt: u32, submissions: u64) -> BatchError {
        let target = self.config.target.clone();
        match err {
            SubmitError::ThroughputExceeded => BatchError::ThroughputExceeded { target, attempt },
            SubmitError::ResourceMissing => BatchError::ResourceMissing { target },
            SubmitError::Aborted => BatchError::Cancelled { submissions },
            SubmitError::Transport(source) => BatchError::TransportFailure {
                target,
                attempt,
                source,
            },
        }
    }
}

/// Drain `items` with the default configuration and the given batch size.
pub fn submit_and_drain<I, B>(
    items: I,
    max_batch_size: usize,
    submitter: &mut B,
) -> BatchResult<AggregateResult>
where
    I: IntoIterator<Item = BatchItem>,
    B: BatchSubmitter + ?Sized,
{
    let config = ExecutorConfig::default().with_max_batch_size(max_batch_size);
    BatchExecutor::new(config)?.submit_and_drain(items, submitter)
}
