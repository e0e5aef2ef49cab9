use thiserror::Error;

/// Failure reported by a [`BatchSubmitter`](crate::BatchSubmitter) for one
/// submission.
///
/// Partially applied batches are not errors: they are reported through
/// [`SubmissionResult::unprocessed_items`](crate::SubmissionResult).
#[derive(Debug, Error)]
pub enum SubmitError {
    /// The provider throttled the request.
    #[error("provisioned throughput exceeded")]
    ThroughputExceeded,

    /// The target table does not exist.
    #[error("resource not found")]
    ResourceMissing,

    /// The call was aborted by the caller.
    #[error("request aborted")]
    Aborted,

    /// Any other transport or service failure.
    #[error(transparent)]
    Transport(Box<dyn std::error::Error + Send + Sync>),
}

impl SubmitError {
    pub fn transport(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Transport(err.into())
    }
}

/// Errors from a batch drain.
#[derive(Debug, Error)]
pub enum BatchError {
    #[error(
        "throughput exceeded on '{target}' (retry attempt {attempt}); \
         reduce the batch size or increase provisioned capacity"
    )]
    ThroughputExceeded { target: String, attempt: u32 },

    #[error("target '{target}' does not exist")]
    ResourceMissing { target: String },

    /// Cancelled by the caller, either between submissions or by an
    /// aborted call.
    #[error("batch write cancelled after {submissions} submissions")]
    Cancelled { submissions: u64 },

    #[error("transport failure on '{target}' (retry attempt {attempt}): {source}")]
    TransportFailure {
        target: String,
        attempt: u32,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The submitter returned more unprocessed items than it was given.
    #[error("submitter returned {unprocessed} unprocessed items for a batch of {submitted}")]
    UnexpectedUnprocessed { submitted: usize, unprocessed: usize },

    #[error("invalid executor configuration: {0}")]
    InvalidConfig(String),
}

/// Result alias for batch operations.
pub type BatchResult<T> = Result<T, BatchError>;
