use std::io;

/// Errors from listing operations.
///
/// An aborted remote call is not an error: sources report it as
/// [`PageOutcome::Aborted`](crate::PageOutcome) and the lister ends normally.
#[derive(Debug, thiserror::Error)]
pub enum ListingError {
    /// The bucket being listed does not exist.
    #[error("container not found: {0}")]
    ContainerMissing(String),

    /// The scope cannot be listed.
    #[error("invalid listing scope: {0}")]
    InvalidScope(String),

    /// Any other transport or service failure.
    #[error("transport failure: {0}")]
    TransportFailure(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Directory traversal failed in a local source.
    #[error("directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),
}

impl ListingError {
    pub fn transport(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::TransportFailure(err.into())
    }
}

/// Result alias for listing operations.
pub type ListingResult<T> = Result<T, ListingError>;
