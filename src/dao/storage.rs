use std::error::Error;
use thiserror::Error;

/// Result alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// A result-store operation that could not complete.
///
/// All backend failures collapse into this one shape: the coordinator only
/// cares that a write or ping failed, not which driver error caused it. The
/// `context` string names the failing operation for the logs and the original
/// backend error rides along as the source.
#[derive(Debug, Error)]
#[error("result store unavailable: {context}")]
pub struct StorageError {
    context: String,
    #[source]
    source: Box<dyn Error + Send + Sync>,
}

impl StorageError {
    /// Wrap a backend failure, naming the operation that hit it.
    pub fn new(context: impl Into<String>, source: impl Error + Send + Sync + 'static) -> Self {
        StorageError {
            context: context.into(),
            source: Box::new(source),
        }
    }
}
