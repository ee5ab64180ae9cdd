use thiserror::Error;

/// Error taxonomy for the document store and its collaborators.
///
/// Each variant carries its own recovery policy: provider failures are
/// recovered locally during search but surfaced during writes, persistence
/// failures are always surfaced, validation failures are raised before any
/// I/O is attempted, and `InitializationUnavailable` disables retrieval for
/// the rest of the process lifetime.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("embedding provider error: {0}")]
    Provider(String),
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("validation error: {0}")]
    Validation(String),
    #[error("initialization unavailable: {0}")]
    InitializationUnavailable(String),
}

impl StoreError {
    pub fn provider<E: std::fmt::Display>(err: E) -> Self {
        StoreError::Provider(err.to_string())
    }

    pub fn persistence<E: std::fmt::Display>(err: E) -> Self {
        StoreError::Persistence(err.to_string())
    }
}
