use thiserror::Error;

/// Failures surfaced by the attendance record store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Network failure or non-success response on a read.
    #[error("fetch failed: {0}")]
    Fetch(String),
    /// Rejected write; the message is the store's, surfaced verbatim.
    #[error("{0}")]
    Validation(String),
}

impl StoreError {
    pub fn fetch(message: impl Into<String>) -> Self {
        Self::Fetch(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}
