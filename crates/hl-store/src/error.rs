/// Errors from key-value store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No value is stored under the requested key.
    #[error("key not found: {0}")]
    NotFound(String),

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stored value failed its integrity check or could not be decoded.
    #[error("corrupt value for key {key}: {reason}")]
    Corrupt { key: String, reason: String },

    /// The key cannot be represented by this backend.
    #[error("invalid key {0:?}")]
    InvalidKey(String),

    /// The store has been closed.
    #[error("store is closed")]
    Closed,
}

impl StoreError {
    /// Returns `true` for the "no such key" condition.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
