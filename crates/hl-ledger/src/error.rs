use hl_queue::QueueError;
use hl_store::StoreError;

/// Errors produced by ledger operations.
///
/// Chain integrity problems are not errors; they are reported through
/// [`ValidationReport`](crate::ValidationReport).
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("no block stored at height {height}")]
    BlockNotFound { height: u64 },

    /// A storage failure, passed through as the store reported it.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("tip pointer is unreadable: {0}")]
    CorruptTip(String),

    #[error("queue error: {0}")]
    Queue(#[from] QueueError),

    /// Rejected before queueing because a `close` has completed.
    #[error("ledger is closed")]
    Closed,

    #[error("configuration error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for LedgerError {
    fn from(err: serde_json::Error) -> Self {
        LedgerError::Serialization(err.to_string())
    }
}

/// Result alias for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;
