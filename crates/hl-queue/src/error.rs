/// Failures raised by the queue itself rather than by a unit of work.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueueError {
    /// The unit panicked or was dropped before producing a result.
    #[error("queued unit aborted before completing")]
    UnitAborted,

    /// The queue was created outside of a tokio runtime.
    #[error("no tokio runtime available to drive the queue")]
    NoRuntime,
}
