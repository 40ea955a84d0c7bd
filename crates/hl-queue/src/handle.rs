use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::sync::oneshot;

use crate::error::QueueError;

/// Deferred result of a unit submitted to an [`OperationQueue`].
///
/// Resolves with the unit's own `Ok`/`Err` once it has run. If the unit
/// panicked, the handle resolves to `QueueError::UnitAborted` converted into
/// the caller's error type. Dropping the handle does not cancel the unit.
///
/// [`OperationQueue`]: crate::OperationQueue
#[must_use = "a queue handle does nothing unless awaited; the unit runs regardless"]
pub struct QueueHandle<T, E> {
    rx: oneshot::Receiver<Result<T, E>>,
}

impl<T, E> QueueHandle<T, E> {
    pub(crate) fn new(rx: oneshot::Receiver<Result<T, E>>) -> Self {
        Self { rx }
    }

    /// A handle that is already resolved, for work rejected before queueing.
    pub fn ready(outcome: Result<T, E>) -> Self {
        let (tx, rx) = oneshot::channel();
        let _ = tx.send(outcome);
        Self { rx }
    }
}

impl<T, E> Future for QueueHandle<T, E>
where
    E: From<QueueError>,
{
    type Output = Result<T, E>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.rx).poll(cx) {
            Poll::Ready(Ok(outcome)) => Poll::Ready(outcome),
            Poll::Ready(Err(_)) => Poll::Ready(Err(QueueError::UnitAborted.into())),
            Poll::Pending => Poll::Pending,
        }
    }
}

impl<T, E> std::fmt::Debug for QueueHandle<T, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueueHandle").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn ready_handle_resolves_immediately() {
        let handle: QueueHandle<u8, QueueError> = QueueHandle::ready(Err(QueueError::NoRuntime));
        assert_eq!(handle.await, Err(QueueError::NoRuntime));
    }
}
