use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tracing::{debug, trace, warn};

use crate::error::QueueError;
use crate::handle::QueueHandle;

/// A type-erased unit of work, already wired to its caller's handle.
type Unit = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// Pending units plus the single "currently running" flag.
///
/// Only touched synchronously (push on submit, pop between units), never
/// across an await point.
struct Backlog {
    units: VecDeque<Unit>,
    running: bool,
}

#[derive(Default)]
struct Counters {
    submitted: AtomicU64,
    completed: AtomicU64,
    failed: AtomicU64,
    aborted: AtomicU64,
}

struct Shared {
    name: String,
    backlog: Mutex<Backlog>,
    runtime: Handle,
    counters: Arc<Counters>,
}

/// Point-in-time counters for an [`OperationQueue`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct QueueStats {
    /// Units accepted by `submit`.
    pub submitted: u64,
    /// Units that resolved with `Ok`.
    pub completed: u64,
    /// Units that resolved with `Err`.
    pub failed: u64,
    /// Units that panicked or were torn down with the runtime.
    pub aborted: u64,
}

/// FIFO queue running one asynchronous unit of work at a time.
///
/// Cloning is cheap; all clones share the same backlog, so a unit holding a
/// clone can submit follow-up work to its own queue. Such follow-ups run
/// after everything already queued. A unit must not await the handle of a
/// follow-up it submitted itself: the follow-up cannot start until the
/// awaiting unit has finished.
#[derive(Clone)]
pub struct OperationQueue {
    shared: Arc<Shared>,
}

impl OperationQueue {
    /// Create a queue driven by the current tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics when called outside of a tokio runtime, like `tokio::spawn`.
    /// Use [`OperationQueue::try_new`] to get an error instead.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_runtime(name, Handle::current())
    }

    /// Create a queue driven by the current tokio runtime, if there is one.
    pub fn try_new(name: impl Into<String>) -> Result<Self, QueueError> {
        let runtime = Handle::try_current().map_err(|_| QueueError::NoRuntime)?;
        Ok(Self::with_runtime(name, runtime))
    }

    /// Create a queue whose units run on the given runtime.
    pub fn with_runtime(name: impl Into<String>, runtime: Handle) -> Self {
        Self {
            shared: Arc::new(Shared {
                name: name.into(),
                backlog: Mutex::new(Backlog {
                    units: VecDeque::new(),
                    running: false,
                }),
                runtime,
                counters: Arc::new(Counters::default()),
            }),
        }
    }

    /// Queue a unit of work and return a handle to its result.
    ///
    /// If the queue is idle the unit starts right away; otherwise it waits
    /// until every unit submitted before it has completed, successfully or
    /// not. Never blocks the caller.
    pub fn submit<T, E, F>(&self, unit: F) -> QueueHandle<T, E>
    where
        F: Future<Output = Result<T, E>> + Send + 'static,
        T: Send + 'static,
        E: Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        let counters = Arc::clone(&self.shared.counters);
        let seq = counters.submitted.fetch_add(1, Ordering::Relaxed);

        let wrapped: Unit = Box::pin(async move {
            let outcome = unit.await;
            if outcome.is_ok() {
                counters.completed.fetch_add(1, Ordering::Relaxed);
            } else {
                counters.failed.fetch_add(1, Ordering::Relaxed);
            }
            // The caller may have dropped its handle; the unit still counts.
            let _ = tx.send(outcome);
        });

        let start_drain = {
            let mut backlog = self.shared.backlog.lock().expect("queue lock poisoned");
            backlog.units.push_back(wrapped);
            if backlog.running {
                false
            } else {
                backlog.running = true;
                true
            }
        };

        trace!(queue = %self.shared.name, seq, start_drain, "unit submitted");
        if start_drain {
            self.shared.runtime.spawn(drain(Arc::clone(&self.shared)));
        }

        QueueHandle::new(rx)
    }

    /// Number of units waiting to start (excluding the one running).
    pub fn pending(&self) -> usize {
        self.shared
            .backlog
            .lock()
            .expect("queue lock poisoned")
            .units
            .len()
    }

    /// Returns `true` while a drain loop is active.
    pub fn is_running(&self) -> bool {
        self.shared
            .backlog
            .lock()
            .expect("queue lock poisoned")
            .running
    }

    /// Snapshot of the queue counters.
    pub fn stats(&self) -> QueueStats {
        let c = &self.shared.counters;
        QueueStats {
            submitted: c.submitted.load(Ordering::Relaxed),
            completed: c.completed.load(Ordering::Relaxed),
            failed: c.failed.load(Ordering::Relaxed),
            aborted: c.aborted.load(Ordering::Relaxed),
        }
    }

    /// Name given at construction, used in log fields.
    pub fn name(&self) -> &str {
        &self.shared.name
    }
}

impl std::fmt::Debug for OperationQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperationQueue")
            .field("name", &self.shared.name)
            .field("pending", &self.pending())
            .finish()
    }
}

/// Run queued units one after another until the backlog is empty.
///
/// Each unit runs on its own task so a panic is contained to that unit.
async fn drain(shared: Arc<Shared>) {
    let mut ran = 0u64;
    loop {
        let unit = {
            let mut backlog = shared.backlog.lock().expect("queue lock poisoned");
            match backlog.units.pop_front() {
                Some(unit) => unit,
                None => {
                    backlog.running = false;
                    break;
                }
            }
        };

        if let Err(err) = shared.runtime.spawn(unit).await {
            shared.counters.aborted.fetch_add(1, Ordering::Relaxed);
            warn!(queue = %shared.name, error = %err, "queued unit aborted");
        }
        ran += 1;
    }
    debug!(queue = %shared.name, ran, "queue drained");
}
