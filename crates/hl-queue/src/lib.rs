//! Operation queue for the hashlink ledger.
//!
//! [`OperationQueue`] serializes asynchronous units of work: at most one unit
//! runs at any instant, units start in submission order, and each caller gets
//! a [`QueueHandle`] that resolves with its own unit's result.
//!
//! # Guarantees
//!
//! 1. Strict FIFO. No priorities, no cancellation of queued units.
//! 2. A failing or panicking unit only affects its own handle; the queue
//!    moves on to the next unit.
//! 3. Submission never blocks and may happen from inside a running unit.
//!    Such units join the back of the backlog.
//! 4. Draining is a loop, not recursion, so arbitrarily long chains of
//!    re-entrant submissions run in constant stack space.

pub mod error;
pub mod handle;
pub mod queue;

pub use error::QueueError;
pub use handle::QueueHandle;
pub use queue::{OperationQueue, QueueStats};
