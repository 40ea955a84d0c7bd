//! Asynchronous key-value storage for the hashlink ledger.
//!
//! The ledger treats storage as an external collaborator reached through the
//! [`KvStore`] trait: `get`/`put`/`delete`/`scan` by string key, each with
//! asynchronous completion. The store never interprets values.
//!
//! # Storage Backends
//!
//! - [`InMemoryKvStore`] -- `BTreeMap`-based store for tests and embedding
//! - [`FileKvStore`] -- one checksummed file per key under a root directory
//!
//! # Design Rules
//!
//! 1. `get` on a missing key is a distinct [`StoreError::NotFound`].
//! 2. `delete` on a missing key succeeds.
//! 3. After `close`, every operation fails with [`StoreError::Closed`].
//! 4. All I/O errors are propagated, never silently ignored.

pub mod error;
pub mod file;
pub mod memory;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use file::FileKvStore;
pub use memory::InMemoryKvStore;
pub use traits::KvStore;
