use async_trait::async_trait;

use crate::error::StoreResult;

/// Asynchronous key-value store.
///
/// All implementations must satisfy these invariants:
/// - `put` overwrites any existing value at the key.
/// - `get` on a missing key returns `StoreError::NotFound`, never an empty value.
/// - `delete` on a missing key succeeds.
/// - `keys` lists every stored key, sorted, without reading values.
/// - `scan` yields a finite snapshot of every pair, sorted by key.
/// - Once `close` returns, every other operation returns `StoreError::Closed`
///   until the store is opened again.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Open or attach the backing storage. Idempotent.
    async fn open(&self) -> StoreResult<()>;

    /// Read the value stored under `key`.
    async fn get(&self, key: &str) -> StoreResult<Vec<u8>>;

    /// Store `value` under `key`, replacing any previous value.
    async fn put(&self, key: &str, value: Vec<u8>) -> StoreResult<()>;

    /// Remove the value under `key`, if any.
    async fn delete(&self, key: &str) -> StoreResult<()>;

    /// Every stored key, sorted.
    ///
    /// Succeeds even when some stored values are unreadable.
    async fn keys(&self) -> StoreResult<Vec<String>>;

    /// Every `(key, value)` pair currently stored, sorted by key.
    ///
    /// Intended for diagnostics only; not on any hot path.
    async fn scan(&self) -> StoreResult<Vec<(String, Vec<u8>)>>;

    /// Release the backing storage.
    async fn close(&self) -> StoreResult<()>;
}
