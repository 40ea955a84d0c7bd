use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use hl_queue::{OperationQueue, QueueHandle, QueueStats};
use hl_store::KvStore;
use tracing::{error, info};

use crate::block::Block;
use crate::config::LedgerConfig;
use crate::error::{LedgerError, LedgerResult};
use crate::ops;
use crate::validation::ValidationReport;

/// Deferred result of a ledger operation.
pub type LedgerHandle<T> = QueueHandle<T, LedgerError>;

/// Hash-linked block ledger over an asynchronous key-value store.
///
/// Every operation is submitted to the ledger's [`OperationQueue`] at the
/// moment the method is called and returns a [`LedgerHandle`] to await.
/// Operations therefore take effect in call order, one at a time, and none
/// observes another half-applied. Initialization is queued ahead of
/// everything else, so callers always see at least a genesis block.
///
/// ```ignore
/// let ledger = Ledger::open(Arc::new(InMemoryKvStore::new()), LedgerConfig::default()).await?;
/// let block = ledger.append(Block::new("hello")).await?;
/// assert_eq!(block.height, 1);
/// assert!(ledger.validate_chain().await?.is_valid());
/// ```
pub struct Ledger {
    store: Arc<dyn KvStore>,
    queue: OperationQueue,
    config: LedgerConfig,
    closed: Arc<AtomicBool>,
}

impl Ledger {
    /// Create a ledger and queue its initialization without waiting for it.
    ///
    /// Fails only when there is no tokio runtime to drive the queue.
    /// Initialization errors are logged; later operations then report their
    /// own storage errors.
    pub fn new(store: Arc<dyn KvStore>, config: LedgerConfig) -> LedgerResult<Self> {
        let ledger = Self::build(store, config)?;
        drop(ledger.submit_init());
        Ok(ledger)
    }

    /// Create a ledger and wait until storage is attached and genesis exists.
    pub async fn open(store: Arc<dyn KvStore>, config: LedgerConfig) -> LedgerResult<Self> {
        let ledger = Self::build(store, config)?;
        ledger.submit_init().await?;
        Ok(ledger)
    }

    fn build(store: Arc<dyn KvStore>, config: LedgerConfig) -> LedgerResult<Self> {
        let queue = OperationQueue::try_new(config.queue_name.clone())?;
        Ok(Self {
            store,
            queue,
            config,
            closed: Arc::new(AtomicBool::new(false)),
        })
    }

    fn submit_init(&self) -> LedgerHandle<()> {
        let genesis_body = self.config.genesis_body.clone();
        self.enqueue(move |store| async move {
            let result = ops::initialize(store.as_ref(), &genesis_body).await;
            if let Err(e) = &result {
                error!(error = %e, "ledger initialization failed");
            }
            result
        })
    }

    /// Submit a unit that runs against the store, unless the ledger is closed.
    fn enqueue<T, F, Fut>(&self, op: F) -> LedgerHandle<T>
    where
        F: FnOnce(Arc<dyn KvStore>) -> Fut,
        Fut: Future<Output = LedgerResult<T>> + Send + 'static,
        T: Send + 'static,
    {
        if self.is_closed() {
            return QueueHandle::ready(Err(LedgerError::Closed));
        }
        self.queue.submit(op(Arc::clone(&self.store)))
    }

    /// Append a block carrying `block.body` on top of the current tip.
    ///
    /// Height, timestamp, previous hash and hash are assigned here; whatever
    /// the caller put in those fields is ignored. Resolves with the block as
    /// persisted.
    pub fn append(&self, block: Block) -> LedgerHandle<Block> {
        self.enqueue(move |store| async move { ops::append_block(store.as_ref(), block).await })
    }

    /// Current tip height, or `None` when the ledger holds no blocks.
    pub fn block_height(&self) -> LedgerHandle<Option<u64>> {
        self.enqueue(|store| async move { ops::read_tip(store.as_ref()).await })
    }

    /// The block at `height`; `BlockNotFound` if it is above the tip.
    pub fn get_block(&self, height: u64) -> LedgerHandle<Block> {
        self.enqueue(move |store| async move { ops::read_block(store.as_ref(), height).await })
    }

    /// Overwrite the record at `height` verbatim.
    ///
    /// Neither the hash nor the tip pointer is touched. This bypasses every
    /// append invariant and exists to exercise validation against a
    /// tampered chain.
    pub fn update_block(&self, height: u64, block: Block) -> LedgerHandle<()> {
        self.enqueue(move |store| async move {
            ops::write_record(store.as_ref(), height, &block).await
        })
    }

    /// Check the stored hash of the block at `height`.
    pub fn validate_block(&self, height: u64) -> LedgerHandle<bool> {
        self.enqueue(move |store| async move {
            let block = ops::read_block(store.as_ref(), height).await?;
            Ok(block.validate_hash())
        })
    }

    /// Check every block from genesis to the tip.
    ///
    /// Each block's own hash is checked, the tip included, as is every link
    /// between neighbours. Integrity problems land in the report; only
    /// storage failures resolve to an error.
    pub fn validate_chain(&self) -> LedgerHandle<ValidationReport> {
        self.enqueue(|store| async move { ops::validate_chain(store.as_ref()).await })
    }

    /// Empty the ledger. See [`ResetMode`](crate::ResetMode) for what is
    /// removed from storage. The next append starts again at height 0.
    pub fn reset(&self) -> LedgerHandle<()> {
        let mode = self.config.reset_mode;
        self.enqueue(move |store| async move { ops::reset(store.as_ref(), mode).await })
    }

    /// Every block record in storage, ordered by height.
    ///
    /// Diagnostic dump built from a full store scan. With
    /// `ResetMode::TipOnly` it can include stale records above the tip.
    pub fn dump_chain(&self) -> LedgerHandle<Vec<Block>> {
        self.enqueue(|store| async move { ops::scan_blocks(store.as_ref()).await })
    }

    /// Close the store. Operations submitted afterwards fail with `Closed`.
    ///
    /// Operations already queued behind the close run against the closed
    /// store and fail with `Store(StoreError::Closed)`.
    pub fn close(&self) -> LedgerHandle<()> {
        let closed = Arc::clone(&self.closed);
        self.enqueue(move |store| async move {
            store.close().await?;
            closed.store(true, Ordering::Release);
            info!("ledger closed");
            Ok(())
        })
    }

    /// Returns `true` once a `close` has completed.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn queue_stats(&self) -> QueueStats {
        self.queue.stats()
    }
}

impl std::fmt::Debug for Ledger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ledger")
            .field("queue", &self.queue)
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}
