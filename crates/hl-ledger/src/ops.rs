//! Ledger steps that run inside a queued unit.
//!
//! Nothing here touches the operation queue. Each queued ledger operation is
//! a composition of these steps, so no unit ever waits on another unit.

use chrono::Utc;
use hl_store::{KvStore, StoreError};
use tracing::{debug, info};

use crate::block::Block;
use crate::config::ResetMode;
use crate::error::{LedgerError, LedgerResult};
use crate::keys::{block_key, parse_block_key, TIP_KEY};
use crate::validation::{ChainValidator, ValidationReport};

pub(crate) async fn read_tip(store: &dyn KvStore) -> LedgerResult<Option<u64>> {
    let raw = match store.get(TIP_KEY).await {
        Ok(raw) => raw,
        Err(StoreError::NotFound(_)) => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let text = std::str::from_utf8(&raw).map_err(|e| LedgerError::CorruptTip(e.to_string()))?;
    text.trim()
        .parse::<u64>()
        .map(Some)
        .map_err(|e| LedgerError::CorruptTip(format!("{text:?}: {e}")))
}

async fn write_tip(store: &dyn KvStore, height: u64) -> LedgerResult<()> {
    store.put(TIP_KEY, height.to_string().into_bytes()).await?;
    Ok(())
}

/// Fetch the raw record at `height`, regardless of the tip.
async fn read_record(store: &dyn KvStore, height: u64) -> LedgerResult<Block> {
    match store.get(&block_key(height)).await {
        Ok(raw) => Block::from_json(&raw),
        Err(StoreError::NotFound(_)) => Err(LedgerError::BlockNotFound { height }),
        Err(e) => Err(e.into()),
    }
}

pub(crate) async fn write_record(store: &dyn KvStore, height: u64, block: &Block) -> LedgerResult<()> {
    store.put(&block_key(height), block.to_json()?).await?;
    Ok(())
}

/// Fetch the committed block at `height`; heights above the tip do not exist.
pub(crate) async fn read_block(store: &dyn KvStore, height: u64) -> LedgerResult<Block> {
    match read_tip(store).await? {
        Some(tip) if height <= tip => read_record(store, height).await,
        _ => Err(LedgerError::BlockNotFound { height }),
    }
}

/// Link `template`'s body onto the current tip and persist it.
///
/// The block is written before the tip pointer moves, so a failed write
/// leaves the tip where it was.
pub(crate) async fn append_block(store: &dyn KvStore, template: Block) -> LedgerResult<Block> {
    let tip = read_tip(store).await?;

    let mut block = Block::new(template.body);
    block.height = match tip {
        None => 0,
        Some(h) => h
            .checked_add(1)
            .ok_or_else(|| LedgerError::CorruptTip(format!("tip {h} has no successor")))?,
    };
    block.timestamp = Utc::now().timestamp();
    if let Some(h) = tip {
        block.previous_hash = read_record(store, h).await?.hash;
    }
    block.seal();

    write_record(store, block.height, &block).await?;
    write_tip(store, block.height).await?;

    debug!(height = block.height, hash = %block.hash, "block appended");
    Ok(block)
}

/// Attach storage and make sure a genesis block exists.
pub(crate) async fn initialize(store: &dyn KvStore, genesis_body: &str) -> LedgerResult<()> {
    store.open().await?;
    match read_tip(store).await? {
        Some(tip) => {
            debug!(tip, "ledger attached to existing chain");
        }
        None => {
            let genesis = append_block(store, Block::new(genesis_body)).await?;
            info!(hash = %genesis.hash, "genesis block created");
        }
    }
    Ok(())
}

pub(crate) async fn validate_chain(store: &dyn KvStore) -> LedgerResult<ValidationReport> {
    let tip = read_tip(store).await?;
    let mut blocks = Vec::new();
    if let Some(tip) = tip {
        for height in 0..=tip {
            match read_record(store, height).await {
                Ok(block) => blocks.push(Some(block)),
                Err(LedgerError::BlockNotFound { .. }) => blocks.push(None),
                Err(e) => return Err(e),
            }
        }
    }
    Ok(ChainValidator::validate(tip, &blocks))
}

/// Empty the ledger.
///
/// Deleting the tip pointer is the commit point: once it is gone the ledger
/// is empty, since no height is at or below a missing tip. `Purge` then
/// deletes block records by key alone, so unreadable records are removed
/// too. Records left behind by a failed purge are never served and are
/// overwritten by later appends.
pub(crate) async fn reset(store: &dyn KvStore, mode: ResetMode) -> LedgerResult<()> {
    store.delete(TIP_KEY).await?;
    let mut purged = 0usize;
    if mode == ResetMode::Purge {
        for key in store.keys().await? {
            if parse_block_key(&key).is_some() {
                store.delete(&key).await?;
                purged += 1;
            }
        }
    }
    info!(?mode, purged, "ledger reset");
    Ok(())
}

/// Every block record in storage, ordered by height.
pub(crate) async fn scan_blocks(store: &dyn KvStore) -> LedgerResult<Vec<Block>> {
    let mut blocks = Vec::new();
    for (key, raw) in store.scan().await? {
        if let Some(height) = parse_block_key(&key) {
            blocks.push((height, Block::from_json(&raw)?));
        }
    }
    blocks.sort_by_key(|(height, _)| *height);
    Ok(blocks.into_iter().map(|(_, block)| block).collect())
}
