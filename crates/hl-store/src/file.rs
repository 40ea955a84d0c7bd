use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use crate::error::{StoreError, StoreResult};
use crate::traits::KvStore;

/// Extension of committed value files.
const VALUE_EXT: &str = "val";
/// Extension of in-flight writes, renamed into place on completion.
const TMP_EXT: &str = "tmp";
/// Size of the CRC32 header in front of every value.
const CRC_SIZE: usize = 4;

/// File-backed key-value store: one file per key under a root directory.
///
/// On-disk format of `<root>/<key>.val`:
/// ```text
/// [4 bytes: CRC32 of payload (little-endian u32)]
/// [N bytes: payload]
/// ```
///
/// Writes go to `<key>.tmp` first and are renamed over the value file, so a
/// crash mid-write leaves the previous value intact. Keys are restricted to
/// ASCII alphanumerics, `-` and `_`.
pub struct FileKvStore {
    root: PathBuf,
    sync_writes: bool,
    closed: AtomicBool,
}

impl FileKvStore {
    /// Create a store rooted at `root`. Nothing touches the disk until `open`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            sync_writes: false,
            closed: AtomicBool::new(false),
        }
    }

    /// `fsync` every value file before it is renamed into place.
    pub fn with_sync_writes(mut self, sync_writes: bool) -> Self {
        self.sync_writes = sync_writes;
        self
    }

    /// Root directory of the store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn ensure_open(&self) -> StoreResult<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(StoreError::Closed);
        }
        Ok(())
    }

    fn value_path(&self, key: &str) -> StoreResult<PathBuf> {
        validate_key(key)?;
        Ok(self.root.join(format!("{key}.{VALUE_EXT}")))
    }

    fn tmp_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.{TMP_EXT}"))
    }

    async fn read_value(&self, key: &str, path: &Path) -> StoreResult<Vec<u8>> {
        match fs::read(path).await {
            Ok(raw) => decode(key, raw),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(StoreError::NotFound(key.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Names of every `.val` file under the root, sorted. Contents are not read.
    async fn list_keys(&self) -> StoreResult<Vec<String>> {
        let mut keys = Vec::new();
        let mut dir = fs::read_dir(&self.root).await?;
        while let Some(entry) = dir.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(VALUE_EXT) {
                continue;
            }
            let Some(key) = path.file_stem().and_then(|s| s.to_str()) else {
                warn!(path = %path.display(), "skipping value file with non-UTF-8 name");
                continue;
            };
            if validate_key(key).is_err() {
                warn!(path = %path.display(), "skipping value file with invalid key");
                continue;
            }
            keys.push(key.to_string());
        }
        keys.sort();
        Ok(keys)
    }
}

#[async_trait]
impl KvStore for FileKvStore {
    async fn open(&self) -> StoreResult<()> {
        fs::create_dir_all(&self.root).await?;
        self.closed.store(false, Ordering::Release);
        debug!(root = %self.root.display(), "file store opened");
        Ok(())
    }

    async fn get(&self, key: &str) -> StoreResult<Vec<u8>> {
        self.ensure_open()?;
        let path = self.value_path(key)?;
        self.read_value(key, &path).await
    }

    async fn put(&self, key: &str, value: Vec<u8>) -> StoreResult<()> {
        self.ensure_open()?;
        let path = self.value_path(key)?;
        let tmp = self.tmp_path(key);

        let mut file = fs::File::create(&tmp).await?;
        file.write_all(&crc32fast::hash(&value).to_le_bytes()).await?;
        file.write_all(&value).await?;
        file.flush().await?;
        if self.sync_writes {
            file.sync_all().await?;
        }
        drop(file);

        fs::rename(&tmp, &path).await?;
        debug!(key, len = value.len(), "file store put");
        Ok(())
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        self.ensure_open()?;
        let path = self.value_path(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn keys(&self) -> StoreResult<Vec<String>> {
        self.ensure_open()?;
        self.list_keys().await
    }

    async fn scan(&self) -> StoreResult<Vec<(String, Vec<u8>)>> {
        self.ensure_open()?;
        let mut entries = Vec::new();
        for key in self.list_keys().await? {
            let path = self.value_path(&key)?;
            let value = self.read_value(&key, &path).await?;
            entries.push((key, value));
        }
        Ok(entries)
    }

    async fn close(&self) -> StoreResult<()> {
        self.closed.store(true, Ordering::Release);
        debug!(root = %self.root.display(), "file store closed");
        Ok(())
    }
}

impl std::fmt::Debug for FileKvStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileKvStore")
            .field("root", &self.root)
            .field("sync_writes", &self.sync_writes)
            .finish()
    }
}

fn validate_key(key: &str) -> StoreResult<()> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidKey(key.to_string()))
    }
}

fn decode(key: &str, mut raw: Vec<u8>) -> StoreResult<Vec<u8>> {
    if raw.len() < CRC_SIZE {
        return Err(StoreError::Corrupt {
            key: key.to_string(),
            reason: format!("value file is {} bytes, shorter than its header", raw.len()),
        });
    }
    let expected = u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]);
    let payload = raw.split_off(CRC_SIZE);
    let actual = crc32fast::hash(&payload);
    if actual != expected {
        return Err(StoreError::Corrupt {
            key: key.to_string(),
            reason: format!("CRC mismatch: expected {expected:#010x}, got {actual:#010x}"),
        });
    }
    Ok(payload)
}
