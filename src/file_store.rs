//! File-backed [`ChunkStore`] with modification-time caching.
//!
//! The curriculum JSON file is read lazily on first use. Every later
//! [`load`](ChunkStore::load) stats the file and compares its path and
//! modification time with the stamp recorded at the last successful load:
//! unchanged means the cached snapshot is returned as-is, anything else
//! rebuilds the whole index from a fresh read.
//!
//! # Concurrency
//!
//! A cache hit only takes the snapshot read lock. The rebuild sequence runs
//! under a `tokio::sync::Mutex` and re-checks the stamp once it holds it, so
//! two callers never rebuild at the same time. The new [`ChunkIndex`] is built
//! completely before it is published, and readers only ever clone an `Arc`
//! of a published snapshot.
//!
//! # Failures
//!
//! A missing file, unreadable file, or invalid JSON is returned as an error.
//! The previously published snapshot is kept and nothing is cached about the
//! failure, so the next call tries again.

use std::path::PathBuf;
use std::sync::{Arc, RwLock};
use std::time::SystemTime;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use tokio::sync::Mutex;

use ops_index_core::chunk::ChunkIndex;
use ops_index_core::store::ChunkStore;

use crate::config::Config;

/// Identity of the file a snapshot was built from.
#[derive(Debug, Clone, PartialEq, Eq)]
struct SourceStamp {
    path: PathBuf,
    modified: SystemTime,
}

/// A published snapshot plus what it was built from.
#[derive(Debug, Clone)]
struct Loaded {
    index: Arc<ChunkIndex>,
    stamp: SourceStamp,
    sha256: String,
    loaded_at: DateTime<Utc>,
}

/// Summary of the currently published snapshot.
#[derive(Debug, Clone)]
pub struct LoadStatus {
    pub path: PathBuf,
    pub modified: DateTime<Utc>,
    pub sha256: String,
    pub chunk_count: usize,
    pub loaded_at: DateTime<Utc>,
}

/// Chunk store backed by a JSON file on disk.
pub struct FileStore {
    path: PathBuf,
    default_source: String,
    current: RwLock<Option<Loaded>>,
    reload_lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>, default_source: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            default_source: default_source.into(),
            current: RwLock::new(None),
            reload_lock: Mutex::new(()),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.data.path, &config.data.default_source)
    }

    /// Status of the published snapshot, or `None` before the first load.
    pub fn status(&self) -> Result<Option<LoadStatus>> {
        let guard = self
            .current
            .read()
            .map_err(|_| anyhow!("chunk snapshot lock poisoned"))?;
        Ok(guard.as_ref().map(|l| LoadStatus {
            path: l.stamp.path.clone(),
            modified: DateTime::<Utc>::from(l.stamp.modified),
            sha256: l.sha256.clone(),
            chunk_count: l.index.len(),
            loaded_at: l.loaded_at,
        }))
    }

    fn published(&self) -> Result<Option<Loaded>> {
        let guard = self
            .current
            .read()
            .map_err(|_| anyhow!("chunk snapshot lock poisoned"))?;
        Ok(guard.clone())
    }

    /// The published index if it was built from `stamp`.
    fn cached(&self, stamp: &SourceStamp) -> Result<Option<Arc<ChunkIndex>>> {
        let hit = self
            .published()?
            .filter(|loaded| loaded.stamp == *stamp)
            .map(|loaded| loaded.index);
        if hit.is_some() {
            tracing::debug!(path = %self.path.display(), "chunk cache hit");
        }
        Ok(hit)
    }

    fn publish(&self, loaded: Loaded) -> Result<()> {
        let mut guard = self
            .current
            .write()
            .map_err(|_| anyhow!("chunk snapshot lock poisoned"))?;
        *guard = Some(loaded);
        Ok(())
    }

    async fn stamp(&self) -> Result<SourceStamp> {
        let meta = tokio::fs::metadata(&self.path)
            .await
            .with_context(|| format!("Chunk file not found: {}", self.path.display()))?;
        let modified = meta
            .modified()
            .with_context(|| format!("No modification time for {}", self.path.display()))?;
        Ok(SourceStamp {
            path: self.path.clone(),
            modified,
        })
    }

    async fn read_and_build(&self, stamp: SourceStamp) -> Result<Loaded> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .with_context(|| format!("Failed to read chunk file: {}", self.path.display()))?;

        let sha256 = format!("{:x}", Sha256::digest(&bytes));

        let json = std::str::from_utf8(&bytes)
            .with_context(|| format!("Chunk file is not UTF-8: {}", self.path.display()))?;
        let index = ChunkIndex::from_json_str(json, &self.default_source)
            .with_context(|| format!("Invalid chunk file: {}", self.path.display()))?;

        Ok(Loaded {
            index: Arc::new(index),
            stamp,
            sha256,
            loaded_at: Utc::now(),
        })
    }
}

#[async_trait]
impl ChunkStore for FileStore {
    async fn load(&self, force: bool) -> Result<Arc<ChunkIndex>> {
        if !force {
            let stamp = self.stamp().await?;
            if let Some(index) = self.cached(&stamp)? {
                return Ok(index);
            }
        }

        let _reload = self.reload_lock.lock().await;

        // another caller may have rebuilt while we waited
        let stamp = self.stamp().await?;
        if !force {
            if let Some(index) = self.cached(&stamp)? {
                return Ok(index);
            }
        }

        let loaded = match self.read_and_build(stamp).await {
            Ok(l) => l,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), "chunk load failed: {:#}", e);
                return Err(e);
            }
        };

        tracing::info!(
            path = %self.path.display(),
            chunks = loaded.index.len(),
            subjects = loaded.index.facets().subjects.len(),
            forced = force,
            "loaded chunk index"
        );

        let index = Arc::clone(&loaded.index);
        self.publish(loaded)?;
        Ok(index)
    }
}
