//! In-memory [`ChunkStore`] for tests and hosts without a filesystem.
//!
//! Holds one snapshot behind a `std::sync::RwLock`. Loading never touches
//! any source; [`InMemoryStore::replace`] swaps in a new snapshot.

use std::sync::{Arc, RwLock};

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use crate::chunk::ChunkIndex;
use crate::models::SourceRecord;

use super::ChunkStore;

/// In-memory store wrapping a fixed [`ChunkIndex`].
pub struct InMemoryStore {
    index: RwLock<Arc<ChunkIndex>>,
}

impl InMemoryStore {
    pub fn new(index: ChunkIndex) -> Self {
        Self {
            index: RwLock::new(Arc::new(index)),
        }
    }

    /// Build a store directly from decoded records.
    pub fn from_records(records: Vec<SourceRecord>, default_source: &str) -> Self {
        Self::new(ChunkIndex::from_records(records, default_source))
    }

    /// Publish a new snapshot. Snapshots already handed out stay valid.
    pub fn replace(&self, index: ChunkIndex) -> Result<()> {
        let mut guard = self
            .index
            .write()
            .map_err(|_| anyhow!("chunk index lock poisoned"))?;
        *guard = Arc::new(index);
        Ok(())
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new(ChunkIndex::default())
    }
}

#[async_trait]
impl ChunkStore for InMemoryStore {
    async fn load(&self, _force: bool) -> Result<Arc<ChunkIndex>> {
        let guard = self
            .index
            .read()
            .map_err(|_| anyhow!("chunk index lock poisoned"))?;
        Ok(Arc::clone(&guard))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replace_keeps_old_snapshots_valid() {
        let store = InMemoryStore::from_records(
            vec![SourceRecord {
                content: Some("vanha".to_string()),
                ..Default::default()
            }],
            "POPS_2014",
        );
        let old = Arc::clone(&store.index.read().unwrap());

        store
            .replace(ChunkIndex::from_records(Vec::new(), "POPS_2014"))
            .unwrap();

        assert_eq!(old.len(), 1);
        assert!(store.index.read().unwrap().is_empty());
    }
}
