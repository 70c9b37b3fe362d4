//! Storage abstraction for ops-index.
//!
//! A [`ChunkStore`] hands out immutable [`ChunkIndex`] snapshots. Callers
//! never see a collection while it is being rebuilt: implementations build
//! the new index first and then publish it in one step.
//!
//! Implementations must be `Send + Sync` so a single store can be shared by
//! concurrent request handlers.

pub mod memory;

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use crate::chunk::ChunkIndex;
use crate::models::{FacetIndex, ResultRecord};
use crate::search::{retrieve, RetrieveRequest};

/// Source of chunk index snapshots.
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`load`](ChunkStore::load) | Current snapshot, rebuilt when stale or forced |
/// | [`facets`](ChunkStore::facets) | Facet lists of the current snapshot |
/// | [`retrieve`](ChunkStore::retrieve) | Faceted keyword retrieval |
#[async_trait]
pub trait ChunkStore: Send + Sync {
    /// Return the current snapshot.
    ///
    /// With `force`, the snapshot is rebuilt from its source even when the
    /// source looks unchanged. Errors leave the previously published
    /// snapshot in place.
    async fn load(&self, force: bool) -> Result<Arc<ChunkIndex>>;

    /// Facet lists of the current snapshot.
    async fn facets(&self) -> Result<FacetIndex> {
        let index = self.load(false).await?;
        Ok(index.facets().clone())
    }

    /// Run a retrieval against the current snapshot.
    async fn retrieve(&self, req: &RetrieveRequest) -> Result<Vec<ResultRecord>> {
        let index = self.load(false).await?;
        Ok(retrieve(&index, req))
    }
}
