//! Index statistics.
//!
//! Loads the chunk file and prints what was indexed: source file identity,
//! chunk count, and per-facet value counts. Used by `ops stats` to confirm
//! the data file is where the config says and parses cleanly.

use anyhow::{anyhow, Result};

use ops_index_core::store::ChunkStore;

use crate::config::Config;
use crate::file_store::FileStore;

pub async fn run_stats(config: &Config) -> Result<()> {
    let store = FileStore::from_config(config);
    let index = store.load(false).await?;
    let status = store
        .status()?
        .ok_or_else(|| anyhow!("chunk index not loaded"))?;

    let facets = index.facets();
    let token_total: usize = index.chunks().iter().map(|c| c.tokens.len()).sum();

    println!("ops-index: Chunk Stats");
    println!("=======================");
    println!();
    println!("  File:        {}", status.path.display());
    println!(
        "  Modified:    {}",
        status.modified.format("%Y-%m-%dT%H:%M:%SZ")
    );
    println!("  SHA-256:     {}", status.sha256);
    println!();
    println!("  Chunks:      {}", status.chunk_count);
    println!("  Tokens:      {}", token_total);
    println!("  Subjects:    {}", facets.subjects.len());
    println!("  Grades:      {}", facets.grades.len());
    println!("  Types:       {}", facets.content_types.len());

    Ok(())
}
