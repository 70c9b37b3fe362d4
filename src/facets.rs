//! `ops facets`: list the distinct subjects, grade contexts, and content types.

use anyhow::Result;

use ops_index_core::store::ChunkStore;

use crate::config::Config;
use crate::file_store::FileStore;

pub async fn run_facets(config: &Config, json: bool) -> Result<()> {
    let store = FileStore::from_config(config);
    let facets = store.facets().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&facets)?);
        return Ok(());
    }

    for (label, values) in [
        ("subjects", &facets.subjects),
        ("grades", &facets.grades),
        ("content_types", &facets.content_types),
    ] {
        println!("{} ({}):", label, values.len());
        for v in values {
            println!("  {}", v);
        }
    }

    Ok(())
}
