//! `ops context`: render retrieved chunks as LLM prompt context.
//!
//! Without `--question` this prints the numbered context block only. With a
//! question it prints the full assistant prompt, capped at
//! `[context].max_chars` (or `--max-chars`).

use anyhow::Result;

use ops_index_core::format::{compose_prompt, format_for_llm};
use ops_index_core::store::ChunkStore;

use crate::config::Config;
use crate::file_store::FileStore;
use crate::search::{build_request, Filters};

pub async fn run_context(
    config: &Config,
    query: &str,
    limit: Option<usize>,
    filters: Filters,
    question: Option<&str>,
    max_chars: Option<usize>,
) -> Result<()> {
    let store = FileStore::from_config(config);
    let req = build_request(config, query, limit, filters, None);
    let results = store.retrieve(&req).await?;
    let block = format_for_llm(&results);

    match question {
        Some(q) => {
            let cap = max_chars.unwrap_or(config.context.max_chars);
            println!("{}", compose_prompt(q, &block, cap));
        }
        None => println!("{}", block),
    }

    Ok(())
}
