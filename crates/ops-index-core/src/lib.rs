//! # ops-index core
//!
//! Shared, I/O-free logic for ops-index: data models, tokenization, the
//! in-memory chunk index with its facet lists, keyword scoring, LLM context
//! formatting, and the [`store::ChunkStore`] abstraction.
//!
//! This crate contains no tokio, filesystem, or network dependencies. The
//! file-backed, modification-time-cached store lives in the `ops-index`
//! crate.

pub mod chunk;
pub mod format;
pub mod models;
pub mod search;
pub mod store;
