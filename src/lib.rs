//! # ops-index
//!
//! Faceted keyword retrieval over curriculum ("OPS") text chunks, used to
//! ground LLM prompts in the relevant parts of the curriculum.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//! │  chunks.json │──▶│  FileStore   │──▶│  ChunkIndex  │
//! │  (records)   │   │ mtime cache  │   │ TF + facets  │
//! └──────────────┘   └──────┬───────┘   └──────────────┘
//!                           │
//!                 ┌─────────┴─────────┐
//!                 ▼                   ▼
//!            ┌──────────┐       ┌──────────┐
//!            │   CLI    │       │   HTTP   │
//!            │  (ops)   │       │  (axum)  │
//!            └──────────┘       └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! ops stats                                  # load and summarize
//! ops facets                                 # list subjects, grades, types
//! ops search "kertotaulu" --subject Matematiikka
//! ops context "kertotaulu" --question "Tee harjoitus"
//! ops serve                                  # start HTTP server
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`file_store`] | Modification-time cached chunk file loader |
//! | [`search`] | `ops search` and shared request building |
//! | [`facets`] | `ops facets` |
//! | [`context`] | `ops context` |
//! | [`stats`] | `ops stats` |
//! | [`server`] | HTTP server |

pub mod config;
pub mod context;
pub mod facets;
pub mod file_store;
pub mod search;
pub mod server;
pub mod stats;
