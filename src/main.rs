//! # ops CLI
//!
//! Command-line front end for ops-index: inspect the curriculum chunk file,
//! run faceted keyword searches, render LLM context, and start the HTTP
//! server.
//!
//! ## Usage
//!
//! ```bash
//! ops --config ./config/ops.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `ops facets` | List subjects, grade contexts, and content types |
//! | `ops search "<query>"` | Ranked keyword retrieval |
//! | `ops context "<query>"` | Retrieval rendered as LLM context or a full prompt |
//! | `ops stats` | Load the chunk file and print a summary |
//! | `ops serve` | Start the HTTP server |

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::Level;

use ops_index::search::Filters;
use ops_index::{config, context, facets, search, server, stats};

/// ops: faceted keyword retrieval over curriculum text chunks.
#[derive(Parser)]
#[command(
    name = "ops",
    about = "ops: faceted keyword retrieval over curriculum text chunks",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/ops.toml")]
    config: PathBuf,

    /// Log debug output to stderr.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Facet filters; each flag may be repeated.
#[derive(Args, Debug, Default)]
struct FilterArgs {
    /// Only chunks with this subject (case-insensitive).
    #[arg(long = "subject")]
    subjects: Vec<String>,

    /// Only chunks with this grade context (case-insensitive).
    #[arg(long = "grade")]
    grades: Vec<String>,

    /// Only chunks with this content type (case-insensitive).
    #[arg(long = "ctype")]
    content_types: Vec<String>,
}

impl From<FilterArgs> for Filters {
    fn from(args: FilterArgs) -> Self {
        Filters {
            subjects: args.subjects,
            grades: args.grades,
            content_types: args.content_types,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List the distinct subjects, grade contexts, and content types.
    Facets {
        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Search chunks by keyword.
    ///
    /// An empty query lists the shortest chunks matching the filters.
    Search {
        /// The search query string.
        query: String,

        /// Maximum number of results to return.
        #[arg(long)]
        limit: Option<usize>,

        /// Only return results scoring strictly above this value.
        #[arg(long, allow_negative_numbers = true)]
        min_score: Option<f64>,

        #[command(flatten)]
        filters: FilterArgs,

        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Render retrieved chunks as LLM context.
    Context {
        /// The search query string.
        query: String,

        /// Maximum number of chunks to include.
        #[arg(long)]
        limit: Option<usize>,

        #[command(flatten)]
        filters: FilterArgs,

        /// Wrap the context in the assistant prompt for this request.
        #[arg(long)]
        question: Option<String>,

        /// Prompt length cap in characters (defaults to `[context].max_chars`).
        #[arg(long)]
        max_chars: Option<usize>,
    },

    /// Load the chunk file and print a summary.
    Stats,

    /// Start the HTTP server on `[server].bind`.
    Serve,
}

fn init_logging(verbose: bool, serving: bool) {
    let level = if verbose {
        Level::DEBUG
    } else if serving {
        Level::INFO
    } else {
        Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, matches!(cli.command, Commands::Serve));

    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Facets { json } => {
            facets::run_facets(&cfg, json).await?;
        }
        Commands::Search {
            query,
            limit,
            min_score,
            filters,
            json,
        } => {
            search::run_search(&cfg, &query, limit, filters.into(), min_score, json).await?;
        }
        Commands::Context {
            query,
            limit,
            filters,
            question,
            max_chars,
        } => {
            context::run_context(
                &cfg,
                &query,
                limit,
                filters.into(),
                question.as_deref(),
                max_chars,
            )
            .await?;
        }
        Commands::Stats => {
            stats::run_stats(&cfg).await?;
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
    }

    Ok(())
}
