//! # docmem CLI
//!
//! The `docmem` binary ingests a document into its own vector store and
//! queries it by similarity.
//!
//! ## Usage
//!
//! ```bash
//! docmem --config ./config/docmem.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `docmem ingest <file>` | Chunk, embed, and store a text document |
//! | `docmem query <doc> "<query>"` | Print the most similar chunks |
//! | `docmem prompt <doc> "<query>"` | Print the generator prompt built from those chunks |
//! | `docmem stats <doc>` | Show what a document's store holds |
//!
//! `<doc>` is the document's path or bare name: `resume.txt`,
//! `./docs/resume.txt`, and `resume` all address the same store.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use docmem::{config, ingest, query, stats};

/// docmem: semantic memory for a single document.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. A missing file means built-in defaults.
#[derive(Parser)]
#[command(
    name = "docmem",
    about = "docmem — chunk, embed, and query a single document by similarity",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/docmem.toml")]
    config: PathBuf,

    /// Log at debug level (overridden by `RUST_LOG`).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ingest a UTF-8 text document, replacing its previous store.
    Ingest {
        /// Path to the document.
        file: PathBuf,
    },

    /// Print the chunks most similar to a query.
    Query {
        /// Document path or name.
        document: String,

        /// Natural-language query.
        query: String,

        /// Number of chunks to return (default: `retrieval.top_k`).
        #[arg(long)]
        top_k: Option<usize>,

        /// Show similarity scores and chunk positions.
        #[arg(long)]
        scores: bool,
    },

    /// Print the prompt assembled from the most similar chunks.
    Prompt {
        /// Document path or name.
        document: String,

        /// Natural-language query.
        query: String,

        /// Number of chunks to include (default: `retrieval.top_k`).
        #[arg(long)]
        top_k: Option<usize>,
    },

    /// Show snapshot state, chunk count, and model for a document.
    Stats {
        /// Document path or name.
        document: String,
    },
}

fn init_tracing(verbose: bool) {
    let filter = if verbose { "docmem=debug" } else { "docmem=info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let cfg = config::load_config_or_default(&cli.config)?;

    match cli.command {
        Commands::Ingest { file } => {
            ingest::run_ingest(&cfg, &file).await?;
        }
        Commands::Query {
            document,
            query: q,
            top_k,
            scores,
        } => {
            query::run_query(&cfg, &document, &q, top_k, scores).await?;
        }
        Commands::Prompt {
            document,
            query: q,
            top_k,
        } => {
            query::run_prompt(&cfg, &document, &q, top_k).await?;
        }
        Commands::Stats { document } => {
            stats::run_stats(&cfg, &document).await?;
        }
    }

    Ok(())
}
