//! `query` and `prompt` commands.

use anyhow::Result;
use std::path::Path;

use crate::config::Config;
use crate::embedding;
use crate::pipeline;
use crate::retriever::Retriever;
use crate::store::{storage_dir_for, StoreOptions, VectorStore};

async fn open_store(config: &Config, document: &str) -> Result<VectorStore> {
    let dir = storage_dir_for(&config.storage.root, Path::new(document));
    let provider = embedding::create_provider(&config.embedding)?;
    VectorStore::open(dir, provider, StoreOptions::from_config(config)).await
}

/// Print the chunks of `document` most similar to `query`.
pub async fn run_query(
    config: &Config,
    document: &str,
    query: &str,
    top_k: Option<usize>,
    show_scores: bool,
) -> Result<()> {
    let store = open_store(config, document).await?;
    let top_k = top_k.unwrap_or(config.retrieval.top_k);

    if !store.has_resume() {
        println!("No results.");
        return Ok(());
    }

    if show_scores {
        let scored = store.get_top_scored(query, top_k).await?;
        if scored.is_empty() {
            println!("No results.");
            return Ok(());
        }
        for (rank, chunk) in scored.iter().enumerate() {
            println!(
                "{}. [{:.4}] chunk #{}",
                rank + 1,
                chunk.score,
                chunk.index
            );
            println!("{}", pipeline::wrap(&chunk.text, pipeline::DEFAULT_WRAP_WIDTH));
            println!();
        }
    } else {
        let chunks = Retriever::new(&store).retrieve(query, top_k).await?;
        if chunks.is_empty() {
            println!("No results.");
            return Ok(());
        }
        for (rank, text) in chunks.iter().enumerate() {
            println!("{}.", rank + 1);
            println!("{}", pipeline::wrap(text, pipeline::DEFAULT_WRAP_WIDTH));
            println!();
        }
    }

    Ok(())
}

/// Print the generator prompt assembled from `document` for `query`.
pub async fn run_prompt(
    config: &Config,
    document: &str,
    query: &str,
    top_k: Option<usize>,
) -> Result<()> {
    let store = open_store(config, document).await?;
    let top_k = top_k.unwrap_or(config.retrieval.top_k);
    let prompt = pipeline::prompt_for(&Retriever::new(&store), query, top_k).await?;
    println!("{}", prompt);
    Ok(())
}
