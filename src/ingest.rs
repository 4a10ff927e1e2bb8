//! Document ingestion.
//!
//! Reads a text file, derives its storage directory from the file name,
//! and replaces that store's contents: chunk → embed → snapshot.

use anyhow::{Context, Result};
use std::path::Path;

use crate::config::Config;
use crate::embedding;
use crate::store::{storage_dir_for, StoreOptions, VectorStore};

/// Run the ingest command for `file`.
///
/// A blank file leaves any existing store untouched.
pub async fn run_ingest(config: &Config, file: &Path) -> Result<()> {
    let text = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("Failed to read document: {}", file.display()))?;

    let dir = storage_dir_for(&config.storage.root, file);

    if text.trim().is_empty() {
        println!("ingest {}", file.display());
        println!("  document is blank, nothing stored");
        return Ok(());
    }

    let provider = embedding::create_provider(&config.embedding)?;
    let mut store = VectorStore::open(&dir, provider, StoreOptions::from_config(config)).await?;
    let previous = store.len();

    store.store_resume(&text).await?;

    println!("ingest {}", file.display());
    println!("  model: {}", store.model());
    println!("  chunks written: {}", store.len());
    if previous > 0 {
        println!("  chunks replaced: {}", previous);
    }
    println!("  snapshot: {}", store.snapshot_path().display());
    println!("ok");
    Ok(())
}
