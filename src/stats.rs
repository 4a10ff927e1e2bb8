//! Store statistics.
//!
//! Shows what a document's store holds without embedding anything: how the
//! snapshot loaded, how many chunks it has, and which model wrote it.

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;

use crate::config::Config;
use crate::embedding::DisabledProvider;
use crate::store::{storage_dir_for, StoreOptions, StoreState, VectorStore};

/// Run the stats command for `document`.
pub async fn run_stats(config: &Config, document: &str) -> Result<()> {
    let dir = storage_dir_for(&config.storage.root, Path::new(document));
    let options = StoreOptions {
        check_model: false,
        ..StoreOptions::from_config(config)
    };
    let store = VectorStore::open(&dir, Arc::new(DisabledProvider), options).await?;

    let snapshot_path = store.snapshot_path();
    let size = std::fs::metadata(&snapshot_path)
        .map(|m| m.len())
        .unwrap_or(0);

    println!("docmem store stats");
    println!("==================");
    println!();
    println!("  Directory:   {}", store.dir().display());
    println!("  Snapshot:    {}", snapshot_path.display());
    println!("  Size:        {}", format_bytes(size));
    println!("  State:       {}", store.state().label());
    if let StoreState::Recovered(err) = store.state() {
        println!("  Problem:     {}", err);
    }
    println!("  Chunks:      {}", store.len());

    if let Some(meta) = store.meta() {
        println!("  Model:       {}", meta.model);
        println!("  Dims:        {}", meta.dims);
        println!(
            "  Created:     {}",
            meta.created_at.format("%Y-%m-%d %H:%M:%S UTC")
        );
        println!("  Source hash: {}", meta.source_hash);
        if config.embedding.is_enabled() {
            if let Some(model) = config.embedding.model.as_deref() {
                if model != meta.model {
                    println!(
                        "  Warning:     configured model '{}' differs; re-ingest before querying",
                        model
                    );
                }
            }
        }
    }

    println!();
    Ok(())
}

/// Format a byte count as a human-readable string.
fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(1536), "1.5 KB");
        assert_eq!(format_bytes(3 * 1024 * 1024), "3.0 MB");
    }
}
