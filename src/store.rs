//! Single-document vector store.
//!
//! [`VectorStore`] owns the paired chunk/embedding records for one
//! document, persists them as a [`Snapshot`] in its storage directory,
//! and answers top-K similarity queries.
//!
//! # Lifecycle
//!
//! | State | Reached by |
//! |-------|-----------|
//! | [`StoreState::Empty`] | [`VectorStore::open`] with no snapshot on disk |
//! | [`StoreState::Recovered`] | [`VectorStore::open`] with an unusable snapshot (treated as empty) |
//! | [`StoreState::Loaded`] | [`VectorStore::open`] with a valid snapshot |
//! | [`StoreState::Populated`] | a successful [`VectorStore::store_resume`] |
//!
//! The unit of mutation is "replace everything": `store_resume` re-chunks
//! and re-embeds the whole document and overwrites the snapshot. Either the
//! new snapshot is written and the records are swapped, or nothing changes.
//!
//! `store_resume` takes `&mut self` and queries take `&self`, so a single
//! instance can never run a query concurrently with a replace.

use anyhow::{bail, Context, Result};
use docmem_core::chunk::{chunk_text, DEFAULT_CHUNK_SIZE};
use docmem_core::embedding::EmbeddingProvider;
use docmem_core::models::{ScoredChunk, StoredChunk};
use docmem_core::search::rank_top_k;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::Config;
use crate::snapshot::{self, LoadOutcome, Snapshot, SnapshotError, SnapshotMeta};

/// Subdirectory of the storage root that holds per-document stores.
pub const VECTOR_DBS_DIR: &str = "vector_dbs";

/// Tuning knobs for a [`VectorStore`].
#[derive(Debug, Clone)]
pub struct StoreOptions {
    /// Chunk window size in characters.
    pub chunk_size: usize,
    /// Number of chunks sent to the provider per call.
    pub batch_size: usize,
    /// Reject snapshots written by a different embedding model.
    pub check_model: bool,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            batch_size: 64,
            check_model: true,
        }
    }
}

impl StoreOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            chunk_size: config.chunking.chunk_size,
            batch_size: config.embedding.batch_size,
            check_model: true,
        }
    }
}

/// Where the store's records came from.
#[derive(Debug)]
pub enum StoreState {
    /// Opened with no snapshot on disk.
    Empty,
    /// Opened over a snapshot that could not be used; no records.
    Recovered(SnapshotError),
    /// Opened over a valid snapshot.
    Loaded,
    /// Records were computed by [`VectorStore::store_resume`].
    Populated,
}

impl StoreState {
    pub fn label(&self) -> &'static str {
        match self {
            StoreState::Empty => "empty",
            StoreState::Recovered(_) => "recovered",
            StoreState::Loaded => "loaded",
            StoreState::Populated => "populated",
        }
    }
}

/// Semantic memory for one document.
pub struct VectorStore {
    dir: PathBuf,
    provider: Arc<dyn EmbeddingProvider>,
    options: StoreOptions,
    records: Vec<StoredChunk>,
    meta: Option<SnapshotMeta>,
    state: StoreState,
}

impl VectorStore {
    /// Open the store rooted at `dir`, loading its snapshot if one exists.
    ///
    /// An unreadable, undecodable, or incompatible snapshot never fails
    /// construction: the store starts empty in [`StoreState::Recovered`].
    ///
    /// # Errors
    ///
    /// Only if `dir` cannot be created.
    pub async fn open(
        dir: impl Into<PathBuf>,
        provider: Arc<dyn EmbeddingProvider>,
        options: StoreOptions,
    ) -> Result<Self> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("Failed to create storage directory: {}", dir.display()))?;

        let path = snapshot::snapshot_path(&dir);
        let mut outcome = Snapshot::load(&path).await;

        if options.check_model {
            if let LoadOutcome::Loaded(snap) = &outcome {
                if snap.meta.model != provider.model_name() {
                    outcome = LoadOutcome::Corrupt(SnapshotError::ModelMismatch {
                        expected: provider.model_name().to_string(),
                        found: snap.meta.model.clone(),
                    });
                }
            }
        }

        let (records, meta, state) = match outcome {
            LoadOutcome::Loaded(snap) => {
                let (meta, records) = snap.into_parts();
                tracing::debug!(path = %path.display(), chunks = records.len(), "loaded snapshot");
                (records, Some(meta), StoreState::Loaded)
            }
            LoadOutcome::Absent => {
                tracing::debug!(path = %path.display(), "no snapshot, starting empty");
                (Vec::new(), None, StoreState::Empty)
            }
            LoadOutcome::Corrupt(err) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %err,
                    "ignoring unusable snapshot, starting empty"
                );
                (Vec::new(), None, StoreState::Recovered(err))
            }
        };

        Ok(Self {
            dir,
            provider,
            options,
            records,
            meta,
            state,
        })
    }

    /// Replace the store's contents with the chunks of `text`.
    ///
    /// Blank text, or text that yields no chunks, is a no-op. Otherwise the
    /// text is chunked, every chunk is embedded, and the snapshot is
    /// overwritten. The in-memory records are swapped only after the
    /// snapshot write succeeds.
    ///
    /// # Errors
    ///
    /// If the provider fails, returns the wrong number of vectors or a
    /// non-finite component, or the snapshot cannot be written. Prior state
    /// is left intact in each case.
    pub async fn store_resume(&mut self, text: &str) -> Result<()> {
        if text.trim().is_empty() {
            tracing::debug!("blank text, keeping current store");
            return Ok(());
        }

        let chunks = chunk_text(text, self.options.chunk_size);
        tracing::debug!(chunks = chunks.len(), "chunked document");
        if chunks.is_empty() {
            tracing::debug!(
                chunk_size = self.options.chunk_size,
                "no chunks, keeping current store"
            );
            return Ok(());
        }

        let records = self.embed_chunks(chunks).await?;
        let meta = SnapshotMeta::new(
            self.provider.model_name(),
            self.provider.dims(),
            snapshot::source_hash(text),
        );

        let path = self.snapshot_path();
        Snapshot::from_records(meta.clone(), &records)
            .save(&path)
            .await
            .with_context(|| format!("Failed to write snapshot: {}", path.display()))?;

        tracing::info!(
            path = %path.display(),
            chunks = records.len(),
            model = %meta.model,
            "stored document"
        );

        self.records = records;
        self.meta = Some(meta);
        self.state = StoreState::Populated;
        Ok(())
    }

    async fn embed_chunks(&self, chunks: Vec<String>) -> Result<Vec<StoredChunk>> {
        let mut records = Vec::with_capacity(chunks.len());

        for batch in chunks.chunks(self.options.batch_size.max(1)) {
            let vectors = self.provider.embed_texts(batch).await.map_err(|e| {
                tracing::warn!(error = %e, "embedding batch failed");
                e
            })?;
            if vectors.len() != batch.len() {
                bail!(
                    "Embedding provider returned {} vectors for {} chunks",
                    vectors.len(),
                    batch.len()
                );
            }
            // JSON has no NaN or infinity, so such a vector could not be reloaded.
            if let Some(pos) = vectors
                .iter()
                .position(|v| v.iter().any(|x| !x.is_finite()))
            {
                bail!(
                    "Embedding provider returned a non-finite value for chunk {}",
                    records.len() + pos
                );
            }
            records.extend(
                batch
                    .iter()
                    .cloned()
                    .zip(vectors)
                    .map(|(text, embedding)| StoredChunk { text, embedding }),
            );
        }

        Ok(records)
    }

    /// Return the texts of the `top_k` chunks most similar to `query`.
    ///
    /// An empty store or `top_k == 0` returns an empty vector without
    /// calling the provider. Equal scores keep storage order.
    pub async fn get_top_chunks(&self, query: &str, top_k: usize) -> Result<Vec<String>> {
        Ok(self
            .get_top_scored(query, top_k)
            .await?
            .into_iter()
            .map(|c| c.text)
            .collect())
    }

    /// Like [`get_top_chunks`](Self::get_top_chunks), but keeps scores and indices.
    pub async fn get_top_scored(&self, query: &str, top_k: usize) -> Result<Vec<ScoredChunk>> {
        if self.records.is_empty() || top_k == 0 {
            return Ok(Vec::new());
        }

        let query_vec = self.provider.embed_query(query).await?;
        let ranked = rank_top_k(&query_vec, &self.records, top_k);
        tracing::debug!(
            candidates = self.records.len(),
            returned = ranked.len(),
            "ranked chunks"
        );
        Ok(ranked)
    }

    /// True iff the store holds at least one chunk/embedding pair.
    pub fn has_resume(&self) -> bool {
        !self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Chunk texts in storage order.
    pub fn chunks(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.text.as_str())
    }

    pub fn records(&self) -> &[StoredChunk] {
        &self.records
    }

    pub fn state(&self) -> &StoreState {
        &self.state
    }

    /// Metadata of the current snapshot, if the store has one.
    pub fn meta(&self) -> Option<&SnapshotMeta> {
        self.meta.as_ref()
    }

    /// Model of the configured provider, which new vectors will come from.
    pub fn model(&self) -> &str {
        self.provider.model_name()
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn snapshot_path(&self) -> PathBuf {
        snapshot::snapshot_path(&self.dir)
    }
}

/// Storage directory for a document: `<root>/vector_dbs/<stem>`.
///
/// The stem is the document's file name without extension, with every
/// character outside `[A-Za-z0-9._-]` replaced by `_`. Documents with no
/// usable stem share the `default` directory.
pub fn storage_dir_for(root: &Path, document: &Path) -> PathBuf {
    let stem = document
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let sanitized: String = stem
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let name = if sanitized.chars().all(|c| c == '.') {
        "default".to_string()
    } else {
        sanitized
    };

    root.join(VECTOR_DBS_DIR).join(name)
}
