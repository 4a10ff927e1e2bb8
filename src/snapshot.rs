//! On-disk snapshot of a store's chunk/embedding records.
//!
//! A snapshot is a single JSON file (`vectors.json`) inside the store's
//! storage directory. It holds the two parallel sequences `texts` and
//! `embeddings` together with the metadata needed to decide whether the
//! vectors are still usable.
//!
//! Writes go to `vectors.json.tmp` first and are renamed into place, so a
//! crash mid-write never leaves a half-written snapshot behind.
//!
//! Loading never fails: [`Snapshot::load`] returns a [`LoadOutcome`] that
//! tells the caller whether a snapshot was loaded, absent, or rejected.

use chrono::{DateTime, Utc};
use docmem_core::models::StoredChunk;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const SNAPSHOT_FILE_NAME: &str = "vectors.json";
pub const SNAPSHOT_SCHEMA_VERSION: u32 = 1;

/// Why a snapshot could not be used.
#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Unsupported snapshot schema_version {found} (expected {expected})")]
    SchemaVersion { found: u32, expected: u32 },

    #[error("Snapshot has {texts} texts but {embeddings} embeddings")]
    LengthMismatch { texts: usize, embeddings: usize },

    #[error("Snapshot was embedded with model '{found}', store is configured for '{expected}'")]
    ModelMismatch { expected: String, found: String },
}

/// Result of reading a snapshot from disk.
#[derive(Debug)]
pub enum LoadOutcome {
    /// A valid snapshot was read.
    Loaded(Snapshot),
    /// No snapshot file exists at the location.
    Absent,
    /// A file exists but cannot be used. Callers treat this as [`LoadOutcome::Absent`].
    Corrupt(SnapshotError),
}

impl LoadOutcome {
    pub fn is_loaded(&self) -> bool {
        matches!(self, LoadOutcome::Loaded(_))
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, LoadOutcome::Absent)
    }

    pub fn is_corrupt(&self) -> bool {
        matches!(self, LoadOutcome::Corrupt(_))
    }

    /// Short label for display (`loaded`, `absent`, `corrupt`).
    pub fn label(&self) -> &'static str {
        match self {
            LoadOutcome::Loaded(_) => "loaded",
            LoadOutcome::Absent => "absent",
            LoadOutcome::Corrupt(_) => "corrupt",
        }
    }
}

/// Descriptive fields stored alongside the vectors.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SnapshotMeta {
    /// Embedding model that produced the vectors.
    pub model: String,
    /// Dimensionality reported by the provider at write time.
    pub dims: usize,
    /// SHA-256 of the source text.
    pub source_hash: String,
    pub created_at: DateTime<Utc>,
}

impl SnapshotMeta {
    pub fn new(model: &str, dims: usize, source_hash: String) -> Self {
        Self {
            model: model.to_string(),
            dims,
            source_hash,
            created_at: Utc::now(),
        }
    }
}

/// Serialized form of a store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Snapshot {
    pub schema_version: u32,
    #[serde(flatten)]
    pub meta: SnapshotMeta,
    pub texts: Vec<String>,
    pub embeddings: Vec<Vec<f32>>,
}

impl Snapshot {
    /// Build a snapshot from paired records.
    pub fn from_records(meta: SnapshotMeta, records: &[StoredChunk]) -> Self {
        let (texts, embeddings): (Vec<String>, Vec<Vec<f32>>) = records
            .iter()
            .map(|r| (r.text.clone(), r.embedding.clone()))
            .unzip();
        Self {
            schema_version: SNAPSHOT_SCHEMA_VERSION,
            meta,
            texts,
            embeddings,
        }
    }

    /// Split into metadata and paired records.
    pub fn into_parts(self) -> (SnapshotMeta, Vec<StoredChunk>) {
        let records = self
            .texts
            .into_iter()
            .zip(self.embeddings)
            .map(|(text, embedding)| StoredChunk { text, embedding })
            .collect();
        (self.meta, records)
    }

    pub fn len(&self) -> usize {
        self.texts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }

    /// Read the snapshot at `path`.
    ///
    /// A missing file is [`LoadOutcome::Absent`]. Any read or decode
    /// failure, an unknown schema version, or texts/embeddings of unequal
    /// length is [`LoadOutcome::Corrupt`].
    pub async fn load(path: &Path) -> LoadOutcome {
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return LoadOutcome::Absent,
            Err(e) => return LoadOutcome::Corrupt(e.into()),
        };
        match Self::decode(&bytes) {
            Ok(snapshot) => LoadOutcome::Loaded(snapshot),
            Err(e) => LoadOutcome::Corrupt(e),
        }
    }

    fn decode(bytes: &[u8]) -> Result<Self, SnapshotError> {
        let snapshot: Snapshot = serde_json::from_slice(bytes)?;
        if snapshot.schema_version != SNAPSHOT_SCHEMA_VERSION {
            return Err(SnapshotError::SchemaVersion {
                found: snapshot.schema_version,
                expected: SNAPSHOT_SCHEMA_VERSION,
            });
        }
        if snapshot.texts.len() != snapshot.embeddings.len() {
            return Err(SnapshotError::LengthMismatch {
                texts: snapshot.texts.len(),
                embeddings: snapshot.embeddings.len(),
            });
        }
        Ok(snapshot)
    }

    /// Write the snapshot to `path`, replacing any existing file.
    pub async fn save(&self, path: &Path) -> Result<(), SnapshotError> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let bytes = serde_json::to_vec(self)?;
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, path).await?;
        Ok(())
    }
}

/// Snapshot file location inside a storage directory.
pub fn snapshot_path(dir: &Path) -> PathBuf {
    dir.join(SNAPSHOT_FILE_NAME)
}

/// SHA-256 hex digest of a document's text.
pub fn source_hash(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}
