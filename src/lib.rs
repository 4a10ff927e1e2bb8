//! # docmem
//!
//! Semantic memory for a single document.
//!
//! docmem splits one text document into fixed-size chunks, embeds every
//! chunk, persists the chunk/embedding pairs as a JSON snapshot on disk,
//! and answers natural-language queries by returning the chunks whose
//! embeddings are most similar to the query's.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌─────────┐   ┌──────────────┐   ┌──────────────┐
//! │ Document │──▶│ Chunker │──▶│  Embedding   │──▶│ VectorStore  │
//! │  (text)  │   │         │   │   Provider   │   │ vectors.json │
//! └──────────┘   └─────────┘   └──────────────┘   └──────┬───────┘
//!                                                        │ top-K
//!                                                        ▼
//!                                ┌──────────┐     ┌────────────┐
//!                                │  Prompt  │◀────│ Retriever  │
//!                                └──────────┘     └────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! docmem ingest ./resume.txt
//! docmem query resume "Which languages does the candidate know?"
//! docmem prompt resume "Summarize the work history" --top-k 5
//! docmem stats resume
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`embedding`] | Embedding providers (OpenAI, Ollama, local fastembed) |
//! | [`snapshot`] | On-disk snapshot format and loading |
//! | [`store`] | Single-document vector store |
//! | [`retriever`] | Query-facing façade over the store |
//! | [`pipeline`] | Prompt assembly and output wrapping |
//! | [`ingest`] | `ingest` command |
//! | [`query`] | `query` and `prompt` commands |
//! | [`stats`] | `stats` command |
//!
//! Chunking, cosine similarity, and ranking live in the I/O-free
//! `docmem-core` crate and are re-exported here.

pub mod config;
pub mod embedding;
pub mod ingest;
pub mod pipeline;
pub mod query;
pub mod retriever;
pub mod snapshot;
pub mod stats;
pub mod store;

pub use docmem_core::chunk::{chunk_text, DEFAULT_CHUNK_SIZE};
pub use docmem_core::embedding::{cosine_similarity, EmbeddingProvider};
pub use docmem_core::models::{ScoredChunk, StoredChunk};
pub use docmem_core::search::{rank_top_k, DEFAULT_TOP_K};
pub use retriever::Retriever;
pub use snapshot::{LoadOutcome, Snapshot, SnapshotError, SnapshotMeta};
pub use store::{storage_dir_for, StoreOptions, StoreState, VectorStore};
