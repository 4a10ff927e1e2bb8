//! End-to-end store behaviour against a deterministic keyword embedder.

use anyhow::{bail, Result};
use async_trait::async_trait;
use docmem::pipeline;
use docmem::{
    EmbeddingProvider, Retriever, SnapshotError, StoreOptions, StoreState, VectorStore,
};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

const KEYWORDS: [&str; 6] = ["rust", "python", "database", "memory", "network", "music"];

fn keyword_embedding(text: &str) -> Vec<f32> {
    let lower = text.to_lowercase();
    KEYWORDS
        .iter()
        .map(|kw| if lower.contains(kw) { 1.0 } else { 0.0 })
        .collect()
}

struct MockEmbedder {
    calls: AtomicUsize,
}

impl MockEmbedder {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl EmbeddingProvider for MockEmbedder {
    fn model_name(&self) -> &str {
        "mock-model"
    }

    fn dims(&self) -> usize {
        KEYWORDS.len()
    }

    async fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(texts.iter().map(|t| keyword_embedding(t)).collect())
    }
}

/// Same model name as [`MockEmbedder`], but every call fails.
struct FailingEmbedder;

#[async_trait]
impl EmbeddingProvider for FailingEmbedder {
    fn model_name(&self) -> &str {
        "mock-model"
    }

    fn dims(&self) -> usize {
        KEYWORDS.len()
    }

    async fn embed_texts(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
        bail!("embedding service unavailable")
    }
}

/// Keyword embeddings, except that any text mentioning python gets a NaN.
struct NanEmbedder;

#[async_trait]
impl EmbeddingProvider for NanEmbedder {
    fn model_name(&self) -> &str {
        "mock-model"
    }

    fn dims(&self) -> usize {
        KEYWORDS.len()
    }

    async fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts
            .iter()
            .map(|t| {
                let mut v = keyword_embedding(t);
                if t.contains("python") {
                    v[0] = f32::NAN;
                }
                v
            })
            .collect())
    }
}

/// 2500 characters: a 1000-char "rust" window, a 1000-char "python" window,
/// and a 500-char "database" tail.
fn three_topic_document() -> String {
    let mut doc = String::new();
    doc.push_str("rust ");
    doc.push_str(&"x".repeat(995));
    doc.push_str("python ");
    doc.push_str(&"y".repeat(993));
    doc.push_str("database ");
    doc.push_str(&"z".repeat(491));
    assert_eq!(doc.chars().count(), 2500);
    doc
}

async fn open(dir: &Path, provider: Arc<dyn EmbeddingProvider>) -> VectorStore {
    VectorStore::open(dir, provider, StoreOptions::default())
        .await
        .unwrap()
}

#[tokio::test]
async fn test_three_windows_and_best_match() {
    let tmp = TempDir::new().unwrap();
    let mut store = open(tmp.path(), MockEmbedder::new()).await;
    store.store_resume(&three_topic_document()).await.unwrap();

    let lengths: Vec<usize> = store.chunks().map(|c| c.chars().count()).collect();
    assert_eq!(lengths, vec![1000, 1000, 500]);

    let top = store.get_top_chunks("Tell me about Python", 1).await.unwrap();
    assert_eq!(top.len(), 1);
    assert!(top[0].starts_with("python "));
}

#[tokio::test]
async fn test_snapshot_survives_reopen() {
    let tmp = TempDir::new().unwrap();
    let expected = {
        let mut store = open(tmp.path(), MockEmbedder::new()).await;
        store.store_resume(&three_topic_document()).await.unwrap();
        store.get_top_chunks("database", 3).await.unwrap()
    };

    let reopened = open(tmp.path(), MockEmbedder::new()).await;
    assert!(matches!(reopened.state(), StoreState::Loaded));
    assert!(reopened.has_resume());
    assert_eq!(reopened.len(), 3);
    assert_eq!(reopened.get_top_chunks("database", 3).await.unwrap(), expected);
    assert_eq!(reopened.meta().unwrap().model, "mock-model");
}

#[tokio::test]
async fn test_snapshot_keeps_texts_and_embeddings_paired() {
    let tmp = TempDir::new().unwrap();
    let mut store = open(tmp.path(), MockEmbedder::new()).await;
    store.store_resume(&three_topic_document()).await.unwrap();

    let raw: serde_json::Value =
        serde_json::from_slice(&std::fs::read(store.snapshot_path()).unwrap()).unwrap();
    let texts = raw["texts"].as_array().unwrap();
    let embeddings = raw["embeddings"].as_array().unwrap();
    assert_eq!(texts.len(), 3);
    assert_eq!(embeddings.len(), 3);
    for (text, embedding) in texts.iter().zip(embeddings) {
        let expected = keyword_embedding(text.as_str().unwrap());
        let stored: Vec<f32> = embedding
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_f64().unwrap() as f32)
            .collect();
        assert_eq!(stored, expected);
    }
}

#[tokio::test]
async fn test_corrupt_snapshot_recovers_empty() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join("vectors.json"), b"\x80\x04garbage").unwrap();

    let embedder = MockEmbedder::new();
    let mut store = open(tmp.path(), embedder.clone()).await;
    assert!(matches!(
        store.state(),
        StoreState::Recovered(SnapshotError::Decode(_))
    ));
    assert!(!store.has_resume());
    assert!(store.get_top_chunks("rust", 3).await.unwrap().is_empty());
    assert_eq!(embedder.calls.load(Ordering::SeqCst), 0);

    store.store_resume("rust and memory").await.unwrap();
    let reopened = open(tmp.path(), MockEmbedder::new()).await;
    assert_eq!(reopened.chunks().collect::<Vec<_>>(), vec!["rust and memory"]);
}

#[tokio::test]
async fn test_store_replaces_previous_document() {
    let tmp = TempDir::new().unwrap();
    let mut store = open(tmp.path(), MockEmbedder::new()).await;
    store.store_resume(&three_topic_document()).await.unwrap();
    store.store_resume("network music").await.unwrap();

    assert_eq!(store.chunks().collect::<Vec<_>>(), vec!["network music"]);

    let reopened = open(tmp.path(), MockEmbedder::new()).await;
    assert_eq!(reopened.len(), 1);
    assert_eq!(
        reopened.get_top_chunks("rust", 5).await.unwrap(),
        vec!["network music"]
    );
}

#[tokio::test]
async fn test_failed_embedding_keeps_prior_state() {
    let tmp = TempDir::new().unwrap();
    {
        let mut store = open(tmp.path(), MockEmbedder::new()).await;
        store.store_resume("rust memory").await.unwrap();
    }
    let before = std::fs::read(tmp.path().join("vectors.json")).unwrap();

    let mut store = open(tmp.path(), Arc::new(FailingEmbedder)).await;
    let err = store.store_resume("python network").await.unwrap_err();
    assert!(err.to_string().contains("unavailable"));

    assert_eq!(store.chunks().collect::<Vec<_>>(), vec!["rust memory"]);
    assert_eq!(std::fs::read(tmp.path().join("vectors.json")).unwrap(), before);
}

#[tokio::test]
async fn test_non_finite_embedding_keeps_prior_state() {
    let tmp = TempDir::new().unwrap();
    {
        let mut store = open(tmp.path(), MockEmbedder::new()).await;
        store.store_resume("rust memory").await.unwrap();
    }
    let before = std::fs::read(tmp.path().join("vectors.json")).unwrap();

    let mut store = open(tmp.path(), Arc::new(NanEmbedder)).await;
    let err = store
        .store_resume(&three_topic_document())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("non-finite value for chunk 1"));
    assert_eq!(store.chunks().collect::<Vec<_>>(), vec!["rust memory"]);
    assert_eq!(std::fs::read(tmp.path().join("vectors.json")).unwrap(), before);

    let reopened = open(tmp.path(), MockEmbedder::new()).await;
    assert!(matches!(reopened.state(), StoreState::Loaded));
    assert_eq!(reopened.len(), 1);
}

#[tokio::test]
async fn test_top_k_is_bounded_by_store_size() {
    let tmp = TempDir::new().unwrap();
    let mut store = open(tmp.path(), MockEmbedder::new()).await;
    store.store_resume(&three_topic_document()).await.unwrap();

    assert_eq!(store.get_top_chunks("rust", 10).await.unwrap().len(), 3);
    assert_eq!(store.get_top_chunks("rust", 2).await.unwrap().len(), 2);
    assert!(store.get_top_chunks("rust", 0).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_chunk_text_finds_itself() {
    let tmp = TempDir::new().unwrap();
    let mut store = open(tmp.path(), MockEmbedder::new()).await;
    store.store_resume(&three_topic_document()).await.unwrap();

    let chunks: Vec<String> = store.chunks().map(String::from).collect();
    for chunk in &chunks {
        let top = store.get_top_chunks(chunk, 1).await.unwrap();
        assert_eq!(&top[0], chunk);
    }
}

#[tokio::test]
async fn test_unrelated_query_keeps_storage_order() {
    let tmp = TempDir::new().unwrap();
    let mut store = open(tmp.path(), MockEmbedder::new()).await;
    store.store_resume(&three_topic_document()).await.unwrap();

    let scored = store.get_top_scored("cooking", 3).await.unwrap();
    assert!(scored.iter().all(|c| c.score == 0.0));
    assert_eq!(
        scored.iter().map(|c| c.index).collect::<Vec<_>>(),
        vec![0, 1, 2]
    );
}

#[tokio::test]
async fn test_retriever_and_prompt() {
    let tmp = TempDir::new().unwrap();
    let mut store = open(tmp.path(), MockEmbedder::new()).await;
    store
        .store_resume(&three_topic_document())
        .await
        .unwrap();

    let retriever = Retriever::new(&store);
    let chunks = retriever.retrieve_default("database").await.unwrap();
    assert_eq!(chunks.len(), 3);
    assert!(chunks[0].starts_with("database "));

    let prompt = pipeline::prompt_for(&retriever, "database", 1).await.unwrap();
    assert!(prompt.starts_with("database\n\nRelevant document fragments:\ndatabase "));
    assert!(prompt.ends_with("\n\nAnswer concisely."));
}
