//! Query-facing view over a [`VectorStore`].
//!
//! The retriever hands back chunk texts only; scores stay inside the store.

use anyhow::Result;
use docmem_core::search::DEFAULT_TOP_K;

use crate::store::VectorStore;

/// Borrows a store and answers queries against it.
pub struct Retriever<'a> {
    store: &'a VectorStore,
}

impl<'a> Retriever<'a> {
    pub fn new(store: &'a VectorStore) -> Self {
        Self { store }
    }

    /// The `top_k` most similar chunk texts, best first.
    pub async fn retrieve(&self, query: &str, top_k: usize) -> Result<Vec<String>> {
        self.store.get_top_chunks(query, top_k).await
    }

    /// [`retrieve`](Self::retrieve) with [`DEFAULT_TOP_K`].
    pub async fn retrieve_default(&self, query: &str) -> Result<Vec<String>> {
        self.retrieve(query, DEFAULT_TOP_K).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreOptions;
    use async_trait::async_trait;
    use docmem_core::embedding::EmbeddingProvider;
    use std::sync::Arc;
    use tempfile::TempDir;

    /// Scores each text by its length, so longer chunks point further along one axis.
    struct LengthEmbedder;

    #[async_trait]
    impl EmbeddingProvider for LengthEmbedder {
        fn model_name(&self) -> &str {
            "length"
        }
        fn dims(&self) -> usize {
            2
        }
        async fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(texts
                .iter()
                .map(|t| vec![1.0, t.chars().count() as f32])
                .collect())
        }
    }

    async fn store_with(text: &str, tmp: &TempDir) -> VectorStore {
        let mut store = VectorStore::open(
            tmp.path(),
            Arc::new(LengthEmbedder),
            StoreOptions {
                chunk_size: 2,
                batch_size: 8,
                check_model: true,
            },
        )
        .await
        .unwrap();
        store.store_resume(text).await.unwrap();
        store
    }

    #[tokio::test]
    async fn test_retrieve_matches_store() {
        let tmp = TempDir::new().unwrap();
        let store = store_with("aabbccd", &tmp).await;
        let retriever = Retriever::new(&store);

        let via_retriever = retriever.retrieve("zz", 2).await.unwrap();
        let via_store = store.get_top_chunks("zz", 2).await.unwrap();
        assert_eq!(via_retriever, via_store);
        assert_eq!(via_retriever, vec!["aa", "bb"]);
    }

    #[tokio::test]
    async fn test_retrieve_default_uses_three() {
        let tmp = TempDir::new().unwrap();
        let store = store_with("aabbccddee", &tmp).await;
        let retriever = Retriever::new(&store);
        assert_eq!(retriever.retrieve_default("q").await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_retrieve_on_empty_store() {
        let tmp = TempDir::new().unwrap();
        let store = VectorStore::open(tmp.path(), Arc::new(LengthEmbedder), StoreOptions::default())
            .await
            .unwrap();
        assert!(Retriever::new(&store)
            .retrieve_default("anything")
            .await
            .unwrap()
            .is_empty());
    }
}
