//! Core data models.

/// A chunk of document text paired with its embedding.
///
/// The store keeps a `Vec<StoredChunk>`; holding text and vector in one
/// record means neither side can be replaced without the other.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredChunk {
    pub text: String,
    pub embedding: Vec<f32>,
}

impl StoredChunk {
    pub fn new(text: impl Into<String>, embedding: Vec<f32>) -> Self {
        Self {
            text: text.into(),
            embedding,
        }
    }
}

/// A ranked chunk returned from similarity search.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredChunk {
    /// Position of the chunk in storage order.
    pub index: usize,
    /// Cosine similarity against the query vector.
    pub score: f32,
    pub text: String,
}
