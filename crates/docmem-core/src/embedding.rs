//! Embedding provider trait and vector utilities.
//!
//! Defines the [`EmbeddingProvider`] trait that every embedding backend
//! implements, plus the cosine similarity used for ranking.
//!
//! Concrete providers (OpenAI, Ollama, fastembed) live in the `docmem`
//! app crate. Tests implement the trait with deterministic fakes.

use anyhow::{anyhow, Result};
use async_trait::async_trait;

/// Trait for embedding providers.
///
/// An implementation maps a batch of texts to one vector per text, in
/// input order. Vectors from a single provider are expected to share one
/// length; callers do not rely on that for safety (see
/// [`cosine_similarity`]).
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Returns the model identifier (e.g. `"text-embedding-3-small"`).
    fn model_name(&self) -> &str;

    /// Returns the embedding vector dimensionality (e.g. `1536`).
    fn dims(&self) -> usize;

    /// Embed a batch of texts, returning one vector per input in order.
    async fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Embed a single query text.
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        self.embed_texts(&[text.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("Empty embedding response"))
    }
}

/// Compute cosine similarity between two embedding vectors.
///
/// Returns a value in `[-1.0, 1.0]`:
/// - `1.0` = identical direction
/// - `0.0` = orthogonal (unrelated)
/// - `-1.0` = opposite direction
///
/// Vectors of different lengths are compared over their overlapping
/// prefix (`min(a.len(), b.len())` components). The result is `0.0` when
/// either prefix has zero magnitude, when either vector is empty, and
/// when the arithmetic produces a non-finite value. A result that
/// underflows to zero is always `+0.0`, never `-0.0`.
///
/// # Formula
///
/// ```text
///            a · b
/// cos(θ) = ─────────
///          ‖a‖ × ‖b‖
/// ```
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;

    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    let sim = dot / (norm_a.sqrt() * norm_b.sqrt());
    if sim.is_finite() {
        // Adding +0.0 turns -0.0 into +0.0 so equal scores compare equal.
        sim + 0.0
    } else {
        0.0
    }
}
