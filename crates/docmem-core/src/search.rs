//! Brute-force top-K similarity ranking.
//!
//! Scores every stored record against a query vector with
//! [`cosine_similarity`] and keeps the best `top_k`.
//!
//! # Ordering
//!
//! Records are sorted by descending score with a stable sort, so records
//! with equal scores keep their storage order. Callers can rely on this:
//! for a fixed store and query vector the result is fully deterministic.

use std::cmp::Ordering;

use crate::embedding::cosine_similarity;
use crate::models::{ScoredChunk, StoredChunk};

/// Default number of chunks returned by retrieval.
pub const DEFAULT_TOP_K: usize = 3;

/// Rank `records` against `query_vec` and return the best `top_k`.
///
/// Returns at most `min(top_k, records.len())` entries, highest score
/// first. `top_k == 0` returns an empty vector.
pub fn rank_top_k(query_vec: &[f32], records: &[StoredChunk], top_k: usize) -> Vec<ScoredChunk> {
    if top_k == 0 || records.is_empty() {
        return Vec::new();
    }

    let mut scored: Vec<(usize, f32)> = records
        .iter()
        .enumerate()
        .map(|(i, r)| (i, cosine_similarity(query_vec, &r.embedding)))
        .collect();

    // `sort_by` is stable: ties stay in storage order.
    scored.sort_by(|a, b| descending(a.1, b.1));
    scored.truncate(top_k);

    scored
        .into_iter()
        .map(|(index, score)| ScoredChunk {
            index,
            score,
            text: records[index].text.clone(),
        })
        .collect()
}

fn descending(a: f32, b: f32) -> Ordering {
    b.total_cmp(&a)
}
