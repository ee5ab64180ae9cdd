//! Cosine similarity and brute-force ranking.
//!
//! Every query scores every stored document: O(n·d) for n documents of
//! dimension d. There is no index structure. At the target scale (tens to
//! low thousands of documents) the scan is faster than maintaining an
//! approximate index would be, so the simplicity is a deliberate trade-off
//! rather than an oversight.

use std::cmp::Ordering;

use super::document::{Document, SearchHit};

/// Cosine similarity between two equal-length vectors.
///
/// Returns `None` when the similarity is undefined: mismatched lengths,
/// empty vectors, or a zero-magnitude operand. Callers exclude such pairs
/// from ranking instead of dividing by zero.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Option<f32> {
    if a.len() != b.len() || a.is_empty() {
        return None;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    let denom = norm_a * norm_b;

    if denom <= f32::EPSILON {
        return None;
    }

    Some(dot / denom)
}

/// Ranks `documents` against `query`, descending by score, keeping at most
/// `k` hits. Documents with undefined similarity are excluded. `sort_by` is
/// stable, so equal scores retain insertion order.
pub fn rank_by_similarity(query: &[f32], documents: &[Document], k: usize) -> Vec<SearchHit> {
    if k == 0 {
        return Vec::new();
    }

    let mut hits: Vec<SearchHit> = documents
        .iter()
        .filter_map(|document| {
            cosine_similarity(query, &document.embedding).map(|score| SearchHit {
                document: document.clone(),
                score,
            })
        })
        .collect();

    hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    hits.truncate(k);
    hits
}
