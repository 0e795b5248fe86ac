//! Text-similarity capability used by the keyword factor.
//!
//! The engine only ever asks a [`VectorSpace`] for the similarity of an
//! indexed article and an indexed product, so a different vectorization
//! backend (embeddings, BM25 vectors) can replace [`TfIdfVectorSpace`]
//! without touching the scoring code.

pub mod tfidf;

pub use tfidf::{TermVector, TfIdfVectorSpace};

/// A read-only coordinate system shared by articles and products.
pub trait VectorSpace: Send + Sync {
    /// Similarity in `[0, 1]`. Unknown ids and zero vectors yield `0.0`.
    fn similarity(&self, article_id: &str, product_id: &str) -> f64;

    /// Whether `article_id` has been vectorized into this space.
    fn contains_article(&self, article_id: &str) -> bool;

    /// Terms behind a non-zero similarity, most informative first.
    fn shared_terms(&self, _article_id: &str, _product_id: &str) -> Vec<String> {
        Vec::new()
    }

    /// Backend name for logs and diagnostics.
    fn name(&self) -> &'static str;
}

/// Cosine of two sparse vectors given as `(term index, weight)` pairs sorted
/// by index.
///
/// Returns `0.0` when either vector has zero norm.
pub fn cosine_similarity(a: &[(usize, f64)], b: &[(usize, f64)]) -> f64 {
    let norm_a: f64 = a.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    let mut dot = 0.0;
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match a[i].0.cmp(&b[j].0) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                dot += a[i].1 * b[j].1;
                i += 1;
                j += 1;
            }
        }
    }

    (dot / (norm_a * norm_b)).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cosine_of_identical_vectors_is_one() {
        let a = vec![(0, 1.0), (3, 2.0)];
        assert!((cosine_similarity(&a, &a) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn cosine_of_disjoint_vectors_is_zero() {
        let a = vec![(0, 1.0)];
        let b = vec![(1, 1.0)];
        assert_eq!(cosine_similarity(&a, &b), 0.0);
    }

    #[test]
    fn cosine_handles_zero_vectors() {
        let a: Vec<(usize, f64)> = Vec::new();
        let b = vec![(1, 1.0)];
        assert_eq!(cosine_similarity(&a, &b), 0.0);
        assert_eq!(cosine_similarity(&[(2, 0.0)], &b), 0.0);
    }
}
