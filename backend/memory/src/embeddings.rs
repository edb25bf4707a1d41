//! Embedding providers for Greenlens retrieval.
//!
//! Hosted models plug in through the `EmbeddingProvider` trait; the built-in
//! `HashingEmbedder` runs locally with no model at all.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use anyhow::Result;
use async_trait::async_trait;

/// Default dimension for the local hashing embedder.
pub const DEFAULT_HASHING_DIMENSION: usize = 384;

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Return the embedding dimension for this provider/model.
    fn dimension(&self) -> usize;
    /// Embed a single text string.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
    /// Embed a batch of texts (default: sequential).
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let mut out = Vec::with_capacity(texts.len());
        for text in texts {
            out.push(self.embed(text).await?);
        }
        Ok(out)
    }
}

// ---------------------------------------------------------------------------
// Feature hashing
// ---------------------------------------------------------------------------

/// Signed feature hashing over lower-cased alphanumeric tokens, L2-normalized.
///
/// Texts sharing words land close together; texts sharing none are
/// near-orthogonal. Deterministic for a given build.
#[derive(Debug, Clone, Copy)]
pub struct HashingEmbedder {
    dimension: usize,
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self { dimension: DEFAULT_HASHING_DIMENSION }
    }
}

impl HashingEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self { dimension: dimension.max(1) }
    }

    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimension];
        for token in tokens(text) {
            let mut hasher = DefaultHasher::new();
            token.hash(&mut hasher);
            let hash = hasher.finish();
            let bucket = (hash % self.dimension as u64) as usize;
            let sign = if hash >> 63 == 0 { 1.0 } else { -1.0 };
            vector[bucket] += sign;
        }
        normalize(&mut vector);
        vector
    }
}

#[async_trait]
impl EmbeddingProvider for HashingEmbedder {
    fn dimension(&self) -> usize { self.dimension }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.embed_text(text))
    }
}

fn tokens(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
}

fn normalize(vector: &mut [f32]) {
    let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        vector.iter_mut().for_each(|x| *x /= norm);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::l2_distance;

    #[test]
    fn same_text_same_vector_regardless_of_case() {
        let embedder = HashingEmbedder::default();
        assert_eq!(embedder.embed_text("Solar Panel"), embedder.embed_text("solar, panel!"));
    }

    #[test]
    fn vectors_are_unit_length_or_zero() {
        let embedder = HashingEmbedder::new(64);
        let v = embedder.embed_text("wind turbine blade");
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
        assert!(embedder.embed_text("  ...  ").iter().all(|x| *x == 0.0));
    }

    #[test]
    fn shared_words_are_closer() {
        let embedder = HashingEmbedder::default();
        let query = embedder.embed_text("solar panel");
        let near = embedder.embed_text("solar panel kit");
        let far = embedder.embed_text("wind turbine");
        assert!(l2_distance(&query, &near) < l2_distance(&query, &far));
    }

    #[tokio::test]
    async fn batch_matches_single_embeds() {
        let embedder = HashingEmbedder::new(32);
        let batch = embedder.embed_batch(&["a b", "c"]).await.unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[1], embedder.embed("c").await.unwrap());
        assert_eq!(embedder.dimension(), 32);
    }
}
