//! Embedding provider trait, vector normalization, and mock implementation.
//!
//! This module defines the `EmbeddingProvider` trait that abstracts over
//! different embedding generation backends. The engine treats the provider
//! as an opaque capability: text in, fixed-length vector out.
//!
//! # Providers
//!
//! - `MockEmbeddingProvider`: Deterministic fixed-dimension vectors for testing
//! - `FastEmbedProvider`: Local embedding via fastembed (requires `vector-fastembed` feature)

use async_trait::async_trait;
use scentmatch_core::{Error, Result};
use std::sync::Arc;

use crate::types::VectorConfig;

/// Trait for generating text embeddings.
///
/// Implementations wrap specific embedding libraries and provide a uniform
/// async interface. The trait requires `Send + Sync` to allow safe sharing
/// across async tasks.
///
/// Failures should be reported as [`Error::EmbeddingProvider`]; the engine
/// never retries them.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate an embedding for a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embeddings for a batch of texts.
    ///
    /// Default implementation calls `embed` for each text sequentially.
    /// Backends that support native batching should override this.
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(self.embed(text).await?);
        }
        Ok(results)
    }

    /// The embedding dimension.
    fn dimension(&self) -> usize;

    /// The provider name for diagnostics.
    fn name(&self) -> &str;
}

// ============================================================================
// Normalization
// ============================================================================

/// Scale `vector` to unit L2 length in place.
///
/// Returns the original norm. A zero vector is left untouched.
pub fn normalize_l2(vector: &mut [f32]) -> f32 {
    let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for val in vector.iter_mut() {
            *val /= norm;
        }
    }
    norm
}

/// Validate provider output and return it unit-normalized.
///
/// Rejects vectors of the wrong dimension, with non-finite components, or
/// with zero length, since none of them can be ranked by cosine similarity.
pub fn prepare_embedding(mut vector: Vec<f32>, expected_dimension: usize) -> Result<Vec<f32>> {
    if vector.len() != expected_dimension {
        return Err(Error::embedding_provider(format!(
            "expected {expected_dimension}-dimensional embedding, got {}",
            vector.len()
        )));
    }
    if vector.iter().any(|x| !x.is_finite()) {
        return Err(Error::embedding_provider(
            "embedding contains non-finite components",
        ));
    }
    if normalize_l2(&mut vector) == 0.0 {
        return Err(Error::embedding_provider("embedding has zero length"));
    }
    Ok(vector)
}

// ============================================================================
// Mock provider
// ============================================================================

/// A mock embedding provider for testing.
///
/// Generates deterministic vectors based on the input text bytes, producing
/// consistent embeddings for the same input. Every byte of the text
/// contributes, so texts sharing a long prefix still embed differently.
pub struct MockEmbeddingProvider {
    dimension: usize,
}

impl MockEmbeddingProvider {
    /// Create a new mock provider with the given dimension.
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }

    /// Generate a deterministic embedding from text.
    fn deterministic_embedding(&self, text: &str) -> Vec<f32> {
        let mut embedding = vec![0.0f32; self.dimension];
        if self.dimension == 0 {
            return embedding;
        }
        let bytes = text.as_bytes();

        for (i, val) in embedding.iter_mut().enumerate() {
            let byte_idx = i % bytes.len().max(1);
            let byte_val = bytes.get(byte_idx).copied().unwrap_or(0);
            *val = ((byte_val as f32 + i as f32) % 256.0) / 256.0;
        }

        // Fold the tail of long texts back onto the leading components
        for (j, byte) in bytes.iter().enumerate().skip(self.dimension) {
            let slot = (j * 7 + *byte as usize) % self.dimension;
            embedding[slot] += (*byte as f32) / 512.0;
        }

        normalize_l2(&mut embedding);
        embedding
    }
}

#[async_trait]
impl EmbeddingProvider for MockEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.deterministic_embedding(text))
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        Ok(texts
            .iter()
            .map(|t| self.deterministic_embedding(t))
            .collect())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn name(&self) -> &str {
        "mock"
    }
}

// ============================================================================
// Factory
// ============================================================================

/// Create the embedding provider named in `config`.
///
/// `"mock"` is always available; `"fastembed"` requires the
/// `vector-fastembed` feature.
pub fn create_embedding_provider(config: &VectorConfig) -> Result<Arc<dyn EmbeddingProvider>> {
    match config.provider.as_str() {
        "mock" => {
            if config.dimension == 0 {
                return Err(Error::config("mock provider needs a non-zero dimension"));
            }
            Ok(Arc::new(MockEmbeddingProvider::new(config.dimension)))
        }
        #[cfg(feature = "vector-fastembed")]
        "fastembed" => Ok(Arc::new(crate::fastembed::FastEmbedProvider::new(
            &config.model,
            config.cache_path.as_deref(),
        )?)),
        #[cfg(not(feature = "vector-fastembed"))]
        "fastembed" => Err(Error::config(
            "fastembed provider requires the `vector-fastembed` feature",
        )),
        other => Err(Error::config(format!(
            "Unknown embedding provider: '{other}'. Supported: fastembed, mock"
        ))),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn norm(v: &[f32]) -> f32 {
        v.iter().map(|x| x * x).sum::<f32>().sqrt()
    }

    #[test]
    fn test_mock_provider_creation() {
        let provider = MockEmbeddingProvider::new(384);
        assert_eq!(provider.dimension(), 384);
        assert_eq!(provider.name(), "mock");
    }

    #[tokio::test]
    async fn test_mock_embed_single() {
        let provider = MockEmbeddingProvider::new(8);
        let embedding = provider.embed("hello world").await.unwrap();

        assert_eq!(embedding.len(), 8);
        assert!((norm(&embedding) - 1.0).abs() < 1e-5);
    }

    #[tokio::test]
    async fn test_mock_embed_deterministic() {
        let provider = MockEmbeddingProvider::new(16);
        let e1 = provider.embed("same text").await.unwrap();
        let e2 = provider.embed("same text").await.unwrap();
        assert_eq!(e1, e2);
    }

    #[tokio::test]
    async fn test_mock_embed_long_shared_prefix_differs() {
        let provider = MockEmbeddingProvider::new(8);
        let e1 = provider
            .embed("Aventus features notes of pineapple, birch.")
            .await
            .unwrap();
        let e2 = provider
            .embed("Aventus features notes of vanilla, tonka.")
            .await
            .unwrap();
        assert_ne!(e1, e2);
    }

    #[tokio::test]
    async fn test_mock_embed_batch() {
        let provider = MockEmbeddingProvider::new(8);
        let embeddings = provider.embed_batch(&["hello", "world", "test"]).await.unwrap();

        assert_eq!(embeddings.len(), 3);
        for emb in &embeddings {
            assert_eq!(emb.len(), 8);
        }
    }

    #[tokio::test]
    async fn test_mock_embed_batch_empty() {
        let provider = MockEmbeddingProvider::new(4);
        let embeddings = provider.embed_batch(&[]).await.unwrap();
        assert!(embeddings.is_empty());
    }

    #[test]
    fn test_normalize_l2() {
        let mut v = vec![3.0, 4.0];
        let original = normalize_l2(&mut v);
        assert_eq!(original, 5.0);
        assert!((v[0] - 0.6).abs() < 1e-6);
        assert!((v[1] - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_normalize_l2_zero_vector() {
        let mut v = vec![0.0, 0.0, 0.0];
        assert_eq!(normalize_l2(&mut v), 0.0);
        assert_eq!(v, vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_prepare_embedding_normalizes() {
        let v = prepare_embedding(vec![0.0, 2.0, 0.0], 3).unwrap();
        assert_eq!(v, vec![0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_prepare_embedding_rejects_wrong_dimension() {
        let err = prepare_embedding(vec![1.0, 0.0], 3).unwrap_err();
        assert!(matches!(err, Error::EmbeddingProvider(_)));
    }

    #[test]
    fn test_prepare_embedding_rejects_nan() {
        let err = prepare_embedding(vec![f32::NAN, 1.0], 2).unwrap_err();
        assert!(matches!(err, Error::EmbeddingProvider(_)));
    }

    #[test]
    fn test_prepare_embedding_rejects_zero() {
        let err = prepare_embedding(vec![0.0, 0.0], 2).unwrap_err();
        assert!(matches!(err, Error::EmbeddingProvider(_)));
    }

    #[test]
    fn test_create_mock_provider() {
        let config = VectorConfig {
            provider: "mock".to_string(),
            dimension: 32,
            ..Default::default()
        };
        let provider = create_embedding_provider(&config).unwrap();
        assert_eq!(provider.dimension(), 32);
        assert_eq!(provider.name(), "mock");
    }

    #[test]
    fn test_create_unknown_provider() {
        let config = VectorConfig {
            provider: "openai".to_string(),
            ..Default::default()
        };
        let err = create_embedding_provider(&config).err().unwrap();
        assert!(err.to_string().contains("Unknown embedding provider"));
    }

    #[test]
    fn test_trait_object_safety() {
        fn _assert_object_safe(_: &dyn EmbeddingProvider) {}
    }
}
