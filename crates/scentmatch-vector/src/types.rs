//! Common types for the vector module.
//!
//! These types are used across the index, the builder, and the embedding
//! providers, and are always available regardless of feature flags.

use serde::{Deserialize, Serialize};

// ============================================================================
// Configuration
// ============================================================================

/// Embedding configuration.
///
/// Controls provider selection, model, and batching.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorConfig {
    /// Embedding provider: "fastembed" or "mock".
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Embedding model name (e.g., "all-minilm-l6-v2").
    #[serde(default = "default_model")]
    pub model: String,

    /// Embedding dimension for the mock provider (fastembed probes its own).
    #[serde(default = "default_dimension")]
    pub dimension: usize,

    /// Path to cache directory for embedding models.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_path: Option<String>,

    /// Batch size for embedding operations.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

fn default_provider() -> String {
    "fastembed".to_string()
}

fn default_model() -> String {
    "all-minilm-l6-v2".to_string()
}

fn default_dimension() -> usize {
    384
}

fn default_batch_size() -> usize {
    64
}

impl Default for VectorConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            dimension: default_dimension(),
            cache_path: None,
            batch_size: default_batch_size(),
        }
    }
}

// ============================================================================
// Search types
// ============================================================================

/// A single raw index hit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    /// Index position of the stored vector.
    pub position: usize,

    /// Inner product with the query vector.
    pub score: f32,
}

impl SearchHit {
    /// Create a new hit.
    pub fn new(position: usize, score: f32) -> Self {
        Self { position, score }
    }
}

// ============================================================================
// Index statistics
// ============================================================================

/// Statistics from an index build operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexStats {
    /// Number of items indexed.
    pub items_indexed: usize,

    /// Number of items skipped for lack of indexable content.
    pub items_skipped: usize,

    /// Embedding dimension used.
    pub embedding_dimension: usize,

    /// Content hash for freshness checking.
    pub content_hash: String,

    /// Build duration in milliseconds.
    pub build_duration_ms: u64,

    /// Whether the existing index was kept because it was fresh.
    #[serde(default)]
    pub from_cache: bool,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vector_config_default() {
        let config = VectorConfig::default();
        assert_eq!(config.provider, "fastembed");
        assert_eq!(config.model, "all-minilm-l6-v2");
        assert_eq!(config.dimension, 384);
        assert!(config.cache_path.is_none());
        assert_eq!(config.batch_size, 64);
    }

    #[test]
    fn test_vector_config_deserialization_with_defaults() {
        let json = r#"{"provider": "mock"}"#;
        let config: VectorConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.provider, "mock");
        assert_eq!(config.model, "all-minilm-l6-v2");
        assert_eq!(config.batch_size, 64);
    }

    #[test]
    fn test_vector_config_serialization_skips_empty_cache() {
        let json = serde_json::to_string(&VectorConfig::default()).unwrap();
        assert!(!json.contains("cache_path"));
    }

    #[test]
    fn test_index_stats_serialization() {
        let stats = IndexStats {
            items_indexed: 100,
            items_skipped: 2,
            embedding_dimension: 384,
            content_hash: "abc123".to_string(),
            build_duration_ms: 1500,
            from_cache: false,
        };

        let json = serde_json::to_string(&stats).unwrap();
        assert!(json.contains("100"));
        assert!(json.contains("384"));
        assert!(json.contains("abc123"));
    }
}
