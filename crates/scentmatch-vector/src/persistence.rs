//! Build metadata and freshness checking.
//!
//! A small JSON sidecar records what the index was built from. When the
//! content hash of the current catalog matches the stored one, the existing
//! index and mapping are still valid and don't need rebuilding.

use scentmatch_core::util::files::{read_string, write_atomic};
use scentmatch_core::{ItemId, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Metadata stored alongside an index for freshness checking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexMetadata {
    /// Content hash at build time.
    pub content_hash: String,

    /// Number of items indexed.
    pub item_count: usize,

    /// Embedding dimension.
    pub embedding_dimension: usize,

    /// Build timestamp (RFC 3339).
    pub built_at: String,

    /// Embedding provider name.
    pub provider: String,

    /// Model name used for embeddings.
    pub model: String,
}

impl IndexMetadata {
    /// Metadata stamped with the current time.
    pub fn new(
        content_hash: impl Into<String>,
        item_count: usize,
        embedding_dimension: usize,
        provider: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            content_hash: content_hash.into(),
            item_count,
            embedding_dimension,
            built_at: chrono::Utc::now().to_rfc3339(),
            provider: provider.into(),
            model: model.into(),
        }
    }
}

/// Blake3 hash over `(id, composed text)` pairs, in the given order.
///
/// Order matters: the same items enumerated differently produce different
/// positions, so they must hash differently too.
pub fn content_hash<'a>(entries: impl IntoIterator<Item = (ItemId, &'a str)>) -> String {
    let mut hasher = blake3::Hasher::new();
    for (id, text) in entries {
        hasher.update(&id.to_le_bytes());
        hasher.update(&(text.len() as u64).to_le_bytes());
        hasher.update(text.as_bytes());
    }
    hasher.finalize().to_hex().to_string()
}

/// Check if an existing index is fresh.
///
/// Returns `true` if the metadata file exists and the hashes match.
pub fn is_index_fresh(metadata_path: &Path, current_hash: &str) -> bool {
    match load_metadata(metadata_path) {
        Ok(metadata) => metadata.content_hash == current_hash,
        Err(_) => false,
    }
}

/// Save index metadata to a JSON file.
pub fn save_metadata(metadata_path: &Path, metadata: &IndexMetadata) -> Result<()> {
    let json = serde_json::to_string_pretty(metadata)?;
    write_atomic(metadata_path, json.as_bytes())
}

/// Load index metadata from a JSON file.
pub fn load_metadata(metadata_path: &Path) -> Result<IndexMetadata> {
    let json = read_string(metadata_path)?;
    let metadata: IndexMetadata = serde_json::from_str(&json)?;
    Ok(metadata)
}

/// Remove a stale metadata file so the next check reports the index as stale.
pub fn invalidate_metadata(metadata_path: &Path) -> Result<()> {
    match std::fs::remove_file(metadata_path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(scentmatch_core::Error::io_with_path(e, metadata_path)),
    }
}

// ============================================================================
// Tests
// ============================================================================
