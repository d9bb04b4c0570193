//! Error types for ScentMatch operations.
//!
//! This module provides a common `Error` type and `Result<T>` alias used across
//! all ScentMatch crates. Uses `thiserror` for derive macros.
//!
//! Besides the general-purpose variants (I/O, configuration, parsing), the enum
//! carries the similarity engine's own failure taxonomy:
//!
//! | Variant | Meaning | Scope |
//! |---------|---------|-------|
//! | [`Error::NotFound`] | Item id absent from the position mapping | request |
//! | [`Error::IndexUnavailable`] | Index or mapping artifact missing/corrupt at startup | fatal |
//! | [`Error::EmbeddingProvider`] | Provider unreachable or returned malformed output | request |
//! | [`Error::Reconstruction`] | Position out of range for the index | integrity fault |
//! | [`Error::MappingDesync`] | Index size and mapping entry count disagree | integrity fault |

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur in ScentMatch operations.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// I/O error tied to a specific file.
    #[error("I/O error at {path}: {source}")]
    IoWithPath {
        /// File that was being accessed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Item id (or other lookup key) not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid data or format.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Binary serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// JSON encoding or decoding error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A generic operation failed.
    #[error("Operation failed: {0}")]
    Operation(String),

    /// The persisted index or mapping could not be loaded.
    #[error("Index unavailable: {0}")]
    IndexUnavailable(String),

    /// The embedding provider failed or returned malformed output.
    #[error("Embedding provider error: {0}")]
    EmbeddingProvider(String),

    /// A stored vector could not be reconstructed.
    #[error("Cannot reconstruct position {position}: index holds {len} vectors")]
    Reconstruction {
        /// Requested position.
        position: usize,
        /// Number of vectors in the index.
        len: usize,
    },

    /// Index and position mapping disagree.
    #[error("Index/mapping desync: {0}")]
    MappingDesync(String),
}

impl Error {
    /// Create an I/O error annotated with the path being accessed.
    pub fn io_with_path(source: std::io::Error, path: impl AsRef<Path>) -> Self {
        Self::IoWithPath {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Wrap a bare I/O error.
    pub fn io(source: std::io::Error) -> Self {
        Self::Io(source)
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a not found error.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create an invalid data error.
    pub fn invalid_data(msg: impl Into<String>) -> Self {
        Self::InvalidData(msg.into())
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::InvalidData(msg.into())
    }

    /// Create a serialization error.
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }

    /// Create a generic operation error.
    pub fn operation(msg: impl Into<String>) -> Self {
        Self::Operation(msg.into())
    }

    /// Create an index-unavailable error.
    pub fn index_unavailable(msg: impl Into<String>) -> Self {
        Self::IndexUnavailable(msg.into())
    }

    /// Create an embedding provider error.
    pub fn embedding_provider(msg: impl Into<String>) -> Self {
        Self::EmbeddingProvider(msg.into())
    }

    /// Create a reconstruction error.
    pub fn reconstruction(position: usize, len: usize) -> Self {
        Self::Reconstruction { position, len }
    }

    /// Create a desync error from the two observed sizes.
    pub fn mapping_desync(index_len: usize, mapping_len: usize) -> Self {
        Self::MappingDesync(format!(
            "index holds {index_len} vectors but mapping has {mapping_len} entries"
        ))
    }

    /// Whether this error means the requested item is unknown.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Whether this error signals that the index and mapping are out of step.
    pub fn is_integrity_fault(&self) -> bool {
        matches!(self, Self::Reconstruction { .. } | Self::MappingDesync(_))
    }
}

/// Result type alias using ScentMatch's Error type.
pub type Result<T> = std::result::Result<T, Error>;
