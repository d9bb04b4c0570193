//! Vector index infrastructure for ScentMatch.
//!
//! This crate turns item profiles into unit vectors, stores them in an exact
//! inner-product index, and keeps the position ↔ item id mapping that ties
//! index slots back to catalog records.
//!
//! # Features
//!
//! - `vector-fastembed`: Enable local embedding generation via fastembed
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    scentmatch-vector                        │
//! ├─────────────────────────────────────────────────────────────┤
//! │  EmbeddingProvider trait                                    │
//! │  ├── MockEmbeddingProvider (always available)               │
//! │  └── FastEmbedProvider (feature: vector-fastembed)          │
//! ├─────────────────────────────────────────────────────────────┤
//! │  VectorIndex trait                                          │
//! │  └── FlatIpIndex (exact inner product, rkyv persistence)    │
//! │  PositionMap (position ↔ item id, JSON persistence)         │
//! ├─────────────────────────────────────────────────────────────┤
//! │  compose (item and query text templates)                    │
//! │  IndexBuilder (batch embed + index orchestration)           │
//! │  Persistence (content hash freshness checking)              │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use scentmatch_vector::{IndexBuilder, MockEmbeddingProvider, VectorIndex};
//! use std::sync::Arc;
//!
//! let provider = Arc::new(MockEmbeddingProvider::new(384));
//! let built = IndexBuilder::new(provider).build(&items).await?;
//!
//! let query = built.index.reconstruct(0)?;
//! for hit in built.index.search(&query, 5)? {
//!     println!("{}: {:.3}", built.mapping.get(hit.position)?, hit.score);
//! }
//! ```

pub mod builder;
pub mod compose;
pub mod embedding;
pub mod index;
pub mod mapping;
pub mod persistence;
pub mod types;

#[cfg(feature = "vector-fastembed")]
pub mod fastembed;

// Re-exports: core types
pub use types::{IndexStats, SearchHit, VectorConfig};

// Re-exports: traits and implementations
pub use builder::{BuiltIndex, IndexBuilder};
pub use compose::{compose_item, compose_item_text, compose_query_text};
pub use embedding::{
    EmbeddingProvider, MockEmbeddingProvider, create_embedding_provider, normalize_l2,
    prepare_embedding,
};
pub use index::{FlatIpIndex, VectorIndex};
pub use mapping::PositionMap;
pub use persistence::{IndexMetadata, content_hash, is_index_fresh, load_metadata, save_metadata};

#[cfg(feature = "vector-fastembed")]
pub use self::fastembed::FastEmbedProvider;
