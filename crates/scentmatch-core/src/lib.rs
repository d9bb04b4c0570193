//! ScentMatch Core: shared types, traits, errors, and utilities.
//!
//! This crate provides the foundational types used across all ScentMatch
//! crates. It has no internal ScentMatch dependencies.
//!
//! # Modules
//!
//! - [`error`]: Error taxonomy and Result alias
//! - [`types`]: Item, gender, recommendation, and artifact path values
//! - [`traits`]: Configuration abstraction
//! - [`util`]: Atomic file writes, writer lock, path helpers

pub mod error;
pub mod traits;
pub mod types;
pub mod util;

// Re-export key types at crate root for convenience
pub use error::{Error, Result};
pub use traits::ConfigProvider;
pub use types::{ArtifactPaths, Gender, Item, ItemId, Recommendation};

// Convenience re-exports from util
pub use util::files::write_atomic;
pub use util::lock::WriterLock;
