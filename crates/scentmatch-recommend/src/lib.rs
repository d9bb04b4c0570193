//! Similarity queries and index maintenance for ScentMatch.
//!
//! This crate sits on top of `scentmatch-vector` and answers the two
//! recommendation pathways:
//!
//! - **by item**: items similar to a known, indexed item
//! - **by text**: items matching a free-form preference description
//!
//! It also owns the offline maintenance operations (full build, incremental
//! add, artifact validation) and the shared [`RecommendService`] handle.
//!
//! # Modules
//!
//! - [`catalog`]: `ItemCatalog` trait and `InMemoryCatalog`
//! - [`engine`]: `Recommender`, the loaded engine
//! - [`query`]: Overfetch, filtering, self-exclusion, match percentage
//! - [`maintenance`]: Build, add, freshness, validation
//! - [`service`]: `RecommendService` shared handle

pub mod catalog;
pub mod engine;
pub mod maintenance;
pub mod query;
pub mod service;

pub use catalog::{InMemoryCatalog, ItemCatalog};
pub use engine::Recommender;
pub use maintenance::{BuildOptions, ValidationReport, build_artifacts, is_fresh, validate_artifacts};
pub use query::{OVERFETCH_FACTOR, RecommendParams, match_percent};
pub use service::RecommendService;
