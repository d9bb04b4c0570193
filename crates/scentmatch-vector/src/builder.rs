//! Full index construction.
//!
//! `IndexBuilder` composes each item's text, embeds the texts in batches,
//! normalizes the vectors, and assembles a [`FlatIpIndex`] and
//! [`PositionMap`] in which position `i` belongs to the `i`-th indexed item.
//! Given the same items in the same order and a deterministic provider, two
//! builds produce identical positions and mappings.

use scentmatch_core::{Error, Item, ItemId, Result};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use crate::compose::compose_item;
use crate::embedding::{EmbeddingProvider, prepare_embedding};
use crate::index::FlatIpIndex;
use crate::mapping::PositionMap;
use crate::persistence::content_hash;
use crate::types::IndexStats;

/// Output of a build: the index, its mapping, and build statistics.
#[derive(Debug)]
pub struct BuiltIndex {
    /// The vector index.
    pub index: FlatIpIndex,
    /// Position ↔ item id mapping.
    pub mapping: PositionMap,
    /// Build statistics, including the content hash.
    pub stats: IndexStats,
}

/// Batch builder for the vector index.
pub struct IndexBuilder {
    provider: Arc<dyn EmbeddingProvider>,
    batch_size: usize,
}

impl IndexBuilder {
    /// Create a builder with the default batch size of 64.
    pub fn new(provider: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            provider,
            batch_size: 64,
        }
    }

    /// Set the number of texts sent to the provider per call.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Composed texts of the items that will be indexed, in index order.
    ///
    /// Items with neither a name nor notes are left out. Duplicate ids are
    /// rejected since the mapping must stay injective.
    pub fn plan(items: &[Item]) -> Result<Vec<(ItemId, String)>> {
        let mut seen = HashSet::with_capacity(items.len());
        let mut planned = Vec::with_capacity(items.len());

        for item in items {
            if !seen.insert(item.id) {
                return Err(Error::invalid_data(format!(
                    "duplicate item id {} in catalog",
                    item.id
                )));
            }
            if !item.has_profile() {
                log::warn!("Skipping item {}: no name or notes to embed", item.id);
                continue;
            }
            planned.push((item.id, compose_item(item)));
        }
        Ok(planned)
    }

    /// Content hash of what [`IndexBuilder::build`] would index.
    pub fn hash_items(items: &[Item]) -> Result<String> {
        let planned = Self::plan(items)?;
        Ok(content_hash(
            planned.iter().map(|(id, text)| (*id, text.as_str())),
        ))
    }

    /// Embed `items` and build the index.
    pub async fn build(&self, items: &[Item]) -> Result<BuiltIndex> {
        let started = Instant::now();
        let planned = Self::plan(items)?;
        if planned.is_empty() {
            return Err(Error::invalid_data("no indexable items"));
        }

        let dimension = self.provider.dimension();
        let mut vectors = Vec::with_capacity(planned.len());

        for (batch_no, chunk) in planned.chunks(self.batch_size).enumerate() {
            let texts: Vec<&str> = chunk.iter().map(|(_, text)| text.as_str()).collect();
            let embeddings = self.provider.embed_batch(&texts).await?;
            if embeddings.len() != texts.len() {
                return Err(Error::embedding_provider(format!(
                    "provider returned {} embeddings for {} texts",
                    embeddings.len(),
                    texts.len()
                )));
            }
            for embedding in embeddings {
                vectors.push(prepare_embedding(embedding, dimension)?);
            }
            log::debug!(
                "Embedded batch {} ({} of {} items)",
                batch_no + 1,
                vectors.len(),
                planned.len()
            );
        }

        let index = FlatIpIndex::build(vectors)?;
        let mapping = PositionMap::from_ordered(planned.iter().map(|(id, _)| *id))?;
        let stats = IndexStats {
            items_indexed: planned.len(),
            items_skipped: items.len() - planned.len(),
            embedding_dimension: dimension,
            content_hash: content_hash(planned.iter().map(|(id, text)| (*id, text.as_str()))),
            build_duration_ms: started.elapsed().as_millis() as u64,
            from_cache: false,
        };

        log::info!(
            "Built index: {} items, {} skipped, dimension {} in {}ms",
            stats.items_indexed,
            stats.items_skipped,
            stats.embedding_dimension,
            stats.build_duration_ms
        );

        Ok(BuiltIndex {
            index,
            mapping,
            stats,
        })
    }
}

impl std::fmt::Debug for IndexBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexBuilder")
            .field("provider", &self.provider.name())
            .field("batch_size", &self.batch_size)
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
