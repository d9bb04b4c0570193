//! The similarity engine.
//!
//! A [`Recommender`] owns a loaded index, its position mapping, the
//! embedding provider used for free-text queries, and the catalog used to
//! decorate results. It answers two kinds of query:
//!
//! - **by item**: rank against the stored vector of a known item, dropping
//!   the item itself from the results
//! - **by text**: embed a preference string and rank against that
//!
//! Both share the overfetch → filter → truncate stage in [`crate::query`].
//!
//! Construction validates the artifacts and refuses to produce an engine
//! over a missing, unreadable, or inconsistent index.

use scentmatch_core::{ArtifactPaths, Error, ItemId, Recommendation, Result};
use scentmatch_vector::{
    EmbeddingProvider, FlatIpIndex, PositionMap, VectorIndex, compose_query_text,
    prepare_embedding,
};
use std::sync::Arc;

use crate::catalog::ItemCatalog;
use crate::query::{RecommendParams, collect, exclude_self};

/// Loaded index plus the collaborators needed to serve queries.
pub struct Recommender {
    pub(crate) index: FlatIpIndex,
    pub(crate) mapping: PositionMap,
    pub(crate) provider: Arc<dyn EmbeddingProvider>,
    pub(crate) catalog: Arc<dyn ItemCatalog>,
    pub(crate) paths: ArtifactPaths,
}

impl Recommender {
    /// Load the index and mapping from `paths`.
    ///
    /// Any failure to read or decode either artifact is reported as
    /// [`Error::IndexUnavailable`].
    pub fn open(
        paths: ArtifactPaths,
        provider: Arc<dyn EmbeddingProvider>,
        catalog: Arc<dyn ItemCatalog>,
    ) -> Result<Self> {
        let index = FlatIpIndex::load(&paths.index).map_err(|e| {
            Error::index_unavailable(format!("cannot load index {:?}: {e}", paths.index))
        })?;
        let mapping = PositionMap::load(&paths.mapping).map_err(|e| {
            Error::index_unavailable(format!("cannot load mapping {:?}: {e}", paths.mapping))
        })?;

        let engine = Self::from_parts(index, mapping, provider, catalog, paths)?;
        log::info!(
            "Opened index: {} items, dimension {}",
            engine.len(),
            engine.dimension()
        );
        Ok(engine)
    }

    /// Assemble an engine from in-memory parts, checking their consistency.
    pub fn from_parts(
        index: FlatIpIndex,
        mapping: PositionMap,
        provider: Arc<dyn EmbeddingProvider>,
        catalog: Arc<dyn ItemCatalog>,
        paths: ArtifactPaths,
    ) -> Result<Self> {
        if provider.dimension() != index.dimension() {
            return Err(Error::index_unavailable(format!(
                "index dimension {} does not match provider '{}' dimension {}",
                index.dimension(),
                provider.name(),
                provider.dimension()
            )));
        }
        mapping.check_against(index.len())?;

        Ok(Self {
            index,
            mapping,
            provider,
            catalog,
            paths,
        })
    }

    /// Items similar to `item_id`, never including `item_id` itself.
    ///
    /// Fails with [`Error::NotFound`] if the item is not indexed.
    pub async fn by_item(
        &self,
        item_id: ItemId,
        params: &RecommendParams,
    ) -> Result<Vec<Recommendation>> {
        params.validate()?;
        let position = self.mapping.find(item_id)?;
        let vector = self.index.reconstruct(position)?;

        let window = params.fetch_window().saturating_add(1);
        let hits = exclude_self(self.index.search(&vector, window)?, position);

        log::debug!(
            "by_item({item_id}): {} candidates from window {window}",
            hits.len()
        );
        collect(&hits, &self.mapping, self.catalog.as_ref(), params).await
    }

    /// Items matching free-form `preferences`.
    pub async fn by_text(
        &self,
        preferences: &str,
        params: &RecommendParams,
    ) -> Result<Vec<Recommendation>> {
        params.validate()?;
        let text = compose_query_text(preferences);
        let embedding = self.provider.embed(&text).await?;
        let query = prepare_embedding(embedding, self.index.dimension())?;

        let hits = self.index.search(&query, params.fetch_window())?;
        log::debug!("by_text: {} candidates", hits.len());
        collect(&hits, &self.mapping, self.catalog.as_ref(), params).await
    }

    /// Re-check that index and mapping agree.
    pub fn verify(&self) -> Result<()> {
        self.mapping.check_against(self.index.len())
    }

    /// Number of indexed items.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Whether the index is empty.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Embedding dimension.
    pub fn dimension(&self) -> usize {
        self.index.dimension()
    }

    /// Whether `item_id` is indexed.
    pub fn contains(&self, item_id: ItemId) -> bool {
        self.mapping.contains_item(item_id)
    }

    /// The position mapping.
    pub fn mapping(&self) -> &PositionMap {
        &self.mapping
    }

    /// Where the artifacts live.
    pub fn paths(&self) -> &ArtifactPaths {
        &self.paths
    }

    /// The embedding provider.
    pub fn provider(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.provider
    }

    /// The item catalog.
    pub fn catalog(&self) -> &Arc<dyn ItemCatalog> {
        &self.catalog
    }
}

impl std::fmt::Debug for Recommender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Recommender")
            .field("items", &self.index.len())
            .field("dimension", &self.index.dimension())
            .field("provider", &self.provider.name())
            .field("catalog", &self.catalog.name())
            .finish()
    }
}
