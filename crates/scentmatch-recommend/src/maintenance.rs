//! Offline maintenance: full builds, incremental adds, and artifact checks.
//!
//! Every writer takes the advisory [`WriterLock`] next to the index file
//! before touching the artifacts. Each artifact is replaced atomically, but
//! the index and mapping are two files: a crash between the two writes of an
//! incremental add leaves the mapping one entry short. [`validate_artifacts`]
//! detects that state; a full rebuild repairs it.

use scentmatch_core::{ArtifactPaths, Error, Item, ItemId, Result, WriterLock};
use scentmatch_vector::persistence::invalidate_metadata;
use scentmatch_vector::{
    EmbeddingProvider, FlatIpIndex, IndexBuilder, IndexMetadata, IndexStats, PositionMap,
    VectorIndex, compose_item, is_index_fresh, load_metadata, prepare_embedding, save_metadata,
};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

use crate::catalog::ItemCatalog;
use crate::engine::Recommender;

// ============================================================================
// Full build
// ============================================================================

/// Options for [`build_artifacts`].
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Texts per embedding call.
    pub batch_size: usize,
    /// Rebuild even when the stored content hash matches.
    pub force: bool,
    /// Model name recorded in the metadata sidecar.
    pub model: String,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            batch_size: 64,
            force: false,
            model: String::new(),
        }
    }
}

impl BuildOptions {
    /// Set the batch size.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Set whether to ignore freshness.
    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// Set the recorded model name.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

/// Whether the stored artifacts match the catalog's current content.
pub async fn is_fresh(catalog: &dyn ItemCatalog, paths: &ArtifactPaths) -> Result<bool> {
    let items = catalog.items().await?;
    let hash = IndexBuilder::hash_items(&items)?;
    Ok(paths.index.exists() && paths.mapping.exists() && is_index_fresh(&paths.metadata, &hash))
}

/// Build the index, mapping, and metadata from every catalog item.
///
/// Skips the work when the artifacts are already fresh, unless
/// `options.force` is set.
pub async fn build_artifacts(
    catalog: &dyn ItemCatalog,
    provider: Arc<dyn EmbeddingProvider>,
    paths: &ArtifactPaths,
    options: &BuildOptions,
) -> Result<IndexStats> {
    let items = catalog.items().await?;
    let hash = IndexBuilder::hash_items(&items)?;

    if !options.force
        && paths.index.exists()
        && paths.mapping.exists()
        && is_index_fresh(&paths.metadata, &hash)
    {
        let metadata = load_metadata(&paths.metadata)?;
        log::info!("Index is fresh ({} items); skipping build", metadata.item_count);
        return Ok(IndexStats {
            items_indexed: metadata.item_count,
            items_skipped: items.len().saturating_sub(metadata.item_count),
            embedding_dimension: metadata.embedding_dimension,
            content_hash: metadata.content_hash,
            build_duration_ms: 0,
            from_cache: true,
        });
    }

    let _lock = acquire_writer_lock(paths.lock_path()).await?;
    let provider_name = provider.name().to_string();
    let built = IndexBuilder::new(provider)
        .with_batch_size(options.batch_size)
        .build(&items)
        .await?;

    built.index.save(&paths.index)?;
    built.mapping.save(&paths.mapping)?;
    let metadata = IndexMetadata::new(
        built.stats.content_hash.clone(),
        built.stats.items_indexed,
        built.stats.embedding_dimension,
        provider_name,
        options.model.clone(),
    );
    save_metadata(&paths.metadata, &metadata)?;

    Ok(built.stats)
}

/// Take the artifact writer lock without stalling the async runtime.
async fn acquire_writer_lock(path: PathBuf) -> Result<WriterLock> {
    tokio::task::spawn_blocking(move || WriterLock::acquire(&path))
        .await
        .map_err(|e| Error::operation(format!("writer lock task failed: {e}")))?
}

// ============================================================================
// Incremental add
// ============================================================================

impl Recommender {
    /// Append one item to the index and persist both artifacts.
    ///
    /// Returns the item's new position. The metadata sidecar is removed so
    /// the next freshness check reports the index as stale.
    pub async fn add_item(&mut self, item: &Item) -> Result<usize> {
        if self.mapping.contains_item(item.id) {
            return Err(Error::invalid_data(format!(
                "item {} is already indexed",
                item.id
            )));
        }
        if !item.has_profile() {
            return Err(Error::invalid_data(format!(
                "item {} has no name or notes to embed",
                item.id
            )));
        }

        let _lock = acquire_writer_lock(self.paths.lock_path()).await?;

        let embedding = self.provider.embed(&compose_item(item)).await?;
        let vector = prepare_embedding(embedding, self.index.dimension())?;

        let position = self.index.add(&vector)?;
        if let Err(e) = self.mapping.insert(position, item.id) {
            self.index.truncate(position);
            return Err(Error::MappingDesync(format!(
                "cannot map position {position}: {e}"
            )));
        }

        // Nothing is on disk yet, so a failed index write leaves the engine
        // as it was before the call.
        if let Err(e) = self.index.save(&self.paths.index) {
            self.index.truncate(position);
            self.mapping.remove(position);
            return Err(e);
        }
        self.mapping.save(&self.paths.mapping)?;
        invalidate_metadata(&self.paths.metadata)?;

        if let Err(e) = self.verify() {
            log::error!("Index and mapping disagree after adding item {}: {e}", item.id);
            return Err(e);
        }

        log::info!("Added item {} at position {position}", item.id);
        Ok(position)
    }
}

// ============================================================================
// Validation
// ============================================================================

/// Findings from [`validate_artifacts`].
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    /// Vectors in the index.
    pub vectors: usize,
    /// Embedding dimension.
    pub dimension: usize,
    /// Entries in the mapping.
    pub mapping_entries: usize,
    /// Build metadata, if the sidecar is present and readable.
    pub metadata: Option<IndexMetadata>,
    /// Mapped ids the catalog does not know.
    pub missing_from_catalog: Vec<ItemId>,
}

impl ValidationReport {
    /// Whether the catalog covers every mapped id.
    pub fn is_clean(&self) -> bool {
        self.missing_from_catalog.is_empty()
    }
}

/// Load both artifacts and check that they agree with each other and with
/// the catalog.
///
/// Unreadable artifacts give [`Error::IndexUnavailable`]; a size or position
/// mismatch gives [`Error::MappingDesync`]. Ids missing from the catalog are
/// reported, not treated as errors.
pub async fn validate_artifacts(
    paths: &ArtifactPaths,
    catalog: &dyn ItemCatalog,
) -> Result<ValidationReport> {
    let index = FlatIpIndex::load(&paths.index).map_err(|e| {
        Error::index_unavailable(format!("cannot load index {:?}: {e}", paths.index))
    })?;
    let mapping = PositionMap::load(&paths.mapping).map_err(|e| {
        Error::index_unavailable(format!("cannot load mapping {:?}: {e}", paths.mapping))
    })?;
    mapping.check_against(index.len())?;

    let ids: Vec<ItemId> = mapping.iter().map(|(_, id)| id).collect();
    let found: std::collections::HashSet<ItemId> = catalog
        .get_many(&ids)
        .await?
        .into_iter()
        .map(|item| item.id)
        .collect();
    let missing_from_catalog: Vec<ItemId> =
        ids.into_iter().filter(|id| !found.contains(id)).collect();

    Ok(ValidationReport {
        vectors: index.len(),
        dimension: index.dimension(),
        mapping_entries: mapping.len(),
        metadata: load_metadata(&paths.metadata).ok(),
        missing_from_catalog,
    })
}
