//! Shared engine handle.
//!
//! Provides [`RecommendService`], a cheap-to-clone handle around one
//! [`Recommender`] that is constructed at startup and passed to every request
//! handler.
//!
//! Queries take the read side of an async `RwLock` and run concurrently.
//! [`RecommendService::add_item`] takes the write side, so a query observes
//! the engine either before or after an add, never in between.
//!
//! # Example
//!
//! ```rust,ignore
//! use scentmatch_recommend::{RecommendParams, RecommendService, Recommender};
//!
//! let engine = Recommender::open(paths, provider, catalog)?;
//! let service = RecommendService::new(engine);
//!
//! let handler_service = service.clone();
//! let results = handler_service
//!     .by_text("smoky vetiver", &RecommendParams::new(5))
//!     .await?;
//! ```

use scentmatch_core::{Item, ItemId, Recommendation, Result};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::engine::Recommender;
use crate::query::RecommendParams;

/// Thread-safe shared handle to a [`Recommender`].
///
/// `RecommendService` is `Clone`, `Send`, and `Sync`. Cloning is cheap
/// (Arc clone).
#[derive(Debug, Clone)]
pub struct RecommendService {
    engine: Arc<RwLock<Recommender>>,
}

impl RecommendService {
    /// Wrap an opened engine.
    pub fn new(engine: Recommender) -> Self {
        Self {
            engine: Arc::new(RwLock::new(engine)),
        }
    }

    /// See [`Recommender::by_item`].
    pub async fn by_item(
        &self,
        item_id: ItemId,
        params: &RecommendParams,
    ) -> Result<Vec<Recommendation>> {
        self.engine.read().await.by_item(item_id, params).await
    }

    /// See [`Recommender::by_text`].
    pub async fn by_text(
        &self,
        preferences: &str,
        params: &RecommendParams,
    ) -> Result<Vec<Recommendation>> {
        self.engine.read().await.by_text(preferences, params).await
    }

    /// See [`Recommender::add_item`]. Waits for in-flight queries to finish.
    pub async fn add_item(&self, item: &Item) -> Result<usize> {
        self.engine.write().await.add_item(item).await
    }

    /// Number of indexed items.
    pub async fn len(&self) -> usize {
        self.engine.read().await.len()
    }

    /// Whether the index is empty.
    pub async fn is_empty(&self) -> bool {
        self.engine.read().await.is_empty()
    }

    /// Re-check index/mapping consistency.
    pub async fn verify(&self) -> Result<()> {
        self.engine.read().await.verify()
    }

    /// Release the engine if this is the last handle.
    ///
    /// Returns `None` while other clones are alive.
    pub fn into_inner(self) -> Option<Recommender> {
        Arc::into_inner(self.engine).map(RwLock::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{InMemoryCatalog, ItemCatalog};
    use crate::maintenance::{BuildOptions, build_artifacts};
    use scentmatch_core::ArtifactPaths;
    use scentmatch_vector::{EmbeddingProvider, MockEmbeddingProvider};
    use tempfile::TempDir;

    fn items() -> Vec<Item> {
        (1..=6)
            .map(|i| Item::new(i, format!("Scent {i}"), "House").with_notes([format!("note-{i}")]))
            .collect()
    }

    async fn service(dir: &TempDir, extra: Option<Item>) -> RecommendService {
        let paths = ArtifactPaths::in_dir(dir.path());
        let provider: Arc<dyn EmbeddingProvider> = Arc::new(MockEmbeddingProvider::new(16));
        let mut catalog = InMemoryCatalog::from_items(items()).unwrap();
        build_artifacts(&catalog, provider.clone(), &paths, &BuildOptions::default())
            .await
            .unwrap();
        if let Some(item) = extra {
            catalog.insert(item);
        }
        let catalog: Arc<dyn ItemCatalog> = Arc::new(catalog);
        RecommendService::new(Recommender::open(paths, provider, catalog).unwrap())
    }

    #[tokio::test]
    async fn test_clone_shares_engine() {
        let dir = TempDir::new().unwrap();
        let a = service(&dir, None).await;
        let b = a.clone();

        assert_eq!(a.len().await, 6);
        assert_eq!(b.len().await, 6);
        assert!(a.into_inner().is_none());
        assert!(b.into_inner().is_some());
    }

    #[tokio::test]
    async fn test_add_visible_to_clones() {
        let dir = TempDir::new().unwrap();
        let fig = Item::new(77, "Fig", "House").with_notes(["fig"]);
        let a = service(&dir, Some(fig.clone())).await;
        let b = a.clone();

        a.add_item(&fig).await.unwrap();
        assert_eq!(b.len().await, 7);
        let results = b.by_item(77, &RecommendParams::new(3)).await.unwrap();
        assert_eq!(results.len(), 3);
        assert!(b.verify().await.is_ok());
    }

    #[tokio::test]
    async fn test_concurrent_queries() {
        let dir = TempDir::new().unwrap();
        let service = service(&dir, None).await;

        let mut handles = Vec::new();
        for id in 1..=6 {
            let s = service.clone();
            handles.push(tokio::spawn(async move {
                s.by_item(id, &RecommendParams::new(2)).await
            }));
        }
        for handle in handles {
            let results = handle.await.unwrap().unwrap();
            assert_eq!(results.len(), 2);
        }
    }

    #[test]
    fn test_service_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<RecommendService>();
    }
}
