//! End-to-end recommendation scenarios over on-disk artifacts.

use async_trait::async_trait;
use scentmatch_core::{ArtifactPaths, Error, Gender, Item, Result};
use scentmatch_recommend::{
    BuildOptions, InMemoryCatalog, ItemCatalog, RecommendParams, Recommender, build_artifacts,
};
use scentmatch_vector::{EmbeddingProvider, MockEmbeddingProvider};
use std::sync::Arc;
use tempfile::TempDir;

const DIM: usize = 64;

fn provider() -> Arc<dyn EmbeddingProvider> {
    Arc::new(MockEmbeddingProvider::new(DIM))
}

/// Places texts mentioning "distant" on one axis and everything else on
/// another, so rank windows are predictable.
struct AxisProvider;

#[async_trait]
impl EmbeddingProvider for AxisProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut v = vec![0.0; DIM];
        v[usize::from(text.contains("distant"))] = 1.0;
        Ok(v)
    }

    fn dimension(&self) -> usize {
        DIM
    }

    fn name(&self) -> &str {
        "axis"
    }
}

async fn open_with(
    dir: &TempDir,
    catalog: InMemoryCatalog,
    provider: Arc<dyn EmbeddingProvider>,
) -> Recommender {
    let paths = ArtifactPaths::in_dir(dir.path());
    build_artifacts(&catalog, provider.clone(), &paths, &BuildOptions::default())
        .await
        .unwrap();
    let catalog: Arc<dyn ItemCatalog> = Arc::new(catalog);
    Recommender::open(paths, provider, catalog).unwrap()
}

async fn open(dir: &TempDir, catalog: InMemoryCatalog) -> Recommender {
    open_with(dir, catalog, provider()).await
}

fn trio() -> InMemoryCatalog {
    InMemoryCatalog::from_items([
        Item::new(1, "Azure", "Coast").with_notes(["sea salt", "lemon", "driftwood"]),
        Item::new(2, "Ember", "Hearth").with_notes(["smoke", "cedar", "amber"]),
        Item::new(3, "Petal", "Garden").with_notes(["rose", "jasmine", "musk"]),
    ])
    .unwrap()
}

#[tokio::test]
async fn by_item_returns_others_in_score_order() {
    let dir = TempDir::new().unwrap();
    let engine = open(&dir, trio()).await;

    let results = engine.by_item(1, &RecommendParams::new(2)).await.unwrap();

    assert_eq!(results.len(), 2);
    assert!(results.iter().all(|r| r.item.id != 1));
    assert!(results[0].score >= results[1].score);
}

#[tokio::test]
async fn by_text_fills_top_k_without_filter() {
    let dir = TempDir::new().unwrap();
    let engine = open(&dir, trio()).await;

    let results = engine
        .by_text("fresh citrus", &RecommendParams::new(3))
        .await
        .unwrap();

    assert_eq!(results.len(), 3);
    assert!(results.iter().all(|r| r.match_percent <= 100));
}

#[tokio::test]
async fn filtered_query_returns_short_list_when_few_match() {
    let dir = TempDir::new().unwrap();
    let items = (1..=30).map(|i| {
        // 28 sits outside the 25-candidate window, so it must not appear.
        let gender = if i == 7 || i == 19 || i == 28 {
            Gender::Female
        } else {
            Gender::Male
        };
        let note = if i > 26 { "distant" } else { "musk" };
        Item::new(i, format!("Scent {i}"), "House")
            .with_notes([note])
            .with_gender(gender)
    });
    let catalog = InMemoryCatalog::from_items(items).unwrap();
    let engine = open_with(&dir, catalog, Arc::new(AxisProvider)).await;

    let params = RecommendParams::new(5).with_gender(Gender::Female);
    let results = engine.by_item(1, &params).await.unwrap();

    let mut ids: Vec<_> = results.iter().map(|r| r.item.id).collect();
    ids.sort_unstable();
    assert_eq!(ids, vec![7, 19]);
    assert!(results.iter().all(|r| r.item.gender == Gender::Female));
}

#[tokio::test]
async fn added_item_is_queryable_and_excluded_from_its_own_results() {
    let dir = TempDir::new().unwrap();
    let mut catalog = InMemoryCatalog::from_items((1..=10).map(|i| {
        Item::new(i, format!("Scent {i}"), "House").with_notes([format!("note-{i}")])
    }))
    .unwrap();
    let paths = ArtifactPaths::in_dir(dir.path());
    build_artifacts(&catalog, provider(), &paths, &BuildOptions::default())
        .await
        .unwrap();

    let newcomer = Item::new(999, "Late Bloom", "House").with_notes(["tuberose", "honey"]);
    catalog.insert(newcomer.clone());
    let mut engine = Recommender::open(paths, provider(), Arc::new(catalog)).unwrap();

    let position = engine.add_item(&newcomer).await.unwrap();
    assert_eq!(position, 10);
    assert_eq!(engine.len(), 11);
    assert_eq!(engine.mapping().get(position).unwrap(), 999);

    let results = engine.by_item(999, &RecommendParams::new(1)).await.unwrap();
    assert_eq!(results.len(), 1);
    assert_ne!(results[0].item.id, 999);
}

#[tokio::test]
async fn missing_mapping_refuses_to_start() {
    let dir = TempDir::new().unwrap();
    let paths = ArtifactPaths::in_dir(dir.path());
    build_artifacts(&trio(), provider(), &paths, &BuildOptions::default())
        .await
        .unwrap();
    std::fs::remove_file(&paths.mapping).unwrap();

    let err = Recommender::open(paths, provider(), Arc::new(trio())).unwrap_err();
    assert!(matches!(err, Error::IndexUnavailable(_)));
}

#[tokio::test]
async fn reload_reproduces_rankings() {
    let dir = TempDir::new().unwrap();
    let first = open(&dir, trio()).await;
    let before = first
        .by_text("smoky woods", &RecommendParams::new(3))
        .await
        .unwrap();

    let second = Recommender::open(
        ArtifactPaths::in_dir(dir.path()),
        provider(),
        Arc::new(trio()),
    )
    .unwrap();
    let after = second
        .by_text("smoky woods", &RecommendParams::new(3))
        .await
        .unwrap();

    assert_eq!(before, after);
}
