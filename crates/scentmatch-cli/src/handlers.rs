//! Handler functions for the index and query commands.
//!
//! These functions implement `build`, `similar`, `quiz`, `add`, `stats`,
//! `validate`, and `list` on top of `scentmatch-recommend`.

use crate::cli::QueryArgs;
use crate::config::ScentConfig;
use scentmatch_core::traits::ConfigProvider;
use scentmatch_core::{Error, ItemId, Recommendation, Result};
use scentmatch_recommend::{
    BuildOptions, InMemoryCatalog, ItemCatalog, RecommendParams, Recommender, build_artifacts,
    is_fresh, validate_artifacts,
};
use scentmatch_vector::{
    EmbeddingProvider, FlatIpIndex, PositionMap, VectorIndex, create_embedding_provider,
    load_metadata,
};
use std::fmt::Write as _;
use std::sync::Arc;

// ============================================================================
// Helpers
// ============================================================================

fn load_catalog(config: &ScentConfig) -> Result<InMemoryCatalog> {
    let path = config.catalog_path()?;
    if !path.exists() {
        return Err(Error::not_found(format!(
            "Item catalog not found at {}. Set data.catalog in the config file.",
            path.display()
        )));
    }
    InMemoryCatalog::from_json_file(&path)
}

fn provider(config: &ScentConfig) -> Result<Arc<dyn EmbeddingProvider>> {
    create_embedding_provider(&config.embedding)
}

fn open_engine(config: &ScentConfig) -> Result<Recommender> {
    let catalog: Arc<dyn ItemCatalog> = Arc::new(load_catalog(config)?);
    Recommender::open(config.artifact_paths()?, provider(config)?, catalog)
}

fn params(config: &ScentConfig, query: &QueryArgs) -> RecommendParams {
    RecommendParams::new(query.top_k.unwrap_or(config.recommend.top_k))
        .with_gender(query.gender.as_gender())
}

/// Render recommendations as an aligned text table.
pub(crate) fn format_table(results: &[Recommendation]) -> String {
    if results.is_empty() {
        return "No matching items.\n".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>3}  {:>6}  {:>5}  {:<32} {:<20} {}",
        "#", "ID", "MATCH", "NAME", "BRAND", "GENDER"
    );
    for (rank, rec) in results.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:>3}  {:>6}  {:>4}%  {:<32} {:<20} {}",
            rank + 1,
            rec.item.id,
            rec.match_percent,
            truncate(&rec.item.name, 32),
            truncate(&rec.item.brand, 20),
            rec.item.gender
        );
    }
    out
}

fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let head: String = s.chars().take(width.saturating_sub(1)).collect();
        format!("{head}…")
    }
}

fn print_results(results: &[Recommendation], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(results)?);
    } else {
        print!("{}", format_table(results));
    }
    Ok(())
}

// ============================================================================
// Handlers
// ============================================================================

/// Build the index artifacts from the catalog, or report their freshness.
pub async fn handle_build(config: &ScentConfig, force: bool, check: bool) -> Result<()> {
    let catalog = load_catalog(config)?;
    let paths = config.artifact_paths()?;

    if check {
        if is_fresh(&catalog, &paths).await? {
            println!("Index is fresh ({} catalog items).", catalog.len());
        } else {
            println!("Index is stale or missing; run `scentmatch build`.");
        }
        return Ok(());
    }

    println!("Building index from {} catalog items...", catalog.len());
    let options = BuildOptions::default()
        .with_batch_size(config.embedding.batch_size)
        .with_force(force)
        .with_model(config.embedding.model.clone());
    let stats = build_artifacts(&catalog, provider(config)?, &paths, &options).await?;

    if stats.from_cache {
        println!("Index already up to date (use --force to rebuild).");
    } else {
        println!("Index built:");
        println!("  Items indexed: {}", stats.items_indexed);
        println!("  Items skipped: {}", stats.items_skipped);
        println!("  Dimension:     {}", stats.embedding_dimension);
        println!("  Duration:      {} ms", stats.build_duration_ms);
        println!("\nIndex saved to: {}", paths.index.display());
    }
    Ok(())
}

/// Recommend items similar to `item_id`.
pub async fn handle_similar(config: &ScentConfig, item_id: ItemId, query: &QueryArgs) -> Result<()> {
    let engine = open_engine(config)?;
    let results = engine.by_item(item_id, &params(config, query)).await?;
    print_results(&results, query.json)
}

/// Recommend items matching free-form preferences.
pub async fn handle_quiz(config: &ScentConfig, preferences: &str, query: &QueryArgs) -> Result<()> {
    let engine = open_engine(config)?;
    let results = engine.by_text(preferences, &params(config, query)).await?;
    print_results(&results, query.json)
}

/// Append a catalog item to the existing index.
pub async fn handle_add(config: &ScentConfig, item_id: ItemId) -> Result<()> {
    let mut engine = open_engine(config)?;
    let item = engine
        .catalog()
        .get(item_id)
        .await?
        .ok_or_else(|| Error::not_found(format!("Item {item_id} is not in the catalog")))?;

    let position = engine.add_item(&item).await?;
    println!(
        "Added item {} ({}) at position {}; index now holds {} items.",
        item.id,
        item.name,
        position,
        engine.len()
    );
    Ok(())
}

/// Print index statistics.
pub async fn handle_stats(config: &ScentConfig) -> Result<()> {
    let paths = config.artifact_paths()?;
    let index = FlatIpIndex::load(&paths.index).map_err(|e| {
        Error::index_unavailable(format!("cannot load index {:?}: {e}", paths.index))
    })?;
    let mapping = PositionMap::load(&paths.mapping).map_err(|e| {
        Error::index_unavailable(format!("cannot load mapping {:?}: {e}", paths.mapping))
    })?;

    println!("Index statistics:");
    println!("  Vectors:         {}", index.len());
    println!("  Dimension:       {}", index.dimension());
    println!("  Mapping entries: {}", mapping.len());
    match load_metadata(&paths.metadata) {
        Ok(meta) => {
            println!("  Built at:        {}", meta.built_at);
            println!("  Provider:        {}", meta.provider);
            if !meta.model.is_empty() {
                println!("  Model:           {}", meta.model);
            }
            println!("  Content hash:    {}", meta.content_hash);
        }
        Err(_) => println!("  Metadata:        none (modified since last full build)"),
    }
    Ok(())
}

/// Check artifact consistency against each other and the catalog.
pub async fn handle_validate(config: &ScentConfig) -> Result<()> {
    let catalog = load_catalog(config)?;
    let report = validate_artifacts(&config.artifact_paths()?, &catalog).await?;

    if report.is_clean() {
        println!(
            "Index is valid: {} vectors, {} mapping entries.",
            report.vectors, report.mapping_entries
        );
        return Ok(());
    }

    println!("Index has validation issues:");
    for id in &report.missing_from_catalog {
        println!("  WARNING: mapped item {id} is missing from the catalog");
    }
    Err(Error::invalid_data(format!(
        "{} mapped items missing from the catalog",
        report.missing_from_catalog.len()
    )))
}

/// List catalog items.
pub async fn handle_list(config: &ScentConfig, limit: usize) -> Result<()> {
    let catalog = load_catalog(config)?;
    for item in catalog.list(limit) {
        println!(
            "{:>6}  {:<32} {:<20} {:<7} {}",
            item.id,
            truncate(&item.name, 32),
            truncate(&item.brand, 20),
            item.gender,
            item.notes.join(", ")
        );
    }
    if catalog.len() > limit {
        println!("... {} more", catalog.len() - limit);
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
