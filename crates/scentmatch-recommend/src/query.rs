//! Shared post-processing for both query pathways.
//!
//! The index has no predicate support, so category filtering happens after
//! ranking. A filtered query fetches a fixed multiple of `top_k` candidates
//! and keeps the ones that pass; when fewer than `top_k` survive, the
//! shorter list is returned as is. The window is never widened.

use scentmatch_core::{Error, Gender, ItemId, Recommendation, Result};
use scentmatch_vector::{PositionMap, SearchHit};
use std::collections::HashMap;

use crate::catalog::ItemCatalog;

/// Candidate multiplier applied when a category filter is active.
pub const OVERFETCH_FACTOR: usize = 5;

/// Result count and optional filter for a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecommendParams {
    /// Maximum number of results.
    pub top_k: usize,

    /// Required category, if any.
    pub gender: Option<Gender>,
}

impl RecommendParams {
    /// Unfiltered query for `top_k` results.
    pub fn new(top_k: usize) -> Self {
        Self { top_k, gender: None }
    }

    /// Restrict results to `gender`; `None` clears the filter.
    pub fn with_gender(mut self, gender: impl Into<Option<Gender>>) -> Self {
        self.gender = gender.into();
        self
    }

    /// Reject a zero result count.
    pub fn validate(&self) -> Result<()> {
        if self.top_k == 0 {
            return Err(Error::invalid_data("top_k must be at least 1"));
        }
        Ok(())
    }

    /// Number of candidates to take from the index.
    pub fn fetch_window(&self) -> usize {
        match self.gender {
            Some(_) => self.top_k.saturating_mul(OVERFETCH_FACTOR),
            None => self.top_k,
        }
    }
}

impl Default for RecommendParams {
    fn default() -> Self {
        Self::new(5)
    }
}

/// Convert an inner-product score to a 0–100 match percentage.
///
/// Negative scores clamp to 0, so anti-correlated items display the same as
/// unrelated ones.
pub fn match_percent(score: f32) -> u8 {
    if score.is_nan() {
        return 0;
    }
    (score.clamp(0.0, 1.0) * 100.0).round() as u8
}

/// Remove the source item's own hit from a by-item result window.
///
/// The window was fetched one larger than needed. If the source position is
/// in it, that hit goes; otherwise the top hit goes, so the result is always
/// one shorter and never contains the source.
pub fn exclude_self(mut hits: Vec<SearchHit>, self_position: usize) -> Vec<SearchHit> {
    match hits.iter().position(|h| h.position == self_position) {
        Some(i) => {
            hits.remove(i);
        }
        None if !hits.is_empty() => {
            hits.remove(0);
        }
        None => {}
    }
    hits
}

/// Resolve ranked hits into recommendations.
///
/// Positions without a mapping entry and ids missing from the catalog are
/// skipped. Stops after `params.top_k` accepted results.
pub(crate) async fn collect(
    hits: &[SearchHit],
    mapping: &PositionMap,
    catalog: &dyn ItemCatalog,
    params: &RecommendParams,
) -> Result<Vec<Recommendation>> {
    let mut ranked: Vec<(ItemId, f32)> = Vec::with_capacity(hits.len());
    for hit in hits {
        match mapping.get(hit.position) {
            Ok(id) => ranked.push((id, hit.score)),
            Err(_) => log::debug!("Position {} has no mapping entry; skipped", hit.position),
        }
    }

    let ids: Vec<ItemId> = ranked.iter().map(|(id, _)| *id).collect();
    let mut details: HashMap<ItemId, _> = catalog
        .get_many(&ids)
        .await?
        .into_iter()
        .map(|item| (item.id, item))
        .collect();

    let mut results = Vec::with_capacity(params.top_k.min(ranked.len()));
    for (id, score) in ranked {
        if results.len() >= params.top_k {
            break;
        }
        let Some(item) = details.remove(&id) else {
            log::warn!("Item {id} is indexed but missing from catalog {}", catalog.name());
            continue;
        };
        if params.gender.is_some_and(|g| g != item.gender) {
            continue;
        }
        results.push(Recommendation {
            item,
            match_percent: match_percent(score),
            score,
        });
    }
    Ok(results)
}
