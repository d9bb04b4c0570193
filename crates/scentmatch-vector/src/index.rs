//! Exact inner-product vector index.
//!
//! Vectors are stored contiguously in append order; a vector's position is
//! its slot in that sequence. Callers must insert and query with unit-length
//! vectors (see [`crate::embedding::prepare_embedding`]), which makes the
//! inner-product score equal to cosine similarity.
//!
//! The index persists as a single rkyv archive. Scores are computed the same
//! way before and after a save/load cycle, so ranked results are reproduced
//! bit for bit.

use scentmatch_core::util::files::{read_bytes, write_atomic};
use scentmatch_core::{Error, Result};
use std::path::Path;

use crate::types::SearchHit;

/// Nearest-neighbor index over fixed-dimension vectors.
pub trait VectorIndex: Send + Sync {
    /// Dimension shared by every stored vector.
    fn dimension(&self) -> usize;

    /// Number of stored vectors.
    fn len(&self) -> usize;

    /// Whether the index holds no vectors.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append a vector and return its position.
    fn add(&mut self, vector: &[f32]) -> Result<usize>;

    /// Rank stored vectors against `query`.
    ///
    /// Returns at most `min(k, len)` hits, descending by score, ties broken
    /// by ascending position.
    fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchHit>>;

    /// Copy of the vector stored at `position`.
    fn reconstruct(&self, position: usize) -> Result<Vec<f32>>;
}

/// On-disk form of a [`FlatIpIndex`].
#[derive(rkyv::Archive, rkyv::Serialize, rkyv::Deserialize, Debug)]
struct IndexSnapshot {
    dimension: u32,
    vectors: Vec<f32>,
}

/// Brute-force inner-product index.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatIpIndex {
    dimension: usize,
    data: Vec<f32>,
}

impl FlatIpIndex {
    /// Create an empty index for `dimension`-length vectors.
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            data: Vec::new(),
        }
    }

    /// Build an index where position `i` holds `vectors[i]`.
    pub fn build(vectors: Vec<Vec<f32>>) -> Result<Self> {
        let dimension = match vectors.first() {
            Some(v) if !v.is_empty() => v.len(),
            Some(_) => return Err(Error::invalid_data("vectors must not be empty")),
            None => return Err(Error::invalid_data("cannot build an index from no vectors")),
        };

        let mut index = Self::new(dimension);
        index.data.reserve(dimension * vectors.len());
        for vector in &vectors {
            index.add(vector)?;
        }
        Ok(index)
    }

    /// Drop every vector at or after position `len`.
    pub fn truncate(&mut self, len: usize) {
        self.data.truncate(len.saturating_mul(self.dimension));
    }

    fn slot(&self, position: usize) -> Option<&[f32]> {
        let start = position.checked_mul(self.dimension)?;
        self.data.get(start..start + self.dimension)
    }

    /// Write the index to `path` atomically.
    pub fn save(&self, path: &Path) -> Result<()> {
        let dimension = u32::try_from(self.dimension)
            .map_err(|_| Error::serialization("dimension does not fit in u32"))?;
        let snapshot = IndexSnapshot {
            dimension,
            vectors: self.data.clone(),
        };
        let bytes = rkyv::to_bytes::<rkyv::rancor::Error>(&snapshot)
            .map_err(|e| Error::serialization(format!("Failed to encode index: {e}")))?;
        write_atomic(path, &bytes)?;

        log::info!(
            "Saved index with {} vectors (dimension {}) to {:?}",
            self.len(),
            self.dimension,
            path
        );
        Ok(())
    }

    /// Read an index previously written by [`FlatIpIndex::save`].
    pub fn load(path: &Path) -> Result<Self> {
        let raw = read_bytes(path)?;

        // rkyv needs aligned input; file buffers carry no such guarantee.
        let mut aligned = rkyv::util::AlignedVec::<16>::with_capacity(raw.len());
        aligned.extend_from_slice(&raw);

        let snapshot = rkyv::from_bytes::<IndexSnapshot, rkyv::rancor::Error>(&aligned)
            .map_err(|e| Error::serialization(format!("Corrupt index file {path:?}: {e}")))?;

        let dimension = snapshot.dimension as usize;
        if dimension == 0 || snapshot.vectors.len() % dimension != 0 {
            return Err(Error::serialization(format!(
                "Corrupt index file {path:?}: {} values do not divide into dimension {dimension}",
                snapshot.vectors.len()
            )));
        }

        let index = Self {
            dimension,
            data: snapshot.vectors,
        };
        log::debug!("Loaded index with {} vectors from {:?}", index.len(), path);
        Ok(index)
    }
}

impl VectorIndex for FlatIpIndex {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn len(&self) -> usize {
        if self.dimension == 0 {
            0
        } else {
            self.data.len() / self.dimension
        }
    }

    fn add(&mut self, vector: &[f32]) -> Result<usize> {
        if vector.len() != self.dimension {
            return Err(Error::invalid_data(format!(
                "expected {}-dimensional vector, got {}",
                self.dimension,
                vector.len()
            )));
        }
        let position = self.len();
        self.data.extend_from_slice(vector);
        Ok(position)
    }

    fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchHit>> {
        if query.len() != self.dimension {
            return Err(Error::invalid_data(format!(
                "expected {}-dimensional query, got {}",
                self.dimension,
                query.len()
            )));
        }
        if k == 0 || self.dimension == 0 {
            return Ok(Vec::new());
        }

        let mut hits: Vec<SearchHit> = self
            .data
            .chunks_exact(self.dimension)
            .enumerate()
            // `+ 0.0` folds -0.0 into +0.0 so equal scores tie under total_cmp.
            .map(|(position, stored)| SearchHit::new(position, dot(query, stored) + 0.0))
            .collect();

        hits.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.position.cmp(&b.position))
        });
        hits.truncate(k);
        Ok(hits)
    }

    fn reconstruct(&self, position: usize) -> Result<Vec<f32>> {
        self.slot(position)
            .map(<[f32]>::to_vec)
            .ok_or_else(|| Error::reconstruction(position, self.len()))
    }
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::normalize_l2;
    use proptest::prelude::*;
    use tempfile::TempDir;

    fn unit(v: Vec<f32>) -> Vec<f32> {
        let mut v = v;
        normalize_l2(&mut v);
        v
    }

    fn sample_index() -> FlatIpIndex {
        FlatIpIndex::build(vec![
            unit(vec![1.0, 0.0, 0.0]),
            unit(vec![0.0, 1.0, 0.0]),
            unit(vec![1.0, 1.0, 0.0]),
            unit(vec![0.0, 0.0, 1.0]),
        ])
        .unwrap()
    }

    #[test]
    fn test_build_assigns_positions_in_order() {
        let index = sample_index();
        assert_eq!(index.len(), 4);
        assert_eq!(index.dimension(), 3);
        assert_eq!(index.reconstruct(1).unwrap(), vec![0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_build_rejects_mismatched_dimensions() {
        let err = FlatIpIndex::build(vec![vec![1.0, 0.0], vec![1.0, 0.0, 0.0]]).unwrap_err();
        assert!(matches!(err, Error::InvalidData(_)));
    }

    #[test]
    fn test_build_rejects_empty_input() {
        assert!(FlatIpIndex::build(Vec::new()).is_err());
        assert!(FlatIpIndex::build(vec![Vec::new()]).is_err());
    }

    #[test]
    fn test_add_returns_previous_len() {
        let mut index = sample_index();
        let position = index.add(&unit(vec![1.0, 0.0, 1.0])).unwrap();
        assert_eq!(position, 4);
        assert_eq!(index.len(), 5);
    }

    #[test]
    fn test_add_rejects_wrong_dimension() {
        let mut index = FlatIpIndex::new(3);
        assert!(index.add(&[1.0, 0.0]).is_err());
        assert!(index.is_empty());
    }

    #[test]
    fn test_search_ranks_by_inner_product() {
        let index = sample_index();
        let hits = index.search(&[1.0, 0.0, 0.0], 3).unwrap();

        assert_eq!(hits.len(), 3);
        assert_eq!(hits[0].position, 0);
        assert!((hits[0].score - 1.0).abs() < 1e-6);
        assert_eq!(hits[1].position, 2);
        assert!((hits[1].score - std::f32::consts::FRAC_1_SQRT_2).abs() < 1e-6);
    }

    #[test]
    fn test_search_ties_break_by_position() {
        let index = FlatIpIndex::build(vec![
            vec![0.0, 1.0],
            vec![1.0, 0.0],
            vec![0.0, 1.0],
            vec![0.0, 1.0],
        ])
        .unwrap();

        let hits = index.search(&[0.0, 1.0], 3).unwrap();
        let positions: Vec<usize> = hits.iter().map(|h| h.position).collect();
        assert_eq!(positions, vec![0, 2, 3]);
    }

    #[test]
    fn test_search_signed_zero_scores_tie() {
        let index = FlatIpIndex::build(vec![vec![-0.0, 1.0], vec![0.0, 1.0]]).unwrap();

        let hits = index.search(&[1.0, -0.0], 2).unwrap();
        assert_eq!(hits[0].position, 0);
        assert_eq!(hits[1].position, 1);
        assert_eq!(hits[0].score.to_bits(), 0.0f32.to_bits());
    }

    #[test]
    fn test_truncate_drops_tail() {
        let mut index = sample_index();
        index.add(&unit(vec![1.0, 0.0, 1.0])).unwrap();
        index.truncate(4);
        assert_eq!(index, sample_index());
        assert!(index.reconstruct(4).is_err());
    }

    #[test]
    fn test_search_k_larger_than_len() {
        let index = sample_index();
        assert_eq!(index.search(&[0.0, 0.0, 1.0], 100).unwrap().len(), 4);
    }

    #[test]
    fn test_search_k_zero() {
        let index = sample_index();
        assert!(index.search(&[0.0, 0.0, 1.0], 0).unwrap().is_empty());
    }

    #[test]
    fn test_search_rejects_wrong_dimension() {
        let index = sample_index();
        assert!(index.search(&[1.0, 0.0], 1).is_err());
    }

    #[test]
    fn test_reconstruct_out_of_range() {
        let index = sample_index();
        let err = index.reconstruct(4).unwrap_err();
        assert!(matches!(
            err,
            Error::Reconstruction {
                position: 4,
                len: 4
            }
        ));
        assert!(err.is_integrity_fault());
    }

    #[test]
    fn test_save_load_preserves_results() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("index.bin");

        let index = sample_index();
        index.save(&path).unwrap();
        let loaded = FlatIpIndex::load(&path).unwrap();

        assert_eq!(loaded, index);
        let query = unit(vec![0.3, 0.9, 0.1]);
        let before = index.search(&query, 4).unwrap();
        let after = loaded.search(&query, 4).unwrap();
        assert_eq!(before.len(), after.len());
        for (a, b) in before.iter().zip(&after) {
            assert_eq!(a.position, b.position);
            assert_eq!(a.score.to_bits(), b.score.to_bits());
        }
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        assert!(FlatIpIndex::load(&dir.path().join("absent.bin")).is_err());
    }

    #[test]
    fn test_load_garbage_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("garbage.bin");
        std::fs::write(&path, b"definitely not an index").unwrap();
        assert!(FlatIpIndex::load(&path).is_err());
    }

    fn vectors_strategy() -> impl Strategy<Value = Vec<Vec<f32>>> {
        (1usize..6).prop_flat_map(|dim| {
            prop::collection::vec(prop::collection::vec(-1.0f32..1.0, dim), 1..20)
        })
    }

    proptest! {
        #[test]
        fn prop_search_score_is_inner_product(vectors in vectors_strategy()) {
            let unit_vectors: Vec<Vec<f32>> = vectors
                .into_iter()
                .filter_map(|mut v| (normalize_l2(&mut v) > 1e-3).then_some(v))
                .collect();
            prop_assume!(!unit_vectors.is_empty());

            let index = FlatIpIndex::build(unit_vectors.clone()).unwrap();
            let query = &unit_vectors[0];
            for hit in index.search(query, unit_vectors.len()).unwrap() {
                let expected: f32 = query
                    .iter()
                    .zip(&unit_vectors[hit.position])
                    .map(|(a, b)| a * b)
                    .sum();
                prop_assert!((hit.score - expected).abs() < 1e-5);
                prop_assert!(hit.score <= 1.0 + 1e-5 && hit.score >= -1.0 - 1e-5);
            }
        }

        #[test]
        fn prop_search_bounded_and_ordered(vectors in vectors_strategy(), k in 0usize..30) {
            let dim = vectors[0].len();
            let n = vectors.len();
            let index = FlatIpIndex::build(vectors).unwrap();
            let query = vec![1.0f32; dim];

            let hits = index.search(&query, k).unwrap();
            prop_assert_eq!(hits.len(), k.min(n));
            for pair in hits.windows(2) {
                let order = pair[0].score.total_cmp(&pair[1].score);
                prop_assert!(order.is_gt() || (order.is_eq() && pair[0].position < pair[1].position));
            }
        }
    }
}
