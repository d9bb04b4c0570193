//! Bidirectional position ↔ item id mapping.
//!
//! The forward direction (position → item id) is the persisted source of
//! truth. The reverse direction is kept in step on every insert rather than
//! rebuilt by inverting the forward map.
//!
//! # File format
//!
//! A JSON object whose keys are decimal positions and whose values are item
//! ids, e.g. `{"0": 17, "1": 4, "2": 23}`. Keys are parsed back to integers
//! on load.

use scentmatch_core::util::files::{read_string, write_atomic};
use scentmatch_core::{Error, ItemId, Result};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

/// Injective mapping between index positions and item ids.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PositionMap {
    forward: BTreeMap<usize, ItemId>,
    reverse: HashMap<ItemId, usize>,
}

impl PositionMap {
    /// Create an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mapping where position `i` holds `ids[i]`.
    pub fn from_ordered(ids: impl IntoIterator<Item = ItemId>) -> Result<Self> {
        let mut map = Self::new();
        for (position, id) in ids.into_iter().enumerate() {
            map.insert(position, id)?;
        }
        Ok(map)
    }

    /// Record that `position` holds `item_id`.
    ///
    /// Fails if either side is already mapped.
    pub fn insert(&mut self, position: usize, item_id: ItemId) -> Result<()> {
        if let Some(existing) = self.forward.get(&position) {
            return Err(Error::invalid_data(format!(
                "position {position} already maps to item {existing}"
            )));
        }
        if let Some(existing) = self.reverse.get(&item_id) {
            return Err(Error::invalid_data(format!(
                "item {item_id} already mapped at position {existing}"
            )));
        }
        self.forward.insert(position, item_id);
        self.reverse.insert(item_id, position);
        Ok(())
    }

    /// Drop the entry at `position`, returning its item id.
    pub fn remove(&mut self, position: usize) -> Option<ItemId> {
        let item_id = self.forward.remove(&position)?;
        self.reverse.remove(&item_id);
        Some(item_id)
    }

    /// Item id stored at `position`.
    pub fn get(&self, position: usize) -> Result<ItemId> {
        self.forward
            .get(&position)
            .copied()
            .ok_or_else(|| Error::not_found(format!("no item at position {position}")))
    }

    /// Position holding `item_id`.
    pub fn find(&self, item_id: ItemId) -> Result<usize> {
        self.reverse
            .get(&item_id)
            .copied()
            .ok_or_else(|| Error::not_found(format!("item {item_id} is not indexed")))
    }

    /// Whether `item_id` has a position.
    pub fn contains_item(&self, item_id: ItemId) -> bool {
        self.reverse.contains_key(&item_id)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.forward.len()
    }

    /// Whether the mapping is empty.
    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    /// Largest mapped position, if any.
    pub fn max_position(&self) -> Option<usize> {
        self.forward.keys().next_back().copied()
    }

    /// Entries in ascending position order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, ItemId)> + '_ {
        self.forward.iter().map(|(p, id)| (*p, *id))
    }

    /// Check that the mapping covers exactly the positions `0..index_len`.
    pub fn check_against(&self, index_len: usize) -> Result<()> {
        if self.len() != index_len {
            return Err(Error::mapping_desync(index_len, self.len()));
        }
        // Keys are distinct, so len == index_len plus max < index_len means dense.
        if let Some(max) = self.max_position().filter(|max| *max >= index_len) {
            return Err(Error::MappingDesync(format!(
                "mapping references position {max} but index holds {index_len} vectors"
            )));
        }
        Ok(())
    }

    /// Write the mapping as JSON, atomically.
    pub fn save(&self, path: &Path) -> Result<()> {
        // serde_json writes integer keys as strings, in numeric order here.
        let json = serde_json::to_string(&self.forward)?;
        write_atomic(path, json.as_bytes())?;
        log::debug!("Saved mapping with {} entries to {:?}", self.len(), path);
        Ok(())
    }

    /// Load a mapping written by [`PositionMap::save`].
    pub fn load(path: &Path) -> Result<Self> {
        let json = read_string(path)?;
        Self::from_json(&json)
    }

    /// Parse the JSON form.
    pub fn from_json(json: &str) -> Result<Self> {
        let keyed: HashMap<String, ItemId> = serde_json::from_str(json)?;
        let mut map = Self::new();
        for (key, item_id) in keyed {
            let position: usize = key
                .trim()
                .parse()
                .map_err(|_| Error::parse(format!("mapping key '{key}' is not a position")))?;
            map.insert(position, item_id)?;
        }
        Ok(map)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_from_ordered() {
        let map = PositionMap::from_ordered([17, 4, 23]).unwrap();
        assert_eq!(map.len(), 3);
        assert_eq!(map.get(0).unwrap(), 17);
        assert_eq!(map.get(2).unwrap(), 23);
        assert_eq!(map.find(4).unwrap(), 1);
    }

    #[test]
    fn test_get_missing_is_not_found() {
        let map = PositionMap::from_ordered([1]).unwrap();
        assert!(map.get(5).unwrap_err().is_not_found());
        assert!(map.find(99).unwrap_err().is_not_found());
    }

    #[test]
    fn test_insert_keeps_reverse_in_step() {
        let mut map = PositionMap::from_ordered([10, 20]).unwrap();
        assert!(!map.contains_item(30));
        map.insert(2, 30).unwrap();
        assert_eq!(map.find(30).unwrap(), 2);
        assert!(map.contains_item(30));
    }

    #[test]
    fn test_insert_rejects_duplicate_item() {
        let mut map = PositionMap::from_ordered([10, 20]).unwrap();
        assert!(map.insert(2, 10).is_err());
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_insert_rejects_occupied_position() {
        let mut map = PositionMap::from_ordered([10, 20]).unwrap();
        assert!(map.insert(1, 30).is_err());
        assert!(!map.contains_item(30));
    }

    #[test]
    fn test_check_against() {
        let map = PositionMap::from_ordered([1, 2, 3]).unwrap();
        assert!(map.check_against(3).is_ok());

        let err = map.check_against(4).unwrap_err();
        assert!(matches!(err, Error::MappingDesync(_)));
    }

    #[test]
    fn test_check_against_sparse_positions() {
        let mut map = PositionMap::new();
        map.insert(0, 1).unwrap();
        map.insert(5, 2).unwrap();
        let err = map.check_against(2).unwrap_err();
        assert!(err.to_string().contains("position 5"));
    }

    #[test]
    fn test_save_uses_string_keys() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("mapping.json");

        PositionMap::from_ordered([17, 4]).unwrap().save(&path).unwrap();
        let json = std::fs::read_to_string(&path).unwrap();
        assert_eq!(json, r#"{"0":17,"1":4}"#);
    }

    #[test]
    fn test_save_orders_keys_numerically() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("mapping.json");

        PositionMap::from_ordered(100..112).unwrap().save(&path).unwrap();
        let json = std::fs::read_to_string(&path).unwrap();
        let two = json.find(r#""2":"#).unwrap();
        let ten = json.find(r#""10":"#).unwrap();
        assert!(two < ten, "keys out of numeric order: {json}");
        assert!(json.ends_with(r#""11":111}"#));
    }

    #[test]
    fn test_remove_clears_both_directions() {
        let mut map = PositionMap::from_ordered([10, 20, 30]).unwrap();
        assert_eq!(map.remove(2), Some(30));
        assert!(!map.contains_item(30));
        assert!(map.get(2).is_err());
        assert_eq!(map.remove(2), None);
        map.insert(2, 30).unwrap();
        assert_eq!(map.find(30).unwrap(), 2);
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("mapping.json");

        let original = PositionMap::from_ordered([5, 8, 13, 21, 34, 55, 89, 144, 233, 377, 610])
            .unwrap();
        original.save(&path).unwrap();
        let loaded = PositionMap::load(&path).unwrap();

        assert_eq!(loaded, original);
        assert_eq!(loaded.find(610).unwrap(), 10);
    }

    #[test]
    fn test_from_json_rejects_non_numeric_key() {
        let err = PositionMap::from_json(r#"{"zero": 1}"#).unwrap_err();
        assert!(matches!(err, Error::InvalidData(_)));
    }

    #[test]
    fn test_from_json_rejects_duplicate_item() {
        assert!(PositionMap::from_json(r#"{"0": 1, "1": 1}"#).is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        assert!(PositionMap::load(&dir.path().join("none.json")).is_err());
    }
}
