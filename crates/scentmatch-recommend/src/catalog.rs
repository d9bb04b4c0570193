//! Item catalog abstraction.
//!
//! Item records live in an external store. The engine needs two things from
//! it: every item in a fixed order (for builds) and batch lookup by id (for
//! decorating results). [`ItemCatalog`] is that seam; [`InMemoryCatalog`]
//! is the bundled implementation, loadable from a JSON array file.

use async_trait::async_trait;
use scentmatch_core::util::files::read_string;
use scentmatch_core::{Error, Item, ItemId, Result};
use std::collections::BTreeMap;
use std::path::Path;

/// Read access to item records.
#[async_trait]
pub trait ItemCatalog: Send + Sync {
    /// Every item, in the order builds should assign positions.
    async fn items(&self) -> Result<Vec<Item>>;

    /// The items among `ids` that exist, in any order.
    async fn get_many(&self, ids: &[ItemId]) -> Result<Vec<Item>>;

    /// A single item, or `None` if it does not exist.
    async fn get(&self, id: ItemId) -> Result<Option<Item>> {
        Ok(self.get_many(&[id]).await?.into_iter().next())
    }

    /// Catalog name for diagnostics.
    fn name(&self) -> &str;
}

/// Catalog held entirely in memory, ordered by ascending item id.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    items: BTreeMap<ItemId, Item>,
}

impl InMemoryCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from items, rejecting duplicate ids.
    pub fn from_items(items: impl IntoIterator<Item = Item>) -> Result<Self> {
        let mut catalog = Self::new();
        for item in items {
            if catalog.items.contains_key(&item.id) {
                return Err(Error::invalid_data(format!(
                    "duplicate item id {} in catalog",
                    item.id
                )));
            }
            catalog.items.insert(item.id, item);
        }
        Ok(catalog)
    }

    /// Parse a JSON array of items.
    pub fn from_json(json: &str) -> Result<Self> {
        let items: Vec<Item> = serde_json::from_str(json)?;
        Self::from_items(items)
    }

    /// Load a JSON array of items from `path`.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let catalog = Self::from_json(&read_string(path)?)?;
        log::debug!("Loaded {} items from {:?}", catalog.len(), path);
        Ok(catalog)
    }

    /// Insert or replace an item, returning the previous record.
    pub fn insert(&mut self, item: Item) -> Option<Item> {
        self.items.insert(item.id, item)
    }

    /// Up to `limit` items in id order.
    pub fn list(&self, limit: usize) -> Vec<&Item> {
        self.items.values().take(limit).collect()
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[async_trait]
impl ItemCatalog for InMemoryCatalog {
    async fn items(&self) -> Result<Vec<Item>> {
        Ok(self.items.values().cloned().collect())
    }

    async fn get_many(&self, ids: &[ItemId]) -> Result<Vec<Item>> {
        Ok(ids
            .iter()
            .filter_map(|id| self.items.get(id).cloned())
            .collect())
    }

    fn name(&self) -> &str {
        "in-memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scentmatch_core::Gender;
    use tempfile::TempDir;

    fn sample() -> InMemoryCatalog {
        InMemoryCatalog::from_items([
            Item::new(3, "Gamma", "C"),
            Item::new(1, "Alpha", "A"),
            Item::new(2, "Beta", "B"),
        ])
        .unwrap()
    }

    #[tokio::test]
    async fn test_items_in_id_order() {
        let ids: Vec<ItemId> = sample().items().await.unwrap().iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_get_many_skips_missing() {
        let found = sample().get_many(&[2, 99, 1]).await.unwrap();
        let ids: Vec<ItemId> = found.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[tokio::test]
    async fn test_get() {
        let catalog = sample();
        assert_eq!(catalog.get(1).await.unwrap().unwrap().name, "Alpha");
        assert!(catalog.get(42).await.unwrap().is_none());
    }

    #[test]
    fn test_from_items_rejects_duplicates() {
        let result = InMemoryCatalog::from_items([Item::new(1, "A", "X"), Item::new(1, "B", "Y")]);
        assert!(result.is_err());
    }

    #[test]
    fn test_list_limit() {
        let catalog = sample();
        assert_eq!(catalog.list(2).len(), 2);
        assert_eq!(catalog.list(50).len(), 3);
        assert_eq!(catalog.list(2)[0].id, 1);
    }

    #[test]
    fn test_insert_replaces() {
        let mut catalog = sample();
        let previous = catalog.insert(Item::new(1, "Alpha II", "A"));
        assert_eq!(previous.unwrap().name, "Alpha");
        assert_eq!(catalog.len(), 3);
    }

    #[test]
    fn test_from_json_defaults() {
        let catalog = InMemoryCatalog::from_json(
            r#"[{"id": 7, "name": "Iris", "brand": "Maison", "notes": ["iris"], "gender": "Female"},
                {"id": 8, "name": "Plain", "brand": "Maison"}]"#,
        )
        .unwrap();

        let plain = catalog.list(10)[1].clone();
        assert!(plain.notes.is_empty());
        assert_eq!(plain.gender, Gender::Unisex);
        assert_eq!(catalog.list(10)[0].gender, Gender::Female);
    }

    #[test]
    fn test_from_json_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("items.json");
        std::fs::write(&path, r#"[{"id": 1, "name": "A", "brand": "B"}]"#).unwrap();

        let catalog = InMemoryCatalog::from_json_file(&path).unwrap();
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn test_from_json_file_missing() {
        let dir = TempDir::new().unwrap();
        assert!(InMemoryCatalog::from_json_file(&dir.path().join("nope.json")).is_err());
    }
}
