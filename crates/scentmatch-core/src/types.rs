//! Domain value types shared by every ScentMatch crate.
//!
//! Items are owned by an external catalog; the engine only reads them.
//! All types here are plain immutable values with serde support.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::{Error, Result};

/// Stable external identifier of an item (catalog primary key).
pub type ItemId = i64;

// ============================================================================
// Gender
// ============================================================================

/// Category attribute used for filtering recommendations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    /// Marketed for men.
    Male,
    /// Marketed for women.
    Female,
    /// Marketed for anyone, or unknown.
    #[default]
    Unisex,
}

impl Gender {
    /// Canonical display name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Male => "Male",
            Self::Female => "Female",
            Self::Unisex => "Unisex",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "male" | "men" | "m" => Ok(Self::Male),
            "female" | "women" | "f" => Ok(Self::Female),
            "unisex" | "u" => Ok(Self::Unisex),
            other => Err(Error::invalid_data(format!(
                "Unknown gender: '{other}'. Expected male, female, or unisex"
            ))),
        }
    }
}

// ============================================================================
// Item
// ============================================================================

/// A fragrance record as provided by the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Stable identifier.
    pub id: ItemId,

    /// Product name.
    pub name: String,

    /// Brand or house.
    pub brand: String,

    /// Composition notes, in catalog enumeration order.
    #[serde(default)]
    pub notes: Vec<String>,

    /// Category attribute.
    #[serde(default)]
    pub gender: Gender,

    /// Source page, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl Item {
    /// Create an item with no notes and the default gender.
    pub fn new(id: ItemId, name: impl Into<String>, brand: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            brand: brand.into(),
            notes: Vec::new(),
            gender: Gender::default(),
            url: None,
        }
    }

    /// Set the notes.
    pub fn with_notes<I, S>(mut self, notes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.notes = notes.into_iter().map(Into::into).collect();
        self
    }

    /// Set the gender.
    pub fn with_gender(mut self, gender: Gender) -> Self {
        self.gender = gender;
        self
    }

    /// Set the source url.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Whether the item carries anything worth embedding.
    pub fn has_profile(&self) -> bool {
        !self.name.trim().is_empty() || !self.notes.is_empty()
    }
}

// ============================================================================
// Recommendation
// ============================================================================

/// One ranked recommendation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    /// The recommended item.
    pub item: Item,

    /// Bounded match percentage, 0 to 100.
    #[serde(rename = "match")]
    pub match_percent: u8,

    /// Raw inner-product score.
    pub score: f32,
}

// ============================================================================
// Artifact paths
// ============================================================================

/// Locations of the persisted index artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    /// Binary vector index.
    pub index: PathBuf,
    /// JSON position → item id mapping.
    pub mapping: PathBuf,
    /// JSON build metadata (freshness sidecar).
    pub metadata: PathBuf,
}

impl ArtifactPaths {
    /// Default file names inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            index: dir.join("scent_index.bin"),
            mapping: dir.join("scent_mapping.json"),
            metadata: dir.join("scent_index_meta.json"),
        }
    }

    /// Advisory lock file guarding writers of this artifact set.
    pub fn lock_path(&self) -> PathBuf {
        self.index.with_extension("lock")
    }
}
