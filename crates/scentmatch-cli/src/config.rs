//! Configuration for the `scentmatch` CLI.
//!
//! Provides the [`ScentConfig`] struct that loads from TOML files,
//! environment variables, and defaults using the `confyg` crate.
//!
//! # Loading Priority
//!
//! 1. Explicit `--config <path>` flag
//! 2. `SCENTMATCH_CONFIG` environment variable
//! 3. XDG default: `~/.config/scentmatch/config.toml`
//! 4. Built-in defaults
//!
//! String fields can be overridden from the environment as
//! `SCENTMATCH_<SECTION>_<KEY>`, e.g. `SCENTMATCH_EMBEDDING_MODEL`.

use confyg::{Confygery, env};
use scentmatch_core::traits::ConfigProvider;
use scentmatch_core::util::paths::{default_data_dir, expand_tilde};
use scentmatch_core::{ArtifactPaths, Error, Result};
use scentmatch_vector::VectorConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ============================================================================
// Configuration structs
// ============================================================================

/// Main configuration for the CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScentConfig {
    /// Project name, used in log lines.
    pub project_name: String,

    /// Artifact and catalog locations.
    pub data: DataConfig,

    /// Embedding provider settings.
    pub embedding: VectorConfig,

    /// Query defaults.
    pub recommend: RecommendConfig,
}

/// Where the catalog and index artifacts live.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Directory for the index artifacts (defaults to the XDG data dir).
    pub dir: Option<String>,

    /// Item catalog JSON file (defaults to `<dir>/items.json`).
    pub catalog: Option<String>,

    /// Index file name inside `dir`.
    pub index_file: String,

    /// Mapping file name inside `dir`.
    pub mapping_file: String,

    /// Metadata file name inside `dir`.
    pub metadata_file: String,
}

/// Query defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendConfig {
    /// Results returned when `-k` is not given.
    pub top_k: usize,
}

// ============================================================================
// Default implementations
// ============================================================================

impl Default for ScentConfig {
    fn default() -> Self {
        Self {
            project_name: "scentmatch".to_string(),
            data: DataConfig::default(),
            embedding: VectorConfig::default(),
            recommend: RecommendConfig::default(),
        }
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            dir: None,
            catalog: None,
            index_file: "scent_index.bin".to_string(),
            mapping_file: "scent_mapping.json".to_string(),
            metadata_file: "scent_index_meta.json".to_string(),
        }
    }
}

impl Default for RecommendConfig {
    fn default() -> Self {
        Self { top_k: 5 }
    }
}

// ============================================================================
// Config loading
// ============================================================================

impl ScentConfig {
    /// Load configuration from file, environment, and defaults.
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut builder =
            Confygery::new().map_err(|e| Error::config(format!("config init: {e}")))?;

        if let Some(path) = Self::resolve_config_path(config_path) {
            if path.exists() {
                builder
                    .add_file(&path.to_string_lossy())
                    .map_err(|e| Error::config(format!("config file: {e}")))?;
            }
        }

        let mut env_opts = env::Options::with_top_level("SCENTMATCH");
        env_opts.add_section("data");
        env_opts.add_section("embedding");
        env_opts.add_section("recommend");
        builder
            .add_env(env_opts)
            .map_err(|e| Error::config(format!("config env: {e}")))?;

        let config: Self = builder
            .build()
            .map_err(|e| Error::config(format!("config build: {e}")))?;

        Ok(config)
    }

    /// Resolve the config file path from explicit flag, env var, or XDG default.
    pub fn resolve_config_path(explicit: Option<&str>) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return Some(PathBuf::from(path));
        }

        if let Ok(path) = std::env::var("SCENTMATCH_CONFIG") {
            return Some(PathBuf::from(path));
        }

        Self::default_config_path()
    }

    /// Return the XDG default config path.
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("scentmatch").join("config.toml"))
    }

    /// Serialize this config to a pretty-printed TOML string.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::config(e.to_string()))
    }

    /// Flatten this config into environment variable pairs with `SCENTMATCH_` prefix.
    pub fn to_env_vars(&self) -> Result<Vec<(String, String)>> {
        let value: toml::Value =
            toml::Value::try_from(self).map_err(|e| Error::config(e.to_string()))?;
        let mut vars = Vec::new();
        flatten_toml_value(&value, "SCENTMATCH", &mut vars);
        Ok(vars)
    }
}

// ============================================================================
// ConfigProvider implementation
// ============================================================================

impl ConfigProvider for ScentConfig {
    fn project_name(&self) -> &str {
        &self.project_name
    }

    fn data_dir(&self) -> Result<PathBuf> {
        match &self.data.dir {
            Some(dir) => Ok(expand_tilde(dir)),
            None => default_data_dir()
                .ok_or_else(|| Error::config("Could not determine data directory; set data.dir")),
        }
    }

    fn catalog_path(&self) -> Result<PathBuf> {
        match &self.data.catalog {
            Some(path) => Ok(expand_tilde(path)),
            None => Ok(self.data_dir()?.join("items.json")),
        }
    }

    fn artifact_paths(&self) -> Result<ArtifactPaths> {
        let dir = self.data_dir()?;
        Ok(ArtifactPaths {
            index: dir.join(&self.data.index_file),
            mapping: dir.join(&self.data.mapping_file),
            metadata: dir.join(&self.data.metadata_file),
        })
    }
}

// ============================================================================
// Helper: flatten TOML to env vars
// ============================================================================

/// Recursively flatten a TOML value into `KEY=value` pairs.
fn flatten_toml_value(value: &toml::Value, prefix: &str, out: &mut Vec<(String, String)>) {
    match value {
        toml::Value::Table(table) => {
            for (key, val) in table {
                let env_key = format!("{}_{}", prefix, key.to_uppercase());
                flatten_toml_value(val, &env_key, out);
            }
        }
        toml::Value::Array(arr) => {
            if let Ok(json) = serde_json::to_string(arr) {
                out.push((prefix.to_string(), json));
            }
        }
        toml::Value::String(s) => out.push((prefix.to_string(), s.clone())),
        toml::Value::Integer(i) => out.push((prefix.to_string(), i.to_string())),
        toml::Value::Float(f) => out.push((prefix.to_string(), f.to_string())),
        toml::Value::Boolean(b) => out.push((prefix.to_string(), b.to_string())),
        toml::Value::Datetime(dt) => out.push((prefix.to_string(), dt.to_string())),
    }
}

// ============================================================================
// Tests
// ============================================================================
