//! Core traits for ScentMatch applications.
//!
//! The primary trait is [`ConfigProvider`], which abstracts where the
//! engine's artifacts and item catalog live.

use std::path::PathBuf;

use crate::Result;
use crate::types::ArtifactPaths;

/// Trait for application configuration.
///
/// Every ScentMatch front end implements this trait to tell the engine
/// where its data lives.
///
/// # Bounds
///
/// - `Send + Sync`: Configuration must be shareable across threads
/// - `Clone`: Configuration can be duplicated for passing to subsystems
/// - `'static`: Configuration lifetime is not borrowed
///
/// # Example
///
/// ```
/// use std::path::PathBuf;
/// use scentmatch_core::traits::ConfigProvider;
/// use scentmatch_core::Result;
///
/// #[derive(Clone)]
/// struct StaticConfig {
///     data_dir: PathBuf,
/// }
///
/// impl ConfigProvider for StaticConfig {
///     fn project_name(&self) -> &str {
///         "scentmatch"
///     }
///
///     fn data_dir(&self) -> Result<PathBuf> {
///         Ok(self.data_dir.clone())
///     }
///
///     fn catalog_path(&self) -> Result<PathBuf> {
///         Ok(self.data_dir.join("items.json"))
///     }
/// }
///
/// let config = StaticConfig { data_dir: PathBuf::from("/data") };
/// assert_eq!(
///     config.artifact_paths().unwrap().mapping,
///     PathBuf::from("/data/scent_mapping.json")
/// );
/// ```
pub trait ConfigProvider: Send + Sync + Clone + 'static {
    /// The project name, used in log lines and default paths.
    fn project_name(&self) -> &str;

    /// Directory holding the persisted index artifacts.
    fn data_dir(&self) -> Result<PathBuf>;

    /// JSON file holding the item catalog.
    fn catalog_path(&self) -> Result<PathBuf>;

    /// Index, mapping, and metadata locations.
    ///
    /// Default: the standard file names inside [`data_dir`](Self::data_dir).
    fn artifact_paths(&self) -> Result<ArtifactPaths> {
        Ok(ArtifactPaths::in_dir(self.data_dir()?))
    }
}
