//! Utility modules for file operations, locking, and path handling.
//!
//! # Modules
//!
//! - [`files`]: Atomic writes and path-annotated reads
//! - [`lock`]: Advisory writer lock for maintenance operations
//! - [`paths`]: Tilde expansion and default locations

pub mod files;
pub mod lock;
pub mod paths;
