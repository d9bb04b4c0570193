//! File utilities for persisted artifacts.
//!
//! Artifacts are replaced with write-temp-then-rename so that a reader never
//! observes a partially written file.

use std::fs;
use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::{Error, Result};

/// Atomically replace `path` with `contents`.
///
/// The data is written to a temporary file in the same directory, flushed to
/// disk, and renamed over the target. Missing parent directories are created.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent).map_err(|e| Error::io_with_path(e, parent))?;

    let mut tmp = NamedTempFile::new_in(parent).map_err(|e| Error::io_with_path(e, parent))?;
    tmp.write_all(contents)
        .map_err(|e| Error::io_with_path(e, tmp.path()))?;
    tmp.as_file()
        .sync_all()
        .map_err(|e| Error::io_with_path(e, tmp.path()))?;
    tmp.persist(path)
        .map_err(|e| Error::io_with_path(e.error, path))?;

    log::debug!("Wrote {} bytes to {:?}", contents.len(), path);
    Ok(())
}

/// Read a whole file, annotating errors with the path.
pub fn read_bytes(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|e| Error::io_with_path(e, path))
}

/// Read a whole file as UTF-8, annotating errors with the path.
pub fn read_string(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| Error::io_with_path(e, path))
}
