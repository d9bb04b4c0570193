//! Advisory writer lock for the index artifact set.
//!
//! Maintenance operations (full build, incremental add) take an exclusive
//! `fs2` lock on a sidecar file so that two writer processes never interleave
//! their index and mapping writes. Readers do not lock.

use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// Who holds the lock, written into the lock file for diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockHolder {
    /// Process id of the holder.
    pub pid: u32,
    /// When the lock was taken.
    pub acquired_at: DateTime<Utc>,
}

/// Exclusive advisory lock, released on drop.
#[derive(Debug)]
pub struct WriterLock {
    file: File,
    path: PathBuf,
}

impl WriterLock {
    /// Acquire the lock, blocking until it is free.
    pub fn acquire(path: &Path) -> Result<Self> {
        let file = open_lock_file(path)?;
        file.lock_exclusive()
            .map_err(|e| Error::io_with_path(e, path))?;
        Ok(Self::locked(file, path))
    }

    /// Try to acquire the lock without blocking.
    ///
    /// Returns `Ok(None)` if another process holds it.
    pub fn try_acquire(path: &Path) -> Result<Option<Self>> {
        let file = open_lock_file(path)?;
        match file.try_lock_exclusive() {
            Ok(()) => Ok(Some(Self::locked(file, path))),
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                log::debug!("Writer lock {:?} held by another process", path);
                Ok(None)
            }
            Err(e) => Err(Error::io_with_path(e, path)),
        }
    }

    /// Path of the lock file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn locked(mut file: File, path: &Path) -> Self {
        let holder = LockHolder {
            pid: std::process::id(),
            acquired_at: Utc::now(),
        };
        // Holder info is diagnostic only.
        if let Ok(json) = serde_json::to_vec(&holder) {
            let _ = file.set_len(0);
            let _ = file.seek(SeekFrom::Start(0));
            let _ = file.write_all(&json);
        }
        log::debug!("Acquired writer lock at {:?}", path);
        Self {
            file,
            path: path.to_path_buf(),
        }
    }
}

impl Drop for WriterLock {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            log::warn!("Failed to release writer lock {:?}: {e}", self.path);
        }
    }
}

fn open_lock_file(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| Error::io_with_path(e, parent))?;
    }
    OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)
        .map_err(|e| Error::io_with_path(e, path))
}
