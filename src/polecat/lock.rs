//! Rig-scoped advisory lock
//!
//! Serializes mutations of a rig's polecats across threads and processes.
//! The lock is an exclusive `flock` on `<rig>/.polecats.lock`, released when
//! the guard is dropped (or the holding process dies).

use crate::{GastownError, Result};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// Lock file name under the rig root
pub const LOCK_FILE: &str = ".polecats.lock";

/// Held rig lock; unlocks on drop
#[derive(Debug)]
pub struct RigLock {
    file: File,
    path: PathBuf,
}

impl RigLock {
    /// Path of the lock file for a rig
    pub fn path_for(rig_path: &Path) -> PathBuf {
        rig_path.join(LOCK_FILE)
    }

    /// Block until the rig lock is held
    pub fn acquire(rig_path: &Path) -> Result<Self> {
        let path = Self::path_for(rig_path);

        std::fs::create_dir_all(rig_path).map_err(|source| GastownError::Lock {
            path: path.clone(),
            source,
        })?;

        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .read(true)
            .write(true)
            .open(&path)
            .map_err(|source| GastownError::Lock {
                path: path.clone(),
                source,
            })?;

        file.lock_exclusive().map_err(|source| GastownError::Lock {
            path: path.clone(),
            source,
        })?;

        let mut lock = Self { file, path };
        lock.record_holder();
        tracing::trace!(path = %lock.path.display(), "Acquired rig lock");
        Ok(lock)
    }

    /// Try to take the rig lock without blocking
    ///
    /// Returns `Ok(None)` if another holder has it.
    pub fn try_acquire(rig_path: &Path) -> Result<Option<Self>> {
        let path = Self::path_for(rig_path);

        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .read(true)
            .write(true)
            .open(&path)
            .map_err(|source| GastownError::Lock {
                path: path.clone(),
                source,
            })?;

        match file.try_lock_exclusive() {
            Ok(()) => {
                let mut lock = Self { file, path };
                lock.record_holder();
                Ok(Some(lock))
            }
            Err(e) if e.kind() == fs2::lock_contended_error().kind() => Ok(None),
            Err(source) => Err(GastownError::Lock { path, source }),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    // Holder info is diagnostics only; failing to write it is not an error.
    fn record_holder(&mut self) {
        let host = hostname::get()
            .map(|h| h.to_string_lossy().into_owned())
            .unwrap_or_else(|_| "unknown".to_string());
        let holder = format!("{}@{}\n", std::process::id(), host);

        let written = self
            .file
            .set_len(0)
            .and_then(|_| self.file.seek(SeekFrom::Start(0)))
            .and_then(|_| self.file.write_all(holder.as_bytes()));
        if let Err(e) = written {
            tracing::debug!(error = %e, path = %self.path.display(), "Could not record lock holder");
        }
    }
}

impl Drop for RigLock {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            tracing::warn!(error = %e, path = %self.path.display(), "Failed to release rig lock");
        }
    }
}
