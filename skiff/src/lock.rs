//! Advisory file locking for the allocation store and binding mutations.
//!
//! One zero-length lock file serializes every port-related mutation
//! across skiff invocations: exclusive for writes (allocation, removal,
//! any binding change), shared for read-only listing. The lock is
//! advisory and cooperative: it protects nothing from tools that mutate
//! the container runtime directly.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use fs2::FileExt;

use crate::error::Result;

/// Handle to the on-disk lock file.
///
/// Acquisition blocks until the lock is granted. Commands are short-lived
/// CLI invocations, so whole-process serialization is acceptable and no
/// polling or timeout machinery is needed.
#[derive(Debug, Clone)]
pub struct LockFile {
    path: PathBuf,
}

impl LockFile {
    /// Create a handle for the lock file at `path`.
    ///
    /// Nothing is opened or created until a lock is requested.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The path this handle locks.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Block until the exclusive lock is held.
    ///
    /// Required around any mutation of the allocation store or of a
    /// binding.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the lock file cannot be created or locked;
    /// the protected operation must not proceed in that case.
    pub fn exclusive(&self) -> Result<LockGuard> {
        let file = self.open()?;
        FileExt::lock_exclusive(&file)?;
        Ok(LockGuard { file })
    }

    /// Block until a shared lock is held.
    ///
    /// Used for read-only listing of the allocation store; multiple
    /// readers may hold it concurrently, but it excludes any writer.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the lock file cannot be created or locked.
    pub fn shared(&self) -> Result<LockGuard> {
        let file = self.open()?;
        FileExt::lock_shared(&file)?;
        Ok(LockGuard { file })
    }

    fn open(&self) -> Result<File> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.path)?;
        Ok(file)
    }
}

/// Scoped lock held on the lock file.
///
/// The lock is released when the guard is dropped, whether the protected
/// operation succeeded or failed.
#[derive(Debug)]
pub struct LockGuard {
    file: File,
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        // Releasing a lock we hold cannot meaningfully fail; the file
        // descriptor closes right after anyway.
        let _ = FileExt::unlock(&self.file);
    }
}
