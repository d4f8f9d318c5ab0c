//! Cross-process sync lock.
//!
//! An advisory `flock` on a file beside the database. Every process that
//! opens the same database agrees on the file, so at most one of them runs a
//! sync pass at a time. The lock is released when the guard drops, and by
//! the OS if the process dies.

use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use super::StoreError;

/// Held exclusive sync lock.
#[derive(Debug)]
pub struct PassLock {
    file: File,
    path: PathBuf,
}

impl PassLock {
    /// Try to take the lock without waiting.
    ///
    /// Returns `Ok(None)` when another holder has it.
    pub fn try_acquire(path: &Path) -> Result<Option<Self>, StoreError> {
        let lock_error = |source| StoreError::Lock {
            path: path.to_path_buf(),
            source,
        };

        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .open(path)
            .map_err(lock_error)?;

        match file.try_lock_exclusive() {
            Ok(()) => Ok(Some(Self {
                file,
                path: path.to_path_buf(),
            })),
            Err(e) if e.raw_os_error() == fs2::lock_contended_error().raw_os_error() => Ok(None),
            Err(e) => Err(lock_error(e)),
        }
    }

    /// Path of the lock file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for PassLock {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            tracing::warn!("Failed to release sync lock {}: {}", self.path.display(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_holder_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("transactions.db.lock");

        let first = PassLock::try_acquire(&path).unwrap();
        assert!(first.is_some());
        assert!(PassLock::try_acquire(&path).unwrap().is_none());
    }

    #[test]
    fn lock_is_released_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("transactions.db.lock");

        let first = PassLock::try_acquire(&path).unwrap().unwrap();
        assert_eq!(first.path(), path.as_path());
        drop(first);

        assert!(PassLock::try_acquire(&path).unwrap().is_some());
    }

    #[test]
    fn unopenable_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing-dir").join("x.lock");

        assert!(matches!(
            PassLock::try_acquire(&path),
            Err(StoreError::Lock { .. })
        ));
    }
}
