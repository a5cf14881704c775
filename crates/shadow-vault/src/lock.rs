use std::fs;
use std::path::{Path, PathBuf};

use fs2::FileExt;
use shadow_core::identity::validate_identity_id;

use crate::error::VaultError;

/// Advisory exclusive lock on `<dir>/<id>.lock`, held until dropped.
///
/// The engine itself never locks; hosts that may run more than one writer
/// per identity take this around each ingest.
#[derive(Debug)]
pub struct IdentityLock {
    file: fs::File,
    path: PathBuf,
}

impl IdentityLock {
    fn open(dir: &Path, identity_id: &str) -> Result<(fs::File, PathBuf), VaultError> {
        validate_identity_id(identity_id).map_err(|_| VaultError::InvalidId(identity_id.to_string()))?;
        fs::create_dir_all(dir)?;
        let path = dir.join(format!("{identity_id}.lock"));
        let file = fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)?;
        Ok((file, path))
    }

    /// Block until the lock is ours.
    pub fn acquire(dir: &Path, identity_id: &str) -> Result<Self, VaultError> {
        let (file, path) = Self::open(dir, identity_id)?;
        FileExt::lock_exclusive(&file)?;
        Ok(Self { file, path })
    }

    /// Take the lock if free; `Ok(None)` when another holder has it.
    pub fn try_acquire(dir: &Path, identity_id: &str) -> Result<Option<Self>, VaultError> {
        let (file, path) = Self::open(dir, identity_id)?;
        match FileExt::try_lock_exclusive(&file) {
            Ok(()) => Ok(Some(Self { file, path })),
            Err(e) if e.kind() == fs2::lock_contended_error().kind() => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for IdentityLock {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            tracing::warn!("Failed to release {}: {e}", self.path.display());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_lock_excludes_second_holder() {
        let tmp = TempDir::new().unwrap();
        let held = IdentityLock::acquire(tmp.path(), "shadow_main").unwrap();
        assert!(held.path().ends_with("shadow_main.lock"));
        assert!(IdentityLock::try_acquire(tmp.path(), "shadow_main").unwrap().is_none());

        drop(held);
        assert!(IdentityLock::try_acquire(tmp.path(), "shadow_main").unwrap().is_some());
    }

    #[test]
    fn test_locks_are_per_identity() {
        let tmp = TempDir::new().unwrap();
        let _a = IdentityLock::acquire(tmp.path(), "a").unwrap();
        assert!(IdentityLock::try_acquire(tmp.path(), "b").unwrap().is_some());
    }

    #[test]
    fn test_invalid_id() {
        let tmp = TempDir::new().unwrap();
        assert!(matches!(
            IdentityLock::acquire(tmp.path(), "a/b"),
            Err(VaultError::InvalidId(_))
        ));
    }
}
