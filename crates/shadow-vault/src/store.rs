use std::fs;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use shadow_core::identity::validate_identity_id;
use shadow_core::IdentityRecord;

use crate::cipher;
use crate::error::VaultError;
use crate::keys::KeyRing;

const SEALED_EXT: &str = "identity.enc";
const TMP_EXT: &str = "identity.tmp";

/// Encrypted identity store: one sealed file per identity in a directory.
#[derive(Debug)]
pub struct Vault {
    dir: PathBuf,
    keys: KeyRing,
}

impl Vault {
    pub fn new(dir: impl Into<PathBuf>, keys: KeyRing) -> Self {
        Self {
            dir: dir.into(),
            keys,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the sealed file for an identity.
    pub fn path_for(&self, identity_id: &str) -> Result<PathBuf, VaultError> {
        validate_identity_id(identity_id).map_err(|_| VaultError::InvalidId(identity_id.to_string()))?;
        Ok(self.dir.join(format!("{identity_id}.{SEALED_EXT}")))
    }

    pub fn exists(&self, identity_id: &str) -> Result<bool, VaultError> {
        Ok(self.path_for(identity_id)?.exists())
    }

    /// Seal and commit a record: write a temp file, flush and fsync it, then
    /// rename it over the target. A crash leaves either the old or the new
    /// file, never a torn one.
    pub fn save_atomic(&self, record: &IdentityRecord) -> Result<(), VaultError> {
        let identity_id = record.identity_id();
        let final_path = self.path_for(identity_id)?;
        let tmp_path = self.dir.join(format!("{identity_id}.{TMP_EXT}"));

        let key = self.keys.identity_key(identity_id)?;
        let blob = cipher::seal(&key, &record.to_bytes()?)?;

        fs::create_dir_all(&self.dir)?;
        if let Err(e) = write_and_rename(&tmp_path, &final_path, &blob) {
            if let Err(cleanup) = fs::remove_file(&tmp_path) {
                tracing::debug!("Temp file cleanup skipped: {cleanup}");
            }
            return Err(e.into());
        }
        sync_dir(&self.dir);

        tracing::info!(identity = identity_id, step = record.step(), "Identity committed to vault");
        Ok(())
    }

    pub fn load(&self, identity_id: &str) -> Result<IdentityRecord, VaultError> {
        let path = self.path_for(identity_id)?;
        let blob = match fs::read(&path) {
            Ok(blob) => blob,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(VaultError::NotFound {
                    id: identity_id.to_string(),
                })
            }
            Err(e) => return Err(e.into()),
        };

        let key = self.keys.identity_key(identity_id)?;
        let plaintext = cipher::open(&key, &blob)?;
        let record = IdentityRecord::from_bytes(&plaintext)?;
        if record.identity_id() != identity_id {
            return Err(VaultError::Corrupt(format!(
                "file for '{identity_id}' holds identity '{}'",
                record.identity_id()
            )));
        }
        Ok(record)
    }

    /// Load an identity, or create, commit and return a fresh one when no
    /// file exists yet.
    pub fn load_or_create(&self, identity_id: &str) -> Result<IdentityRecord, VaultError> {
        match self.load(identity_id) {
            Err(VaultError::NotFound { .. }) => {
                let record = IdentityRecord::fresh(identity_id)?;
                self.save_atomic(&record)?;
                tracing::info!(identity = identity_id, "Created fresh identity");
                Ok(record)
            }
            other => other,
        }
    }
}

fn write_and_rename(tmp_path: &Path, final_path: &Path, blob: &[u8]) -> std::io::Result<()> {
    let mut file = fs::File::create(tmp_path)?;
    file.write_all(blob)?;
    file.flush()?;
    file.sync_all()?;
    drop(file);
    fs::rename(tmp_path, final_path)
}

/// Make the rename durable. Not every platform can open a directory for
/// syncing; failures are ignored.
fn sync_dir(dir: &Path) {
    if let Ok(handle) = fs::File::open(dir) {
        if let Err(e) = handle.sync_all() {
            tracing::debug!("Directory fsync skipped: {e}");
        }
    }
}
