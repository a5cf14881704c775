use shadow_core::identity::DEMO_IDENTITY_ID;
use shadow_core::{CoreError, IdentityRecord, Mode, ShadowConfig};
use shadow_vault::{token_for_mode, KeyRing, PassphraseSource, Vault};

use crate::error::SdkError;

/// Owns the mode and the single active identity.
///
/// Demo mode hands out a fresh throwaway record on every request and never
/// writes. Real and dev modes load (or create) through the vault once, then
/// serve from cache until the next commit.
#[derive(Debug)]
pub struct Lifecycle {
    mode: Mode,
    identity_id: String,
    vault: Option<Vault>,
    cache: Option<IdentityRecord>,
}

impl Lifecycle {
    pub fn demo() -> Self {
        Self {
            mode: Mode::Demo,
            identity_id: DEMO_IDENTITY_ID.to_string(),
            vault: None,
            cache: None,
        }
    }

    /// A real or dev lifecycle backed by `vault`.
    pub fn persistent(mode: Mode, identity_id: &str, vault: Vault) -> Result<Self, SdkError> {
        if !mode.is_persistent() {
            return Err(CoreError::Validation(format!("mode '{mode}' does not use a vault")).into());
        }
        shadow_core::identity::validate_identity_id(identity_id)?;
        Ok(Self {
            mode,
            identity_id: identity_id.to_string(),
            vault: Some(vault),
            cache: None,
        })
    }

    /// Build from configuration; the token source follows the mode.
    pub fn from_config(config: &ShadowConfig, passphrase: Box<dyn PassphraseSource>) -> Result<Self, SdkError> {
        if !config.mode.is_persistent() {
            return Ok(Self::demo());
        }
        let keys = KeyRing::new(token_for_mode(config.mode), passphrase);
        let vault = Vault::new(config.vault_dir.clone(), keys);
        Self::persistent(config.mode, &config.identity_id, vault)
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn identity_id(&self) -> &str {
        &self.identity_id
    }

    pub fn get_identity(&mut self) -> Result<IdentityRecord, SdkError> {
        let Some(vault) = &self.vault else {
            return Ok(IdentityRecord::fresh(DEMO_IDENTITY_ID)?);
        };
        if let Some(record) = &self.cache {
            return Ok(record.clone());
        }
        let record = vault.load_or_create(&self.identity_id)?;
        self.cache = Some(record.clone());
        Ok(record)
    }

    /// Commit a record atomically and make it the cached identity. No-op in demo mode.
    pub fn persist_identity(&mut self, record: IdentityRecord) -> Result<(), SdkError> {
        let Some(vault) = &self.vault else {
            return Ok(());
        };
        vault.save_atomic(&record)?;
        self.cache = Some(record);
        Ok(())
    }
}
