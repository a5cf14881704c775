use std::sync::OnceLock;

use hmac::{Hmac, Mac};
use sha2::Sha512;

use crate::error::VaultError;
use crate::sources::{PassphraseSource, TokenSource};

pub const KEY_LEN: usize = 32;
pub const PBKDF2_ROUNDS: u32 = 100_000;
/// Bytes of the token response used as PBKDF2 salt.
pub const SALT_LEN: usize = 16;
pub const IDENTITY_INFO_PREFIX: &str = "shadowecology-v1-";

type HmacSha512 = Hmac<Sha512>;

/// 32-byte master key. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct MasterKey([u8; KEY_LEN]);

impl MasterKey {
    pub fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl std::fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("MasterKey(..)")
    }
}

/// PBKDF2-HMAC-SHA512 over `passphrase ++ token_response`, salted with the
/// first 16 bytes of the token response.
pub fn derive_master_key(passphrase: &str, token_response: &[u8]) -> Result<MasterKey, VaultError> {
    if token_response.len() < SALT_LEN {
        return Err(VaultError::KeyDerivation(format!(
            "token response must be at least {SALT_LEN} bytes, got {}",
            token_response.len()
        )));
    }
    let mut material = Vec::with_capacity(passphrase.len() + token_response.len());
    material.extend_from_slice(passphrase.as_bytes());
    material.extend_from_slice(token_response);

    let mut key = [0u8; KEY_LEN];
    pbkdf2::pbkdf2_hmac::<Sha512>(&material, &token_response[..SALT_LEN], PBKDF2_ROUNDS, &mut key);
    Ok(MasterKey(key))
}

/// HKDF-Expand-SHA512 of the master key with info `shadowecology-v1-<id>`.
///
/// One output block is enough for 32 bytes, so this is the first 32 bytes of
/// `HMAC-SHA512(master, info || 0x01)`.
pub fn derive_identity_key(master: &MasterKey, identity_id: &str) -> Result<[u8; KEY_LEN], VaultError> {
    let mut mac = <HmacSha512 as Mac>::new_from_slice(master.as_bytes())
        .map_err(|e| VaultError::KeyDerivation(e.to_string()))?;
    mac.update(IDENTITY_INFO_PREFIX.as_bytes());
    mac.update(identity_id.as_bytes());
    mac.update(&[0x01]);
    let block = mac.finalize().into_bytes();

    let mut key = [0u8; KEY_LEN];
    key.copy_from_slice(&block[..KEY_LEN]);
    Ok(key)
}

/// Owns the key material sources and caches the master key, so the
/// passphrase and token are consulted at most once.
pub struct KeyRing {
    token: Box<dyn TokenSource>,
    passphrase: Box<dyn PassphraseSource>,
    master: OnceLock<MasterKey>,
}

impl KeyRing {
    pub fn new(token: Box<dyn TokenSource>, passphrase: Box<dyn PassphraseSource>) -> Self {
        Self {
            token,
            passphrase,
            master: OnceLock::new(),
        }
    }

    /// A key ring with the master key already known. Sources are never consulted.
    pub fn with_master_key(master: MasterKey) -> Self {
        let cell = OnceLock::new();
        let _ = cell.set(master);
        Self {
            token: Box::new(crate::sources::DevToken),
            passphrase: Box::new(crate::sources::FixedPassphrase::new(String::new())),
            master: cell,
        }
    }

    pub fn master_key(&self) -> Result<MasterKey, VaultError> {
        if let Some(key) = self.master.get() {
            return Ok(key.clone());
        }
        let passphrase = self.passphrase.passphrase()?;
        let response = self.token.response()?;
        let key = derive_master_key(&passphrase, &response)?;
        tracing::debug!("Master key derived");
        Ok(self.master.get_or_init(|| key).clone())
    }

    pub fn identity_key(&self, identity_id: &str) -> Result<[u8; KEY_LEN], VaultError> {
        derive_identity_key(&self.master_key()?, identity_id)
    }
}

impl std::fmt::Debug for KeyRing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyRing")
            .field("cached", &self.master.get().is_some())
            .finish()
    }
}
