use aes_gcm::aead::{Aead, AeadCore, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Key, Nonce};

use crate::error::VaultError;
use crate::keys::KEY_LEN;

pub const NONCE_LEN: usize = 12;
pub const TAG_LEN: usize = 16;

/// AES-256-GCM with a fresh random nonce and no associated data.
/// Returns `nonce || ciphertext || tag`.
pub fn seal(key: &[u8; KEY_LEN], plaintext: &[u8]) -> Result<Vec<u8>, VaultError> {
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));
    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
    let ciphertext = cipher
        .encrypt(&nonce, plaintext)
        .map_err(|_| VaultError::Corrupt("encryption failed".into()))?;

    let mut blob = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    blob.extend_from_slice(&nonce);
    blob.extend_from_slice(&ciphertext);
    Ok(blob)
}

/// Reverse of [`seal`]. Any tag mismatch is an authentication failure; no
/// partial plaintext is ever returned.
pub fn open(key: &[u8; KEY_LEN], blob: &[u8]) -> Result<Vec<u8>, VaultError> {
    if blob.len() < NONCE_LEN + TAG_LEN {
        return Err(VaultError::Corrupt(format!(
            "blob is {} bytes, shorter than nonce and tag",
            blob.len()
        )));
    }
    let (nonce, ciphertext) = blob.split_at(NONCE_LEN);
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));
    cipher
        .decrypt(Nonce::from_slice(nonce), ciphertext)
        .map_err(|_| VaultError::Authentication)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seal_open() {
        let key = [3u8; KEY_LEN];
        let blob = seal(&key, b"belief ecology").unwrap();
        assert_eq!(blob.len(), NONCE_LEN + 14 + TAG_LEN);
        assert_eq!(open(&key, &blob).unwrap(), b"belief ecology");
    }

    #[test]
    fn test_nonce_is_fresh() {
        let key = [3u8; KEY_LEN];
        assert_ne!(seal(&key, b"x").unwrap(), seal(&key, b"x").unwrap());
    }

    #[test]
    fn test_wrong_key_fails_authentication() {
        let blob = seal(&[1u8; KEY_LEN], b"secret").unwrap();
        assert!(matches!(open(&[2u8; KEY_LEN], &blob), Err(VaultError::Authentication)));
    }

    #[test]
    fn test_tampered_blob_fails_authentication() {
        let key = [1u8; KEY_LEN];
        let mut blob = seal(&key, b"secret").unwrap();
        let last = blob.len() - 1;
        blob[last] ^= 0x01;
        assert!(matches!(open(&key, &blob), Err(VaultError::Authentication)));
    }

    #[test]
    fn test_short_blob_is_corrupt() {
        assert!(matches!(open(&[1u8; KEY_LEN], &[0u8; 27]), Err(VaultError::Corrupt(_))));
    }
}
