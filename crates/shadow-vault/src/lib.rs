//! Encrypted persistence for identity records.
//!
//! Keys come from a passphrase and a hardware token response (PBKDF2), are
//! expanded per identity (HKDF-Expand), and seal records with AES-256-GCM.
//! Files are replaced atomically.
//!
//! # Example
//! ```no_run
//! use shadow_vault::{DevToken, EnvPassphrase, KeyRing, Vault};
//!
//! let keys = KeyRing::new(Box::new(DevToken), Box::new(EnvPassphrase));
//! let vault = Vault::new("./state", keys);
//! let record = vault.load_or_create("shadow_main").unwrap();
//! vault.save_atomic(&record.increment_step()).unwrap();
//! ```

pub mod cipher;
pub mod error;
pub mod keys;
pub mod lock;
pub mod sources;
pub mod store;

pub use error::VaultError;
pub use keys::{derive_identity_key, derive_master_key, KeyRing, MasterKey};
pub use lock::IdentityLock;
pub use sources::{
    token_for_mode, DevToken, EnvPassphrase, FixedPassphrase, PassphraseSource, TokenSource, YkmanToken,
};
pub use store::Vault;
