use thiserror::Error;

#[derive(Error, Debug)]
pub enum VaultError {
    #[error("Authentication failed: wrong key or tampered vault file")]
    Authentication,

    #[error("No vault file for identity '{id}'")]
    NotFound { id: String },

    #[error("Corrupt vault file: {0}")]
    Corrupt(String),

    #[error("Key derivation failed: {0}")]
    KeyDerivation(String),

    #[error("Hardware token error: {0}")]
    Token(String),

    #[error("Passphrase unavailable: {0}")]
    Passphrase(String),

    #[error("Invalid identity ID: {0}")]
    InvalidId(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Core(#[from] shadow_core::CoreError),
}
