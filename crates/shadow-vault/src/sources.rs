use std::process::Command;

use shadow_core::Mode;

use crate::error::VaultError;

/// Fixed challenge sent to the hardware token, so the same token always
/// answers the same way.
pub const TOKEN_CHALLENGE: &[u8] = b"shadowecology-master-key-salt-v1";
/// HMAC-SHA1 response length in bytes.
pub const TOKEN_RESPONSE_LEN: usize = 20;
/// Environment variable holding the passphrase for non-interactive use.
pub const PASSPHRASE_ENV: &str = "SHADOWECOLOGY_PASSPHRASE";

/// Supplies the hardware-token half of the master key material.
pub trait TokenSource: Send + Sync {
    fn response(&self) -> Result<Vec<u8>, VaultError>;
}

/// Supplies the passphrase half of the master key material.
pub trait PassphraseSource: Send + Sync {
    fn passphrase(&self) -> Result<String, VaultError>;
}

/// Challenge-response against slot 2 of a YubiKey through the `ykman` CLI.
#[derive(Debug, Clone)]
pub struct YkmanToken {
    program: String,
    slot: u8,
}

impl Default for YkmanToken {
    fn default() -> Self {
        Self {
            program: "ykman".to_string(),
            slot: 2,
        }
    }
}

impl YkmanToken {
    pub fn new(program: impl Into<String>, slot: u8) -> Self {
        Self {
            program: program.into(),
            slot,
        }
    }
}

impl TokenSource for YkmanToken {
    fn response(&self) -> Result<Vec<u8>, VaultError> {
        let output = Command::new(&self.program)
            .args(["otp", "chalresp", "--totp"])
            .arg(self.slot.to_string())
            .arg(hex::encode(TOKEN_CHALLENGE))
            .output()
            .map_err(|e| VaultError::Token(format!("failed to run {}: {e}", self.program)))?;

        if !output.status.success() {
            return Err(VaultError::Token(format!(
                "no token detected or slot {} not configured",
                self.slot
            )));
        }
        parse_token_response(&String::from_utf8_lossy(&output.stdout))
    }
}

/// Decode the 40 hex characters a token prints for a 20-byte response.
pub fn parse_token_response(raw: &str) -> Result<Vec<u8>, VaultError> {
    let raw = raw.trim();
    if raw.len() != TOKEN_RESPONSE_LEN * 2 {
        return Err(VaultError::Token(format!(
            "expected {} hex characters, got {}",
            TOKEN_RESPONSE_LEN * 2,
            raw.len()
        )));
    }
    hex::decode(raw).map_err(|e| VaultError::Token(format!("invalid response: {e}")))
}

/// Stand-in for the hardware token in dev mode: twenty zero bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct DevToken;

impl TokenSource for DevToken {
    fn response(&self) -> Result<Vec<u8>, VaultError> {
        Ok(vec![0u8; TOKEN_RESPONSE_LEN])
    }
}

/// The token source a persistent mode uses. Demo never derives keys.
pub fn token_for_mode(mode: Mode) -> Box<dyn TokenSource> {
    match mode {
        Mode::Dev | Mode::Demo => Box::new(DevToken),
        Mode::Real => Box::new(YkmanToken::default()),
    }
}

/// Reads the passphrase from `SHADOWECOLOGY_PASSPHRASE`.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvPassphrase;

impl PassphraseSource for EnvPassphrase {
    fn passphrase(&self) -> Result<String, VaultError> {
        std::env::var(PASSPHRASE_ENV)
            .map_err(|_| VaultError::Passphrase(format!("{PASSPHRASE_ENV} is not set")))
    }
}

/// A passphrase known up front.
#[derive(Clone)]
pub struct FixedPassphrase(String);

impl FixedPassphrase {
    pub fn new(passphrase: impl Into<String>) -> Self {
        Self(passphrase.into())
    }
}

impl std::fmt::Debug for FixedPassphrase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("FixedPassphrase(..)")
    }
}

impl PassphraseSource for FixedPassphrase {
    fn passphrase(&self) -> Result<String, VaultError> {
        Ok(self.0.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_challenge_hex() {
        assert_eq!(
            hex::encode(TOKEN_CHALLENGE),
            "736861646f7765636f6c6f67792d6d61737465722d6b65792d73616c742d7631"
        );
    }

    #[test]
    fn test_parse_token_response() {
        let raw = "00112233445566778899aabbccddeeff00112233\n";
        assert_eq!(parse_token_response(raw).unwrap().len(), TOKEN_RESPONSE_LEN);
        assert!(matches!(parse_token_response("abcd"), Err(VaultError::Token(_))));
        assert!(matches!(
            parse_token_response("zz112233445566778899aabbccddeeff00112233"),
            Err(VaultError::Token(_))
        ));
        assert!(matches!(parse_token_response(""), Err(VaultError::Token(_))));
    }

    #[test]
    fn test_dev_token() {
        assert_eq!(DevToken.response().unwrap(), vec![0u8; 20]);
    }

    #[test]
    fn test_missing_program_is_token_error() {
        let token = YkmanToken::new("shadowecology-no-such-binary", 2);
        assert!(matches!(token.response(), Err(VaultError::Token(_))));
    }

    #[test]
    fn test_fixed_passphrase_debug_redacted() {
        let p = FixedPassphrase::new("hunter2");
        assert_eq!(p.passphrase().unwrap(), "hunter2");
        assert!(!format!("{p:?}").contains("hunter2"));
    }
}
