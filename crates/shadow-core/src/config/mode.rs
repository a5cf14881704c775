use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Operating mode, resolved once per process.
///
/// - `Real`: vault keyed by passphrase plus hardware token response.
/// - `Dev`: vault keyed by passphrase and a fixed all-zero token.
/// - `Demo`: fresh throwaway identity, nothing touches disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Mode {
    #[default]
    Real,
    Dev,
    Demo,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Real => "real",
            Mode::Dev => "dev",
            Mode::Demo => "demo",
        }
    }

    /// Whether identities in this mode are loaded from and committed to the vault.
    pub fn is_persistent(&self) -> bool {
        !matches!(self, Mode::Demo)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "real" => Ok(Mode::Real),
            "dev" => Ok(Mode::Dev),
            "demo" => Ok(Mode::Demo),
            other => Err(CoreError::Validation(format!(
                "unknown mode '{other}' (expected real, dev or demo)"
            ))),
        }
    }
}

impl TryFrom<String> for Mode {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Mode> for String {
    fn from(mode: Mode) -> Self {
        mode.as_str().to_string()
    }
}
