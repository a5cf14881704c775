use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::mode::Mode;
use crate::error::CoreError;
use crate::identity::{validate_identity_id, DEFAULT_IDENTITY_ID};

/// Environment variable naming the config file.
pub const CONFIG_PATH_ENV: &str = "SHADOWECOLOGY_CONFIG";
/// Config file used when `SHADOWECOLOGY_CONFIG` is unset.
pub const DEFAULT_CONFIG_PATH: &str = "shadowecology.toml";
/// Prefix for per-field environment overrides, e.g. `SHADOWECOLOGY_MODE=dev`.
pub const ENV_PREFIX: &str = "SHADOWECOLOGY";

/// Process configuration. Precedence: environment > config file > defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShadowConfig {
    pub mode: Mode,
    /// Identity used by persistent modes.
    pub identity_id: String,
    /// Directory holding `<id>.identity.enc` files.
    pub vault_dir: PathBuf,
    /// Initial confidence for beliefs taken from user messages.
    pub user_confidence: f64,
    /// Initial confidence for beliefs taken from assistant messages.
    pub assistant_confidence: f64,
}

impl Default for ShadowConfig {
    fn default() -> Self {
        Self {
            mode: Mode::Real,
            identity_id: DEFAULT_IDENTITY_ID.to_string(),
            vault_dir: PathBuf::from("./state"),
            user_confidence: 0.9,
            assistant_confidence: 0.8,
        }
    }
}

impl ShadowConfig {
    /// Load from the config file named by `SHADOWECOLOGY_CONFIG` (if it
    /// exists) and the process environment.
    pub fn load() -> Result<Self, CoreError> {
        let config_path =
            std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_with(Some(Path::new(&config_path)), None)
    }

    /// Load with an explicit file and, optionally, a fixed environment map in
    /// place of the process environment.
    pub fn load_with(
        path: Option<&Path>,
        env: Option<config::Map<String, String>>,
    ) -> Result<Self, CoreError> {
        let defaults = Self::default();
        let builder = config::Config::builder()
            .set_default("mode", defaults.mode.as_str())?
            .set_default("identity_id", defaults.identity_id.as_str())?
            .set_default("vault_dir", defaults.vault_dir.to_string_lossy().into_owned())?
            .set_default("user_confidence", defaults.user_confidence)?
            .set_default("assistant_confidence", defaults.assistant_confidence)?;

        let builder = match path {
            Some(path) if path.exists() => builder.add_source(config::File::from(path)),
            _ => builder,
        };

        let built = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .source(env),
            )
            .build()?;

        let loaded: Self = built.try_deserialize()?;
        loaded.validate()?;
        Ok(loaded)
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        validate_identity_id(&self.identity_id)?;
        for (name, value) in [
            ("user_confidence", self.user_confidence),
            ("assistant_confidence", self.assistant_confidence),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(CoreError::Validation(format!(
                    "{name} must be within [0, 1], got {value}"
                )));
            }
        }
        Ok(())
    }
}
