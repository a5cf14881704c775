pub mod beliefs;
pub mod ingest;
pub mod init;
pub mod inspect;
pub mod version;

use std::io::{BufRead as _, Write as _};

use anyhow::{Context, Result};
use clap::Subcommand;
use shadow_core::{Mode, ShadowConfig};
use shadow_sdk::{EnvPassphrase, PassphraseSource, Shadow};
use shadow_vault::VaultError;

#[derive(Subcommand)]
pub enum Commands {
    /// Load or create the identity and show it
    Init,
    /// Feed a conversation thread through the belief ecology
    Ingest(ingest::IngestArgs),
    /// Show step, lattice size, trait biases and tension
    Inspect,
    /// List beliefs by confidence
    Beliefs(beliefs::BeliefsArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliMode {
    Real,
    Dev,
    Demo,
}

impl From<CliMode> for Mode {
    fn from(mode: CliMode) -> Self {
        match mode {
            CliMode::Real => Mode::Real,
            CliMode::Dev => Mode::Dev,
            CliMode::Demo => Mode::Demo,
        }
    }
}

/// Configuration from file and environment, with the `--mode` flag on top.
pub fn load_config(mode: Option<CliMode>) -> Result<ShadowConfig> {
    let mut config = ShadowConfig::load().context("Failed to load configuration")?;
    if let Some(mode) = mode {
        config.mode = mode.into();
    }
    Ok(config)
}

pub fn open_shadow(config: &ShadowConfig) -> Result<Shadow> {
    Shadow::from_config(config, passphrase_source())
        .with_context(|| format!("Failed to open identity '{}'", config.identity_id))
}

fn passphrase_source() -> Box<dyn PassphraseSource> {
    if std::env::var_os(shadow_vault::sources::PASSPHRASE_ENV).is_some() {
        Box::new(EnvPassphrase)
    } else {
        Box::new(PromptPassphrase)
    }
}

/// Asks for the passphrase on stderr and reads one line from stdin.
struct PromptPassphrase;

impl PassphraseSource for PromptPassphrase {
    fn passphrase(&self) -> Result<String, VaultError> {
        let mut stderr = std::io::stderr();
        write!(stderr, "Passphrase: ")?;
        stderr.flush()?;

        let mut line = String::new();
        let read = std::io::stdin().lock().read_line(&mut line)?;
        if read == 0 {
            return Err(VaultError::Passphrase("no passphrase on stdin".into()));
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }
}
