use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use shadow_sdk::Thread;
use shadow_vault::IdentityLock;

use super::CliMode;
use crate::output::format::format_ingest;
use crate::output::OutputFormat;

#[derive(Args)]
pub struct IngestArgs {
    /// Thread file: {"messages": [{"role": "user", "content": "..."}]}
    pub thread: PathBuf,

    /// Write one JSON line per message to this file
    #[arg(long)]
    pub trace: Option<PathBuf>,
}

pub fn run(args: &IngestArgs, mode: Option<CliMode>, format: OutputFormat) -> Result<()> {
    let thread = Thread::load(&args.thread)
        .with_context(|| format!("Failed to read thread '{}'", args.thread.display()))?;

    let config = super::load_config(mode)?;
    let _lock = if config.mode.is_persistent() {
        Some(
            IdentityLock::acquire(&config.vault_dir, &config.identity_id)
                .context("Failed to lock identity")?,
        )
    } else {
        None
    };

    let mut shadow = super::open_shadow(&config)?;
    let (report, trace) = shadow.ingest(&thread).context("Ingest failed")?;

    if let Some(path) = &args.trace {
        trace
            .write_jsonl(path)
            .with_context(|| format!("Failed to write trace '{}'", path.display()))?;
        tracing::info!("Wrote {} trace frames to {}", trace.len(), path.display());
    }

    println!("{}", format_ingest(&report, format));
    Ok(())
}
