use anyhow::Result;

use super::CliMode;
use crate::output::format::format_identity;
use crate::output::OutputFormat;

pub fn run(mode: Option<CliMode>, format: OutputFormat) -> Result<()> {
    let config = super::load_config(mode)?;
    let shadow = super::open_shadow(&config)?;
    println!(
        "{}",
        format_identity(shadow.identity(), shadow.mode().as_str(), format)
    );
    Ok(())
}
