use anyhow::Result;

use super::CliMode;
use crate::output::format::format_inspect;
use crate::output::OutputFormat;

pub fn run(mode: Option<CliMode>, format: OutputFormat) -> Result<()> {
    let config = super::load_config(mode)?;
    let shadow = super::open_shadow(&config)?;
    println!(
        "{}",
        format_inspect(shadow.identity(), &shadow.biases(), &shadow.tension(), format)
    );
    Ok(())
}
