use anyhow::Result;
use clap::Args;
use shadow_core::model::BeliefNode;

use super::CliMode;
use crate::output::format::format_beliefs;
use crate::output::OutputFormat;

#[derive(Args)]
pub struct BeliefsArgs {
    /// Maximum number of beliefs to show
    #[arg(short = 'n', long, default_value = "20")]
    pub limit: usize,
}

pub fn run(args: &BeliefsArgs, mode: Option<CliMode>, format: OutputFormat) -> Result<()> {
    let config = super::load_config(mode)?;
    let shadow = super::open_shadow(&config)?;

    let mut nodes: Vec<&BeliefNode> = shadow.identity().lattice().nodes().collect();
    nodes.sort_by(|a, b| {
        b.confidence
            .total_cmp(&a.confidence)
            .then_with(|| a.created_step.cmp(&b.created_step))
    });
    nodes.truncate(args.limit);

    println!("{}", format_beliefs(&nodes, format));
    Ok(())
}
