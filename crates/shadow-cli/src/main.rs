use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

mod commands;
mod output;

#[derive(Parser)]
#[command(
    name = "shadow",
    version,
    about = "Drive an evolving belief ecology with an encrypted, persistent identity"
)]
struct Cli {
    /// Increase verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Output format
    #[arg(long, global = true, default_value = "text")]
    format: output::OutputFormat,

    /// Override the configured mode
    #[arg(long, global = true)]
    mode: Option<commands::CliMode>,

    #[command(subcommand)]
    command: commands::Commands,
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.command {
        commands::Commands::Init => commands::init::run(cli.mode, cli.format),
        commands::Commands::Ingest(args) => commands::ingest::run(args, cli.mode, cli.format),
        commands::Commands::Inspect => commands::inspect::run(cli.mode, cli.format),
        commands::Commands::Beliefs(args) => commands::beliefs::run(args, cli.mode, cli.format),
        commands::Commands::Version => commands::version::run(),
    }
}
