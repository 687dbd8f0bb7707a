use anyhow::Result;
use clap::Parser;
use tau_eval_cli::cli::{Cli, Commands};
use tau_eval_cli::{commands, telemetry};

fn main() -> Result<()> {
    let cli = Cli::parse();
    telemetry::init_logging(cli.log_level.as_deref())?;

    match cli.command {
        Commands::Score(args) => commands::score(&args),
    }
}
