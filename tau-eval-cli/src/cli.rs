use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "tau-eval", version)]
#[command(about = "Partial-credit scoring for agent tool calls", long_about = None)]
pub struct Cli {
    /// Log filter, overriding RUST_LOG (e.g. `debug`, `tau_eval=trace`)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Score a results file against its gold actions
    Score(ScoreArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ScoreArgs {
    /// Path to the JSON results file
    pub input: PathBuf,

    /// Output file (default: input name with a `_partial` suffix)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Include per-action match details and print the per-task table
    #[arg(short, long)]
    pub verbose: bool,

    /// Skip printing statistics
    #[arg(long)]
    pub no_stats: bool,

    /// TOML config file; flags below override its values
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Weight for the tool name; arguments get the remainder
    #[arg(long, conflicts_with = "equal_split")]
    pub name_weight: Option<f64>,

    /// Split credit 50/50 between tool name and arguments
    #[arg(long)]
    pub equal_split: bool,

    /// Let one tool call satisfy several expected actions
    #[arg(long)]
    pub allow_reuse: bool,

    /// Compare scalars without coercing numeric strings
    #[arg(long)]
    pub strict_types: bool,

    /// Share of the original reward in the blended partial reward
    #[arg(long)]
    pub reward_blend: Option<f64>,

    /// What to write to the output file
    #[arg(long, value_enum, default_value_t = EmitFormat::Report)]
    pub emit: EmitFormat,

    /// Score tasks on a single thread
    #[arg(long)]
    pub sequential: bool,
}

/// Output document kinds
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum EmitFormat {
    /// Summary statistics plus one entry per task
    Report,
    /// The input records with `partial_score` added
    Annotated,
}

/// `results.json` -> `results_partial.json`
pub fn default_output_path(input: &Path) -> PathBuf {
    let file_name = input.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
    let stem = file_name.strip_suffix(".json").unwrap_or(&file_name);
    input.with_file_name(format!("{}_partial.json", stem))
}
