use anyhow::{Context, Result, bail};
use tau_eval::{TaskEvaluator, TaskRecord, annotate_records};

use crate::cli::{EmitFormat, ScoreArgs, default_output_path};
use crate::config;

/// Run the `score` subcommand
pub fn score(args: &ScoreArgs) -> Result<()> {
    let config = config::resolve(args)?;
    let evaluator = TaskEvaluator::new(config)?;

    if !args.input.exists() {
        bail!("File not found: {}", args.input.display());
    }

    println!("Processing: {}", args.input.display());
    let values = TaskRecord::load_values(&args.input)
        .with_context(|| format!("Invalid results file: {}", args.input.display()))?;
    let records: Vec<TaskRecord> = values.iter().cloned().map(TaskRecord::from_value).collect();

    let report =
        evaluator.evaluate_batch(&records).with_source(&args.input.display().to_string());

    if !args.no_stats {
        println!();
        print!("{}", report.format_summary());
    }

    if args.verbose {
        println!();
        println!("=== PER-TASK RESULTS ===");
        print!("{}", report.format_task_table());
    }

    let content = match args.emit {
        EmitFormat::Report => report.to_json()?,
        EmitFormat::Annotated => {
            serde_json::to_string_pretty(&annotate_records(&values, &report))?
        }
    };

    let output = args.output.clone().unwrap_or_else(|| default_output_path(&args.input));
    std::fs::write(&output, content)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    tracing::info!(output = %output.display(), "results written");
    println!();
    println!("Results saved to: {}", output.display());
    Ok(())
}
