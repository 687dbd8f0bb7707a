use anyhow::{Context, Result};
use tau_eval::{EvaluationConfig, ReusePolicy, ScalarCoercion};

use crate::cli::ScoreArgs;

/// Build the evaluation config: file values first, then command-line overrides
pub fn resolve(args: &ScoreArgs) -> Result<EvaluationConfig> {
    let mut config = match &args.config {
        Some(path) => EvaluationConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => EvaluationConfig::default(),
    };

    if args.equal_split {
        config.scoring = config.scoring.with_name_weight(0.5);
    }
    if let Some(weight) = args.name_weight {
        config.scoring = config.scoring.with_name_weight(weight);
    }
    if args.allow_reuse {
        config.scoring.reuse = ReusePolicy::AllowReuse;
    }
    if args.strict_types {
        config.scoring.similarity.scalar_coercion = ScalarCoercion::Strict;
    }
    if let Some(blend) = args.reward_blend {
        config.reward_blend = blend;
    }
    if args.verbose {
        config.verbose = true;
    }
    if args.sequential {
        config.parallel = false;
    }

    config.validate().context("Invalid scoring configuration")?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;
    use std::io::Write;

    fn args(extra: &[&str]) -> ScoreArgs {
        let argv = ["tau-eval", "score", "results.json"].iter().chain(extra);
        let Commands::Score(args) = Cli::parse_from(argv).command;
        args
    }

    #[test]
    fn test_defaults() {
        let config = resolve(&args(&[])).unwrap();
        assert_eq!(config, EvaluationConfig::default());
    }

    #[test]
    fn test_flag_overrides() {
        let config =
            resolve(&args(&["--name-weight", "0.3", "--allow-reuse", "--strict-types", "-v"]))
                .unwrap();
        assert_eq!(config.scoring.name_weight, 0.3);
        assert!((config.scoring.argument_weight - 0.7).abs() < 1e-12);
        assert_eq!(config.scoring.reuse, ReusePolicy::AllowReuse);
        assert_eq!(config.scoring.similarity.scalar_coercion, ScalarCoercion::Strict);
        assert!(config.verbose);
    }

    #[test]
    fn test_invalid_weight_rejected() {
        assert!(resolve(&args(&["--name-weight", "1.2"])).is_err());
        assert!(resolve(&args(&["--reward-blend", "1.5"])).is_err());
    }

    #[test]
    fn test_config_file_then_flags() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "reward_blend = 0.0\n\n[scoring]\nreuse = \"allow_reuse\"").unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let config = resolve(&args(&["--config", &path, "--equal-split"])).unwrap();
        assert_eq!(config.reward_blend, 0.0);
        assert_eq!(config.scoring.reuse, ReusePolicy::AllowReuse);
        assert_eq!(config.scoring.name_weight, 0.5);
    }
}
