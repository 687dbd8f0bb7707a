//! Batch evaluator
//!
//! Ties extraction, ground-truth lookup and matching together for whole
//! results files. A task that cannot be scored is reported with a zero score
//! and an error marker; it never stops the rest of the batch.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

use crate::criteria::ScoringConfig;
use crate::error::{EvalError, Result};
use crate::extract::extract_tool_calls;
use crate::report::EvaluationReport;
use crate::schema::{ExpectedAction, ToolInvocation};
use crate::scoring::{MatchResult, PartialCreditScorer};
use crate::task::{GroundTruthLocator, TaskRecord};

/// Configuration for the evaluator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationConfig {
    /// Matching weights and policies
    pub scoring: ScoringConfig,
    /// Where to find each task's expected actions
    pub ground_truth: GroundTruthLocator,
    /// Share of the original binary reward in the blended partial reward
    pub reward_blend: f64,
    /// Whether to keep the per-action match breakdown
    pub verbose: bool,
    /// Score tasks on the rayon thread pool
    pub parallel: bool,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            scoring: ScoringConfig::default(),
            ground_truth: GroundTruthLocator::default(),
            reward_blend: 0.5,
            verbose: false,
            parallel: true,
        }
    }
}

impl EvaluationConfig {
    /// Create config with specific scoring settings
    pub fn with_scoring(scoring: ScoringConfig) -> Self {
        Self { scoring, ..Default::default() }
    }

    /// Load a TOML config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml(&content)
    }

    /// Parse TOML config text
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: EvaluationConfig =
            toml::from_str(content).map_err(|e| EvalError::ConfigError(e.to_string()))?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.scoring.validate()?;
        self.ground_truth.validate()?;
        if !(0.0..=1.0).contains(&self.reward_blend) {
            return Err(EvalError::ConfigError(format!(
                "reward_blend must be within [0, 1], got {}",
                self.reward_blend
            )));
        }
        Ok(())
    }
}

/// Scored outcome for one task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskEvaluation {
    pub task_id: Value,
    /// Binary reward recorded by the benchmark
    pub original_reward: f64,
    /// Partial-credit score from tool-call matching
    pub tool_call_reward: f64,
    /// Blend of the original and tool-call rewards
    pub partial_reward: f64,
    /// Why the task could not be scored, if it could not
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<MatchBreakdown>,
}

impl TaskEvaluation {
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Verbose matching details for a task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchBreakdown {
    pub expected_actions: Vec<ExpectedAction>,
    pub extracted_tool_calls: Vec<ToolInvocation>,
    pub matches: Vec<MatchResult>,
    /// Indices into `extracted_tool_calls` never bound to an expected action
    pub unmatched_invocations: Vec<usize>,
}

/// Scores task records against their expected actions
pub struct TaskEvaluator {
    config: EvaluationConfig,
    scorer: PartialCreditScorer,
}

impl TaskEvaluator {
    /// Create an evaluator, rejecting invalid configuration
    pub fn new(config: EvaluationConfig) -> Result<Self> {
        config.validate()?;
        let scorer = PartialCreditScorer::with_config(config.scoring.clone());
        Ok(Self { config, scorer })
    }

    pub fn config(&self) -> &EvaluationConfig {
        &self.config
    }

    /// Score a single task. Never fails; problems surface in `error`.
    pub fn evaluate_task(&self, task: &TaskRecord) -> TaskEvaluation {
        let original_reward = task.reward;

        if let Some(reason) = &task.invalid {
            return self.unscorable(task, format!("unreadable task record: {}", reason));
        }

        let expected = match self.config.ground_truth.locate(task) {
            Ok(actions) => actions,
            Err(e) => {
                tracing::warn!(
                    task_id = %task.display_id(),
                    error = %e,
                    "task has no usable ground truth"
                );
                return self.unscorable(task, e.to_string());
            }
        };

        let invocations = extract_tool_calls(&task.traj);
        let result = self.scorer.score_task(&expected, &invocations);

        tracing::debug!(
            task_id = %task.display_id(),
            expected = expected.len(),
            calls = invocations.len(),
            matched = result.matched_count(),
            score = result.score,
            "scored task"
        );

        let score = result.score;
        let details = self.config.verbose.then(|| MatchBreakdown {
            unmatched_invocations: result.unmatched_invocations(),
            expected_actions: expected,
            extracted_tool_calls: invocations,
            matches: result.matches,
        });

        TaskEvaluation {
            task_id: task.task_id.clone(),
            original_reward,
            tool_call_reward: score,
            partial_reward: self.blend(original_reward, score),
            error: None,
            details,
        }
    }

    /// Score every task, preserving input order
    pub fn evaluate_batch(&self, tasks: &[TaskRecord]) -> EvaluationReport {
        let started_at = chrono::Utc::now();
        let span = tracing::info_span!("evaluate_batch", tasks = tasks.len());
        let _guard = span.enter();

        let results: Vec<TaskEvaluation> = if self.config.parallel {
            tasks.par_iter().map(|task| self.evaluate_task(task)).collect()
        } else {
            tasks.iter().map(|task| self.evaluate_task(task)).collect()
        };

        let report = EvaluationReport::new(results, started_at);
        tracing::info!(
            run_id = %report.run_id,
            avg_tool_call_reward = report.summary.avg_tool_call_reward,
            errored = report.summary.errored,
            "batch scored"
        );
        report
    }

    /// Load a results file and score it
    pub fn evaluate_file(&self, path: impl AsRef<Path>) -> Result<EvaluationReport> {
        let tasks = TaskRecord::load_all(path.as_ref())?;
        let report = self.evaluate_batch(&tasks);
        Ok(report.with_source(&path.as_ref().display().to_string()))
    }

    fn unscorable(&self, task: &TaskRecord, error: String) -> TaskEvaluation {
        TaskEvaluation {
            task_id: task.task_id.clone(),
            original_reward: task.reward,
            tool_call_reward: 0.0,
            partial_reward: self.blend(task.reward, 0.0),
            error: Some(error),
            details: None,
        }
    }

    fn blend(&self, original: f64, tool_call: f64) -> f64 {
        let blend = self.config.reward_blend;
        blend * original + (1.0 - blend) * tool_call
    }
}
