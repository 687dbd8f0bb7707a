//! Evaluation reports and dataset-level statistics

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::Write as _;
use std::path::Path;

use crate::error::Result;
use crate::evaluator::TaskEvaluation;

/// Original reward above which a run counts as a binary success
pub const BINARY_SUCCESS_THRESHOLD: f64 = 0.9;

/// Half-open score buckets used for the distribution
pub const DISTRIBUTION_BUCKETS: [(f64, f64); 5] =
    [(0.0, 0.2), (0.2, 0.4), (0.4, 0.6), (0.6, 0.8), (0.8, 1.0)];

const MAX_LISTED_CASES: usize = 3;

/// Complete report for a scored results file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationReport {
    /// Unique run identifier
    pub run_id: String,
    /// File the tasks were read from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub summary: EvaluationSummary,
    pub tasks: Vec<TaskEvaluation>,
}

impl EvaluationReport {
    /// Create a new report
    pub fn new(tasks: Vec<TaskEvaluation>, started_at: DateTime<Utc>) -> Self {
        let summary = EvaluationSummary::from_results(&tasks);
        Self {
            run_id: uuid::Uuid::new_v4().to_string(),
            source: None,
            started_at,
            completed_at: Utc::now(),
            summary,
            tasks,
        }
    }

    /// Record the input file
    pub fn with_source(mut self, source: &str) -> Self {
        self.source = Some(source.to_string());
        self
    }

    /// Export to JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the report as pretty JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Render the statistics block
    pub fn format_summary(&self) -> String {
        let s = &self.summary;
        let mut out = String::new();

        let _ = writeln!(out, "=== SCORING STATISTICS ===");
        if let Some(source) = &self.source {
            let _ = writeln!(out, "File: {}", source);
        }
        let _ = writeln!(out, "Total tasks: {}", s.num_tasks);
        if s.errored > 0 {
            let _ = writeln!(out, "Unscorable tasks: {}", s.errored);
        }
        if s.num_tasks == 0 {
            return out;
        }

        let _ = writeln!(out);
        let _ = writeln!(out, "Binary Scoring:");
        let _ = writeln!(
            out,
            "  Success rate: {}/{} ({:.1}%)",
            s.binary_successes,
            s.num_tasks,
            percent(s.binary_successes, s.num_tasks)
        );
        let _ = writeln!(out, "  Average: {:.3}", s.avg_original_reward);

        let _ = writeln!(out);
        let _ = writeln!(out, "Partial Scoring:");
        let _ = writeln!(out, "  Average tool call reward: {:.3}", s.avg_tool_call_reward);
        let _ = writeln!(out, "  Average partial reward: {:.3}", s.avg_partial_reward);
        let _ = writeln!(out, "  Min: {:.3}", s.min_tool_call_reward);
        let _ = writeln!(out, "  Max: {:.3}", s.max_tool_call_reward);

        let _ = writeln!(out);
        let _ = writeln!(out, "Partial Score Distribution:");
        for bucket in &s.distribution {
            let _ = writeln!(
                out,
                "  [{:.1}-{:.1}): {:3} tasks ({:5.1}%)",
                bucket.low,
                bucket.high,
                bucket.count,
                percent(bucket.count, s.num_tasks)
            );
        }
        let _ = writeln!(
            out,
            "  [1.0]: {:3} tasks ({:5.1}%)",
            s.perfect,
            percent(s.perfect, s.num_tasks)
        );

        let interesting = [
            ("Binary fail but partial > 0.7", &s.high_partial_failures),
            ("Binary success but partial < 0.8", &s.low_partial_successes),
        ];
        if interesting.iter().any(|(_, cases)| !cases.is_empty()) {
            let _ = writeln!(out);
            let _ = writeln!(out, "Interesting Cases:");
            for (label, cases) in interesting {
                if cases.is_empty() {
                    continue;
                }
                let _ = writeln!(out, "  {}: {} tasks", label, cases.len());
                for case in cases.iter().take(MAX_LISTED_CASES) {
                    let _ = writeln!(
                        out,
                        "    Task {}: partial={:.2}",
                        display_id(&case.task_id),
                        case.tool_call_reward
                    );
                }
            }
        }

        out
    }

    /// Render one row per task
    pub fn format_task_table(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "{:<10} {:<10} {:<10} {:<10}",
            "Task ID", "Original", "Tool Call", "Partial"
        );
        let _ = writeln!(out, "{}", "-".repeat(40));
        for task in &self.tasks {
            let _ = write!(
                out,
                "{:<10} {:<10.4} {:<10.4} {:<10.4}",
                display_id(&task.task_id),
                task.original_reward,
                task.tool_call_reward,
                task.partial_reward
            );
            if let Some(error) = &task.error {
                let _ = write!(out, " ({})", error);
            }
            let _ = writeln!(out);
        }
        out
    }
}

fn percent(count: usize, total: usize) -> f64 {
    if total == 0 { 0.0 } else { count as f64 / total as f64 * 100.0 }
}

fn display_id(id: &Value) -> String {
    match id {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Dataset-level statistics over task evaluations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationSummary {
    pub num_tasks: usize,
    pub avg_original_reward: f64,
    pub avg_tool_call_reward: f64,
    pub avg_partial_reward: f64,
    pub min_tool_call_reward: f64,
    pub max_tool_call_reward: f64,
    /// Tasks whose original reward exceeds the success threshold
    pub binary_successes: usize,
    /// Tasks with a full tool-call reward
    pub perfect: usize,
    /// Tasks that could not be scored
    pub errored: usize,
    pub distribution: Vec<ScoreBucket>,
    /// Binary failures that still earned a tool-call reward above 0.7
    pub high_partial_failures: Vec<FlaggedCase>,
    /// Binary successes whose tool-call reward is below 0.8
    pub low_partial_successes: Vec<FlaggedCase>,
}

/// One task evaluation singled out by the summary.
///
/// Results files may hold several trials of one task, so a case is identified
/// by its position in the report rather than by `task_id` alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlaggedCase {
    /// Position in [`EvaluationReport::tasks`]
    pub index: usize,
    pub task_id: Value,
    pub original_reward: f64,
    pub tool_call_reward: f64,
}

/// Count of tasks whose tool-call reward falls in `[low, high)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBucket {
    pub low: f64,
    pub high: f64,
    pub count: usize,
}

impl EvaluationSummary {
    /// Create summary from results
    pub fn from_results(results: &[TaskEvaluation]) -> Self {
        let num_tasks = results.len();
        let mean = |f: fn(&TaskEvaluation) -> f64| {
            if num_tasks == 0 {
                0.0
            } else {
                results.iter().map(f).sum::<f64>() / num_tasks as f64
            }
        };

        let (min, max) = if num_tasks == 0 {
            (0.0, 0.0)
        } else {
            results
                .iter()
                .map(|r| r.tool_call_reward)
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), s| (lo.min(s), hi.max(s)))
        };

        let distribution = DISTRIBUTION_BUCKETS
            .iter()
            .map(|&(low, high)| ScoreBucket {
                low,
                high,
                count: results
                    .iter()
                    .filter(|r| r.tool_call_reward >= low && r.tool_call_reward < high)
                    .count(),
            })
            .collect();

        let cases_where = |pred: fn(&TaskEvaluation) -> bool| -> Vec<FlaggedCase> {
            results
                .iter()
                .enumerate()
                .filter(|(_, r)| pred(r))
                .map(|(index, r)| FlaggedCase {
                    index,
                    task_id: r.task_id.clone(),
                    original_reward: r.original_reward,
                    tool_call_reward: r.tool_call_reward,
                })
                .collect()
        };

        Self {
            num_tasks,
            avg_original_reward: mean(|r| r.original_reward),
            avg_tool_call_reward: mean(|r| r.tool_call_reward),
            avg_partial_reward: mean(|r| r.partial_reward),
            min_tool_call_reward: min,
            max_tool_call_reward: max,
            binary_successes: results
                .iter()
                .filter(|r| r.original_reward > BINARY_SUCCESS_THRESHOLD)
                .count(),
            perfect: results.iter().filter(|r| r.tool_call_reward >= 1.0).count(),
            errored: results.iter().filter(|r| r.is_error()).count(),
            distribution,
            high_partial_failures: cases_where(|r| {
                r.original_reward < 0.1 && r.tool_call_reward > 0.7
            }),
            low_partial_successes: cases_where(|r| {
                r.original_reward > BINARY_SUCCESS_THRESHOLD && r.tool_call_reward < 0.8
            }),
        }
    }
}

/// Copy the raw input records with `partial_score` added to each.
///
/// Records and evaluations are paired by position, so `report` must come from
/// scoring exactly `records`. Every other field is left as it was read;
/// entries that are not JSON objects are copied unchanged.
pub fn annotate_records(records: &[Value], report: &EvaluationReport) -> Vec<Value> {
    records
        .iter()
        .zip(&report.tasks)
        .map(|(record, evaluation)| {
            let mut value = record.clone();
            if let Value::Object(map) = &mut value {
                map.insert("partial_score".to_string(), Value::from(evaluation.tool_call_reward));
                if let Some(error) = &evaluation.error {
                    map.insert("partial_score_error".to_string(), Value::from(error.clone()));
                }
            }
            value
        })
        .collect()
}
