//! # tau-eval
//!
//! Partial-credit scoring of agent tool calls.
//!
//! Benchmarks such as tau-bench grade a run with a binary reward: the final
//! database state is either right or wrong. This crate adds a graded signal by
//! matching the tool calls an agent actually made against the task's gold
//! actions, crediting the right tool name and, for the right tool, how closely
//! the arguments agree.
//!
//! ## Features
//!
//! - **Extraction**: Pull normalized tool calls out of recorded trajectories
//! - **Structural similarity**: Recursive argument comparison over nested
//!   mappings, sequences and scalars
//! - **Greedy matching**: One-to-one (or reusable) assignment of calls to gold
//!   actions with configurable name/argument weights
//! - **Batch reports**: Parallel scoring of results files with dataset statistics
//!
//! ## Quick Start
//!
//! ```rust
//! use tau_eval::{ExpectedAction, PartialCreditScorer, ToolInvocation};
//! use serde_json::json;
//!
//! let expected = vec![
//!     ExpectedAction::new("update_user").with_kwargs(json!({"email": "a@b.com", "age": 30})),
//! ];
//! let actual = vec![
//!     ToolInvocation::new("update_user").with_args(json!({"email": "a@b.com", "age": 99})),
//! ];
//!
//! let result = PartialCreditScorer::new().score_task(&expected, &actual);
//! assert!((result.score - 0.7).abs() < 1e-9);
//! ```

pub mod criteria;
pub mod error;
pub mod evaluator;
pub mod extract;
pub mod report;
pub mod schema;
pub mod scoring;
pub mod similarity;
pub mod task;
pub mod value;

// Re-exports
pub use criteria::{ReusePolicy, ScalarCoercion, ScoringConfig, SimilarityConfig};
pub use error::{ArgumentDecodeError, EvalError, GroundTruthError, Result};
pub use evaluator::{EvaluationConfig, MatchBreakdown, TaskEvaluation, TaskEvaluator};
pub use extract::{decode_arguments, extract_tool_calls};
pub use report::{EvaluationReport, EvaluationSummary, FlaggedCase, ScoreBucket, annotate_records};
pub use schema::{ExpectedAction, RawArguments, ToolCallRecord, ToolInvocation, Turn};
pub use scoring::{MatchResult, MatchedInvocation, PartialCreditScorer, TaskScore};
pub use similarity::SimilarityEngine;
pub use task::{GroundTruthLocator, TaskRecord};
pub use value::{ArgMap, ArgValue, ValueKind};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::criteria::{ReusePolicy, ScalarCoercion, ScoringConfig};
    pub use crate::error::{EvalError, Result};
    pub use crate::evaluator::{EvaluationConfig, TaskEvaluation, TaskEvaluator};
    pub use crate::extract::extract_tool_calls;
    pub use crate::report::EvaluationReport;
    pub use crate::schema::{ExpectedAction, ToolInvocation, Turn};
    pub use crate::scoring::{PartialCreditScorer, TaskScore};
    pub use crate::task::TaskRecord;
}
