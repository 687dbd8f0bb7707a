//! Benchmark task records and ground-truth lookup
//!
//! A results file is a JSON array of task records. Each record carries the
//! recorded trajectory, the binary reward of the run, and an `info` object
//! whose layout depends on the dataset that produced it.
//!
//! Records are read one at a time. A record that cannot be read is kept in
//! place and marked invalid, so one bad entry never costs the rest of the file.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

use crate::error::{EvalError, GroundTruthError, Result};
use crate::schema::{ExpectedAction, Turn, lenient_vec};

/// Pointer to the gold actions in scored reward info
pub const REWARD_INFO_ACTIONS: &str = "/info/reward_info/actions";

/// Pointer to the gold actions in the embedded task definition
pub const TASK_ACTIONS: &str = "/info/task/actions";

/// One evaluated task from a results file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskRecord {
    /// Task identifier, numeric or textual
    #[serde(default)]
    pub task_id: Value,
    /// Binary reward assigned by the benchmark
    #[serde(default, deserialize_with = "reward_value")]
    pub reward: f64,
    /// Dataset-specific run information
    #[serde(default)]
    pub info: Value,
    /// Recorded conversation
    #[serde(default, deserialize_with = "lenient_vec")]
    pub traj: Vec<Turn>,
    /// Any other fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
    /// Why the record could not be read; such a record scores zero
    #[serde(skip)]
    pub invalid: Option<String>,
}

impl TaskRecord {
    /// Load every record from a results file
    pub fn load_all(path: impl AsRef<Path>) -> Result<Vec<TaskRecord>> {
        Ok(Self::load_values(path)?.into_iter().map(Self::from_value).collect())
    }

    /// Parse records from a JSON array
    pub fn parse_all(content: &str) -> Result<Vec<TaskRecord>> {
        Ok(Self::parse_values(content)?.into_iter().map(Self::from_value).collect())
    }

    /// Load the raw entries of a results file
    pub fn load_values(path: impl AsRef<Path>) -> Result<Vec<Value>> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::parse_values(&content)
    }

    /// Split a JSON array into its raw entries.
    ///
    /// Only the outer document must be well formed; entries are not inspected.
    pub fn parse_values(content: &str) -> Result<Vec<Value>> {
        match serde_json::from_str(content)? {
            Value::Array(items) => Ok(items),
            other => Err(EvalError::ParseError(format!(
                "expected a JSON array of task records, found {}",
                json_type_name(&other)
            ))),
        }
    }

    /// Read one record. Never fails: an unreadable record comes back marked
    /// invalid, keeping whatever `task_id` it carries.
    pub fn from_value(value: Value) -> TaskRecord {
        let task_id = value.get("task_id").cloned().unwrap_or_default();
        match serde_json::from_value::<TaskRecord>(value) {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(task_id = %task_id, error = %e, "unreadable task record");
                TaskRecord { task_id, invalid: Some(e.to_string()), ..Default::default() }
            }
        }
    }

    pub fn is_invalid(&self) -> bool {
        self.invalid.is_some()
    }

    /// Task id rendered for display
    pub fn display_id(&self) -> String {
        match &self.task_id {
            Value::String(s) => s.clone(),
            Value::Null => "?".to_string(),
            other => other.to_string(),
        }
    }

    /// Resolve a JSON pointer against this record
    pub fn pointer(&self, pointer: &str) -> Option<&Value> {
        let rest = pointer.strip_prefix('/')?;
        let (head, tail) = match rest.find('/') {
            Some(pos) => (&rest[..pos], &rest[pos..]),
            None => (rest, ""),
        };

        let root = match head {
            "info" => &self.info,
            "task_id" => &self.task_id,
            other => self.extra.get(other)?,
        };
        root.pointer(tail)
    }
}

/// Reward as a number; numeric text is accepted and null reads as zero
fn reward_value<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match Value::deserialize(deserializer)? {
        Value::Null => Ok(0.0),
        Value::Number(n) => n.as_f64().ok_or_else(|| D::Error::custom("reward is out of range")),
        Value::String(s) => s
            .trim()
            .parse()
            .map_err(|_| D::Error::custom(format!("reward '{}' is not a number", s))),
        other => Err(D::Error::custom(format!(
            "reward must be a number, found {}",
            json_type_name(&other)
        ))),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Finds a task's expected actions among several candidate locations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroundTruthLocator {
    /// JSON pointers searched in order; the first non-null hit wins
    pub paths: Vec<String>,
}

impl Default for GroundTruthLocator {
    fn default() -> Self {
        Self { paths: vec![REWARD_INFO_ACTIONS.to_string(), TASK_ACTIONS.to_string()] }
    }
}

impl GroundTruthLocator {
    /// Search only the given pointers
    pub fn with_paths<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { paths: paths.into_iter().map(Into::into).collect() }
    }

    pub fn validate(&self) -> Result<()> {
        if self.paths.is_empty() {
            return Err(EvalError::ConfigError("ground_truth.paths must not be empty".into()));
        }
        if let Some(bad) = self.paths.iter().find(|p| !p.starts_with('/')) {
            return Err(EvalError::ConfigError(format!(
                "ground truth path '{}' is not a JSON pointer (must start with '/')",
                bad
            )));
        }
        Ok(())
    }

    /// Locate and decode the expected actions of a task
    pub fn locate(
        &self,
        task: &TaskRecord,
    ) -> std::result::Result<Vec<ExpectedAction>, GroundTruthError> {
        if let Some(error) = task.info.get("error").filter(|e| !e.is_null()) {
            let message = match error {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            return Err(GroundTruthError::AgentError(message));
        }

        let found = self.paths.iter().find_map(|path| task.pointer(path).filter(|v| !v.is_null()));

        match found {
            Some(actions) => Vec::<ExpectedAction>::deserialize(actions)
                .map_err(|e| GroundTruthError::Malformed(e.to_string())),
            None => Err(GroundTruthError::Missing(self.paths.join(", "))),
        }
    }
}
