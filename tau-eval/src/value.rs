//! Argument value model
//!
//! Tool arguments and expected kwargs arrive as arbitrary JSON. They are
//! converted once into [`ArgValue`], a closed sum type the similarity engine
//! can match on exhaustively.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Mapping from argument name to value. Keys are unique; ordering carries no meaning.
pub type ArgMap = BTreeMap<String, ArgValue>;

/// A semi-structured argument value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub enum ArgValue {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    Sequence(Vec<ArgValue>),
    Mapping(ArgMap),
}

/// Structural kind of a value, used to short-circuit mismatched comparisons
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Scalar,
    Mapping,
    Sequence,
}

impl ArgValue {
    /// Empty mapping value
    pub fn empty_mapping() -> Self {
        ArgValue::Mapping(ArgMap::new())
    }

    /// Structural kind of this value
    pub fn kind(&self) -> ValueKind {
        match self {
            ArgValue::Null | ArgValue::Bool(_) | ArgValue::Number(_) | ArgValue::Text(_) => {
                ValueKind::Scalar
            }
            ArgValue::Sequence(_) => ValueKind::Sequence,
            ArgValue::Mapping(_) => ValueKind::Mapping,
        }
    }

    /// JSON type name, for diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            ArgValue::Null => "null",
            ArgValue::Bool(_) => "boolean",
            ArgValue::Number(_) => "number",
            ArgValue::Text(_) => "string",
            ArgValue::Sequence(_) => "array",
            ArgValue::Mapping(_) => "object",
        }
    }

    pub fn as_mapping(&self) -> Option<&ArgMap> {
        match self {
            ArgValue::Mapping(map) => Some(map),
            _ => None,
        }
    }
}

/// Largest magnitude below which every integer has an exact `f64`
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

impl From<Value> for ArgValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => ArgValue::Null,
            Value::Bool(b) => ArgValue::Bool(b),
            // Integers beyond 2^53 round to the nearest f64
            Value::Number(n) => ArgValue::Number(number_to_f64(&n)),
            Value::String(s) => ArgValue::Text(s),
            Value::Array(items) => {
                ArgValue::Sequence(items.into_iter().map(ArgValue::from).collect())
            }
            Value::Object(map) => {
                ArgValue::Mapping(map.into_iter().map(|(k, v)| (k, ArgValue::from(v))).collect())
            }
        }
    }
}

impl From<ArgValue> for Value {
    fn from(value: ArgValue) -> Self {
        match value {
            ArgValue::Null => Value::Null,
            ArgValue::Bool(b) => Value::Bool(b),
            ArgValue::Number(n) => {
                if n.is_finite() && n.fract() == 0.0 && n.abs() < MAX_EXACT_INTEGER {
                    Value::from(n as i64)
                } else {
                    serde_json::Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null)
                }
            }
            ArgValue::Text(s) => Value::String(s),
            ArgValue::Sequence(items) => Value::Array(items.into_iter().map(Value::from).collect()),
            ArgValue::Mapping(map) => {
                Value::Object(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

fn number_to_f64(n: &serde_json::Number) -> f64 {
    if let Some(i) = n.as_i64() {
        i as f64
    } else if let Some(u) = n.as_u64() {
        u as f64
    } else {
        n.as_f64().unwrap_or(f64::NAN)
    }
}

impl From<&str> for ArgValue {
    fn from(s: &str) -> Self {
        ArgValue::Text(s.to_string())
    }
}

impl From<String> for ArgValue {
    fn from(s: String) -> Self {
        ArgValue::Text(s)
    }
}

impl From<f64> for ArgValue {
    fn from(n: f64) -> Self {
        ArgValue::Number(n)
    }
}

impl From<i64> for ArgValue {
    fn from(n: i64) -> Self {
        ArgValue::Number(n as f64)
    }
}

impl From<bool> for ArgValue {
    fn from(b: bool) -> Self {
        ArgValue::Bool(b)
    }
}

impl From<ArgMap> for ArgValue {
    fn from(map: ArgMap) -> Self {
        ArgValue::Mapping(map)
    }
}
