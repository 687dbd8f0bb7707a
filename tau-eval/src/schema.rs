//! Trajectory and action schema definitions
//!
//! Mirrors the role-tagged message format of recorded benchmark runs. Every
//! field is optional on the way in, and a field of the wrong JSON type reads as
//! absent: a half-written trajectory must still load so that the remaining tool
//! calls can be scored.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::value::{ArgMap, ArgValue};

/// Role tag of agent-authored turns
pub const ASSISTANT_ROLE: &str = "assistant";

/// A single conversation turn in a recorded trajectory
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Turn {
    /// Role (user, assistant, tool, system)
    #[serde(default, deserialize_with = "lenient_string")]
    pub role: Option<String>,
    /// Free-form message content
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Value>,
    /// Tool calls issued in this turn, if any
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient_list")]
    pub tool_calls: Option<Vec<ToolCallRecord>>,
}

impl Turn {
    /// Create a turn with the given role
    pub fn new(role: &str) -> Self {
        Self { role: Some(role.to_string()), content: None, tool_calls: None }
    }

    /// Create an assistant turn carrying tool calls
    pub fn assistant_with_calls(calls: Vec<ToolCallRecord>) -> Self {
        Self { tool_calls: Some(calls), ..Self::new(ASSISTANT_ROLE) }
    }

    /// Attach text content
    pub fn with_content(mut self, content: &str) -> Self {
        self.content = Some(Value::String(content.to_string()));
        self
    }

    /// Whether the agent authored this turn
    pub fn is_assistant(&self) -> bool {
        self.role.as_deref() == Some(ASSISTANT_ROLE)
    }
}

/// A tool-call record as it appears inside an assistant turn
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolCallRecord {
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_object")]
    pub function: Option<FunctionCall>,
}

impl ToolCallRecord {
    /// Record whose arguments are JSON-encoded text, the usual provider format
    pub fn encoded(name: &str, arguments: &str) -> Self {
        Self {
            id: None,
            function: Some(FunctionCall {
                name: Some(name.to_string()),
                arguments: Some(RawArguments::Encoded(arguments.to_string())),
            }),
        }
    }

    /// Record whose arguments are already structured
    pub fn structured(name: &str, arguments: Value) -> Self {
        Self {
            id: None,
            function: Some(FunctionCall {
                name: Some(name.to_string()),
                arguments: Some(RawArguments::Structured(ArgValue::from(arguments))),
            }),
        }
    }
}

/// The `function` member of a tool-call record
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FunctionCall {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(default)]
    pub arguments: Option<RawArguments>,
}

/// Arguments as recorded: either JSON text or an already-decoded value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawArguments {
    Encoded(String),
    Structured(ArgValue),
}

/// A normalized tool invocation extracted from a trajectory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolInvocation {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, alias = "kwargs", deserialize_with = "null_as_default")]
    pub arguments: ArgMap,
}

impl ToolInvocation {
    /// Create an invocation with no arguments
    pub fn new(name: &str) -> Self {
        Self { name: name.to_string(), arguments: ArgMap::new() }
    }

    /// Set arguments from JSON. Anything but an object yields an empty mapping.
    pub fn with_args(mut self, args: Value) -> Self {
        self.arguments = into_arg_map(args);
        self
    }
}

/// A gold action the agent was expected to take
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpectedAction {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub kwargs: ArgMap,
}

impl ExpectedAction {
    /// Create an expected action with no kwargs
    pub fn new(name: &str) -> Self {
        Self { name: name.to_string(), kwargs: ArgMap::new() }
    }

    /// Set kwargs from JSON. Anything but an object yields an empty mapping.
    pub fn with_kwargs(mut self, kwargs: Value) -> Self {
        self.kwargs = into_arg_map(kwargs);
        self
    }
}

fn into_arg_map(value: Value) -> ArgMap {
    match ArgValue::from(value) {
        ArgValue::Mapping(map) => map,
        _ => ArgMap::new(),
    }
}

/// A string, or absent when the value has any other JSON type
pub(crate) fn lenient_string<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(Some(s)),
        _ => Ok(None),
    }
}

/// An object of type `T`, or absent when it cannot be read as one
pub(crate) fn lenient_object<'de, D, T>(
    deserializer: D,
) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        value => Ok(T::deserialize(value).ok()),
    }
}

/// A list, or absent when the value is not an array.
///
/// Entries that cannot be read are replaced by `T::default()` so that the
/// positions of the remaining entries are kept.
pub(crate) fn lenient_list<'de, D, T>(
    deserializer: D,
) -> std::result::Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let Value::Array(items) = Value::deserialize(deserializer)? else {
        return Ok(None);
    };

    let list = items
        .into_iter()
        .map(|item| {
            T::deserialize(item).unwrap_or_else(|e| {
                tracing::debug!(error = %e, "skipping unreadable list entry");
                T::default()
            })
        })
        .collect();
    Ok(Some(list))
}

/// Like [`lenient_list`], with a non-array reading as an empty list
pub(crate) fn lenient_vec<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    Ok(lenient_list(deserializer)?.unwrap_or_default())
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_trajectory() {
        let json = r#"[
            {"role": "system", "content": "You are an airline agent"},
            {"role": "user", "content": "Book me seat A1"},
            {
                "role": "assistant",
                "content": null,
                "tool_calls": [
                    {
                        "id": "call_1",
                        "type": "function",
                        "function": {"name": "book_flight", "arguments": "{\"seat\": \"A1\"}"}
                    }
                ]
            },
            {"role": "tool", "tool_call_id": "call_1", "name": "book_flight", "content": "ok"},
            {"role": "assistant", "content": "Done", "tool_calls": null}
        ]"#;

        let traj: Vec<Turn> = serde_json::from_str(json).unwrap();
        assert_eq!(traj.len(), 5);
        assert!(traj[2].is_assistant());
        assert!(!traj[3].is_assistant());
        assert!(traj[4].tool_calls.is_none());

        let call = &traj[2].tool_calls.as_ref().unwrap()[0];
        let function = call.function.as_ref().unwrap();
        assert_eq!(function.name.as_deref(), Some("book_flight"));
        assert_eq!(function.arguments, Some(RawArguments::Encoded("{\"seat\": \"A1\"}".into())));
    }

    #[test]
    fn test_structured_arguments() {
        let json = r#"{"function": {"name": "f", "arguments": {"a": 1}}}"#;
        let call: ToolCallRecord = serde_json::from_str(json).unwrap();
        let arguments = call.function.unwrap().arguments.unwrap();
        assert_eq!(arguments, RawArguments::Structured(ArgValue::from(json!({"a": 1}))));
    }

    #[test]
    fn test_expected_action_defaults() {
        let action: ExpectedAction = serde_json::from_str(r#"{"name": "think"}"#).unwrap();
        assert!(action.kwargs.is_empty());

        let action: ExpectedAction =
            serde_json::from_str(r#"{"name": null, "kwargs": null}"#).unwrap();
        assert_eq!(action.name, "");
        assert!(action.kwargs.is_empty());
    }

    #[test]
    fn test_builders() {
        let invocation = ToolInvocation::new("get_user").with_args(json!({"user_id": "u1"}));
        assert_eq!(invocation.arguments["user_id"], ArgValue::from("u1"));

        let action = ExpectedAction::new("get_user").with_kwargs(json!("not a mapping"));
        assert!(action.kwargs.is_empty());
    }

    #[test]
    fn test_wrong_types_read_as_absent() {
        let json = r#"[
            {"role": 7, "tool_calls": {"not": "a list"}},
            {"role": "assistant", "tool_calls": [
                "garbage",
                {"id": 3, "function": {"name": 5, "arguments": "{}"}},
                {"function": "book_flight"}
            ]}
        ]"#;

        let traj: Vec<Turn> = serde_json::from_str(json).unwrap();
        assert!(traj[0].role.is_none());
        assert!(traj[0].tool_calls.is_none());

        let calls = traj[1].tool_calls.as_ref().unwrap();
        assert_eq!(calls.len(), 3);
        assert!(calls[0].function.is_none());
        assert!(calls[1].id.is_none());
        let function = calls[1].function.as_ref().unwrap();
        assert!(function.name.is_none());
        assert_eq!(function.arguments, Some(RawArguments::Encoded("{}".into())));
        assert!(calls[2].function.is_none());
    }

    #[test]
    fn test_invocation_accepts_kwargs_key() {
        let invocation: ToolInvocation =
            serde_json::from_str(r#"{"name": "get_user", "kwargs": {"user_id": "u1"}}"#).unwrap();
        assert_eq!(invocation.arguments["user_id"], ArgValue::from("u1"));
    }
}
