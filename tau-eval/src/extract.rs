//! Tool-call extraction from recorded trajectories

use crate::error::ArgumentDecodeError;
use crate::schema::{RawArguments, ToolCallRecord, ToolInvocation, Turn};
use crate::value::{ArgMap, ArgValue};

/// Extract every tool invocation issued by the agent, in encounter order.
///
/// Only assistant turns with a non-null tool-call list contribute. A call whose
/// arguments cannot be decoded is kept with an empty argument mapping.
pub fn extract_tool_calls(trajectory: &[Turn]) -> Vec<ToolInvocation> {
    trajectory
        .iter()
        .filter(|turn| turn.is_assistant())
        .filter_map(|turn| turn.tool_calls.as_deref())
        .flatten()
        .map(to_invocation)
        .collect()
}

fn to_invocation(record: &ToolCallRecord) -> ToolInvocation {
    let Some(function) = &record.function else {
        return ToolInvocation { name: String::new(), arguments: ArgMap::new() };
    };

    let name = function.name.clone().unwrap_or_default();
    let arguments = match &function.arguments {
        None => ArgMap::new(),
        Some(raw) => decode_arguments(raw).unwrap_or_else(|e| {
            tracing::debug!(tool = %name, error = %e, "falling back to empty arguments");
            ArgMap::new()
        }),
    };

    ToolInvocation { name, arguments }
}

/// Decode a recorded argument payload into a mapping
pub fn decode_arguments(raw: &RawArguments) -> Result<ArgMap, ArgumentDecodeError> {
    let value = match raw {
        RawArguments::Encoded(text) => serde_json::from_str::<ArgValue>(text)
            .map_err(|e| ArgumentDecodeError::InvalidJson(e.to_string()))?,
        RawArguments::Structured(value) => value.clone(),
    };

    match value {
        ArgValue::Mapping(map) => Ok(map),
        other => Err(ArgumentDecodeError::NotAMapping(other.type_name())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FunctionCall;
    use serde_json::json;

    #[test]
    fn test_extract_in_encounter_order() {
        let traj = vec![
            Turn::new("user").with_content("hi"),
            Turn::assistant_with_calls(vec![
                ToolCallRecord::encoded("find_user", r#"{"email": "a@b.com"}"#),
                ToolCallRecord::encoded("get_order", r##"{"order_id": "#W1"}"##),
            ]),
            Turn::new("tool").with_content("{}"),
            Turn::assistant_with_calls(vec![ToolCallRecord::structured(
                "cancel_order",
                json!({"order_id": "#W1", "reason": "no longer needed"}),
            )]),
        ];

        let calls = extract_tool_calls(&traj);
        let names: Vec<&str> = calls.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["find_user", "get_order", "cancel_order"]);
        assert_eq!(calls[0].arguments["email"], ArgValue::from("a@b.com"));
        assert_eq!(calls[2].arguments.len(), 2);
    }

    #[test]
    fn test_non_assistant_turns_ignored() {
        let user_turn = Turn {
            tool_calls: Some(vec![ToolCallRecord::encoded("spoofed", "{}")]),
            ..Turn::new("user")
        };
        let untagged = Turn {
            tool_calls: Some(vec![ToolCallRecord::encoded("anon", "{}")]),
            ..Default::default()
        };

        assert!(extract_tool_calls(&[user_turn, untagged]).is_empty());
    }

    #[test]
    fn test_malformed_arguments_become_empty() {
        let traj = vec![Turn::assistant_with_calls(vec![
            ToolCallRecord::encoded("broken", "{not json"),
            ToolCallRecord::encoded("fine", r#"{"x": 1}"#),
        ])];

        let calls = extract_tool_calls(&traj);
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].name, "broken");
        assert!(calls[0].arguments.is_empty());
        assert_eq!(calls[1].arguments["x"], ArgValue::Number(1.0));
    }

    #[test]
    fn test_missing_function_fields() {
        let traj = vec![Turn::assistant_with_calls(vec![
            ToolCallRecord::default(),
            ToolCallRecord {
                id: None,
                function: Some(FunctionCall { name: Some("no_args".into()), arguments: None }),
            },
        ])];

        let calls = extract_tool_calls(&traj);
        assert_eq!(calls[0], ToolInvocation::new(""));
        assert_eq!(calls[1], ToolInvocation::new("no_args"));
    }

    #[test]
    fn test_decode_errors_are_reported() {
        let err = decode_arguments(&RawArguments::Encoded("[1, 2]".into())).unwrap_err();
        assert_eq!(err, ArgumentDecodeError::NotAMapping("array"));

        let err = decode_arguments(&RawArguments::Encoded("".into())).unwrap_err();
        assert!(matches!(err, ArgumentDecodeError::InvalidJson(_)));

        let err = decode_arguments(&RawArguments::Structured(ArgValue::from("x"))).unwrap_err();
        assert_eq!(err, ArgumentDecodeError::NotAMapping("string"));
    }
}
