use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{error, info};

use super::mcp::McpError;
use crate::store::{
    activity::{self, ActivityError},
    store::{ActivityStore, UpdateError},
};

pub const LIST_ACTIVITIES: &str = "list_activities";
pub const SIGNUP_FOR_ACTIVITY: &str = "signup_for_activity";
pub const UNREGISTER_FROM_ACTIVITY: &str = "unregister_from_activity";

#[derive(Debug, Deserialize)]
struct ParticipantArgs {
    activity_name: String,
    email: String,
}

fn participant_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "activity_name": { "type": "string", "description": "Name of the activity" },
            "email": { "type": "string", "description": "Student email" }
        },
        "required": ["activity_name", "email"]
    })
}

pub fn tool_definitions() -> Value {
    json!([
        {
            "name": LIST_ACTIVITIES,
            "description": "List every activity with its schedule, capacity and participants",
            "inputSchema": { "type": "object", "properties": {} }
        },
        {
            "name": SIGNUP_FOR_ACTIVITY,
            "description": "Sign a student up for an activity",
            "inputSchema": participant_schema()
        },
        {
            "name": UNREGISTER_FROM_ACTIVITY,
            "description": "Remove a student from an activity",
            "inputSchema": participant_schema()
        }
    ])
}

/// Runs a tool and renders its outcome as MCP content. Domain failures come
/// back as results flagged `isError`, not as protocol errors.
pub fn call_tool<S: ActivityStore>(
    store: &S,
    name: &str,
    arguments: Value,
) -> Result<Value, McpError> {
    match name {
        LIST_ACTIVITIES => {
            let rendered = serde_json::to_string_pretty(&store.load())
                .map_err(|e| McpError::Internal(e.to_string()))?;
            Ok(text_result(rendered, false))
        }
        SIGNUP_FOR_ACTIVITY => {
            let args = parse_args(arguments)?;
            Ok(outcome(store.update(|activities| {
                activity::signup(activities, &args.activity_name, &args.email)
            })))
        }
        UNREGISTER_FROM_ACTIVITY => {
            let args = parse_args(arguments)?;
            Ok(outcome(store.update(|activities| {
                activity::unregister(activities, &args.activity_name, &args.email)
            })))
        }
        other => Err(McpError::UnknownTool(other.to_string())),
    }
}

fn parse_args(arguments: Value) -> Result<ParticipantArgs, McpError> {
    serde_json::from_value(arguments).map_err(|e| McpError::InvalidParams(e.to_string()))
}

fn outcome(result: Result<String, UpdateError<ActivityError>>) -> Value {
    match result {
        Ok(message) => {
            info!("{} (via MCP)", message);
            text_result(message, false)
        }
        Err(UpdateError::Rejected(e)) => text_result(e.to_string(), true),
        Err(UpdateError::Store(e)) => {
            error!("Storage failure: {}", e);
            text_result("Could not save activities".to_string(), true)
        }
    }
}

fn text_result(text: String, is_error: bool) -> Value {
    json!({
        "content": [{ "type": "text", "text": text }],
        "isError": is_error
    })
}
