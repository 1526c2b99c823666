use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

use super::{
    rpc::{
        RpcRequest, RpcResponse, INTERNAL_ERROR, INVALID_PARAMS, INVALID_REQUEST, JSONRPC_VERSION,
        METHOD_NOT_FOUND, PARSE_ERROR,
    },
    tools::{call_tool, tool_definitions},
};
use crate::store::store::ActivityStore;

const DEFAULT_PROTOCOL_VERSION: &str = "2025-03-26";
const SERVER_NAME: &str = "Mergington MCP API";
const INSTRUCTIONS: &str = "MCP server for Mergington High School Activities API";

#[derive(Error, Debug)]
pub enum McpError {
    #[error("Method not found: {0}")]
    MethodNotFound(String),
    #[error("Unknown tool: {0}")]
    UnknownTool(String),
    #[error("Invalid params: {0}")]
    InvalidParams(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl McpError {
    fn code(&self) -> i64 {
        match self {
            McpError::MethodNotFound(_) => METHOD_NOT_FOUND,
            McpError::UnknownTool(_) | McpError::InvalidParams(_) => INVALID_PARAMS,
            McpError::Internal(_) => INTERNAL_ERROR,
        }
    }
}

/// JSON-RPC endpoint for MCP clients. Every request gets a single JSON reply;
/// notifications are acknowledged with 202 and no body.
pub async fn handle_mcp<S: ActivityStore>(State(store): State<Arc<S>>, body: Bytes) -> Response {
    let raw: Value = match serde_json::from_slice(&body) {
        Ok(raw) => raw,
        Err(e) => return reply(RpcResponse::failure(Value::Null, PARSE_ERROR, e.to_string())),
    };

    let request: RpcRequest = match serde_json::from_value(raw) {
        Ok(request) => request,
        Err(e) => return reply(RpcResponse::failure(Value::Null, INVALID_REQUEST, e.to_string())),
    };

    let Some(id) = request.id.clone() else {
        debug!("MCP notification {}", request.method);
        return StatusCode::ACCEPTED.into_response();
    };

    if request.jsonrpc != JSONRPC_VERSION {
        return reply(RpcResponse::failure(
            id,
            INVALID_REQUEST,
            format!("Unsupported jsonrpc version {}", request.jsonrpc),
        ));
    }

    debug!("MCP request {}", request.method);
    match dispatch(store.as_ref(), request) {
        Ok(result) => reply(RpcResponse::success(id, result)),
        Err(e) => reply(RpcResponse::failure(id, e.code(), e.to_string())),
    }
}

fn dispatch<S: ActivityStore>(store: &S, request: RpcRequest) -> Result<Value, McpError> {
    match request.method.as_str() {
        "initialize" => {
            let protocol_version = request
                .params
                .get("protocolVersion")
                .and_then(Value::as_str)
                .unwrap_or(DEFAULT_PROTOCOL_VERSION);

            Ok(json!({
                "protocolVersion": protocol_version,
                "capabilities": { "tools": {} },
                "serverInfo": { "name": SERVER_NAME, "version": env!("CARGO_PKG_VERSION") },
                "instructions": INSTRUCTIONS
            }))
        }
        "ping" => Ok(json!({})),
        "tools/list" => Ok(json!({ "tools": tool_definitions() })),
        "tools/call" => {
            let name = request
                .params
                .get("name")
                .and_then(Value::as_str)
                .ok_or_else(|| McpError::InvalidParams("missing tool name".to_string()))?;
            let arguments = request
                .params
                .get("arguments")
                .cloned()
                .unwrap_or_else(|| json!({}));

            call_tool(store, name, arguments)
        }
        other => Err(McpError::MethodNotFound(other.to_string())),
    }
}

fn reply(response: RpcResponse) -> Response {
    Json(response).into_response()
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
        Router,
    };
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    use crate::router::router::create_router;
    use crate::store::store::{ActivityStore, JsonFileStore};

    const SEED: &str = r#"{
  "Chess Club": {
    "description": "Learn strategies",
    "schedule": "Fridays",
    "max_participants": 12,
    "participants": ["a@x.com"]
  }
}"#;

    fn seeded() -> (tempfile::TempDir, Arc<JsonFileStore>, Router) {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("activities.json");
        std::fs::write(&path, SEED).expect("seed file");
        let store = Arc::new(JsonFileStore::new(path));
        let app = create_router(store.clone(), dir.path());
        (dir, store, app)
    }

    async fn post(app: Router, body: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/mcp")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn call(id: u64, tool: &str, arguments: Value) -> String {
        json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": "tools/call",
            "params": { "name": tool, "arguments": arguments }
        })
        .to_string()
    }

    #[tokio::test]
    async fn initialize_reports_tool_capability() {
        let (_dir, _store, app) = seeded();
        let (status, body) = post(
            app,
            r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{"protocolVersion":"2024-11-05"}}"#,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], 1);
        assert_eq!(body["result"]["protocolVersion"], "2024-11-05");
        assert!(body["result"]["capabilities"]["tools"].is_object());
    }

    #[tokio::test]
    async fn lists_the_three_tools() {
        let (_dir, _store, app) = seeded();
        let (_, body) = post(app, r#"{"jsonrpc":"2.0","id":"t","method":"tools/list"}"#).await;

        let names: Vec<&str> = body["result"]["tools"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|tool| tool["name"].as_str())
            .collect();
        assert_eq!(
            names,
            vec!["list_activities", "signup_for_activity", "unregister_from_activity"]
        );
    }

    #[tokio::test]
    async fn signup_tool_writes_through_the_store() {
        let (_dir, store, app) = seeded();
        let args = json!({ "activity_name": "Chess Club", "email": "b@x.com" });

        let (_, body) = post(app.clone(), &call(2, "signup_for_activity", args.clone())).await;
        assert_eq!(body["result"]["isError"], false);
        assert_eq!(
            body["result"]["content"][0]["text"],
            "Signed up b@x.com for Chess Club"
        );
        assert_eq!(
            store.load()["Chess Club"].participants,
            vec!["a@x.com", "b@x.com"]
        );

        let (_, body) = post(app, &call(3, "signup_for_activity", args)).await;
        assert_eq!(body["result"]["isError"], true);
        assert_eq!(
            body["result"]["content"][0]["text"],
            "Student is already signed up"
        );
    }

    #[tokio::test]
    async fn unregister_and_list_tools() {
        let (_dir, _store, app) = seeded();

        let (_, body) = post(
            app.clone(),
            &call(4, "unregister_from_activity", json!({ "activity_name": "Chess Club", "email": "a@x.com" })),
        )
        .await;
        assert_eq!(
            body["result"]["content"][0]["text"],
            "Unregistered a@x.com from Chess Club"
        );

        let (_, body) = post(app, &call(5, "list_activities", json!({}))).await;
        let text = body["result"]["content"][0]["text"].as_str().unwrap();
        let listed: Value = serde_json::from_str(text).unwrap();
        assert_eq!(listed["Chess Club"]["participants"], json!([]));
    }

    #[tokio::test]
    async fn protocol_errors() {
        let (_dir, store, app) = seeded();

        let (_, body) = post(app.clone(), r#"{"jsonrpc":"2.0","id":6,"method":"resources/list"}"#).await;
        assert_eq!(body["error"]["code"], -32601);

        let (_, body) = post(app.clone(), &call(7, "drop_tables", json!({}))).await;
        assert_eq!(body["error"]["code"], -32602);

        let (_, body) = post(app.clone(), &call(8, "signup_for_activity", json!({ "email": "b@x.com" }))).await;
        assert_eq!(body["error"]["code"], -32602);

        let (_, body) = post(app, "{ nope").await;
        assert_eq!(body["error"]["code"], -32700);
        assert_eq!(body["id"], Value::Null);

        assert_eq!(store.load()["Chess Club"].participants, vec!["a@x.com"]);
    }

    #[tokio::test]
    async fn notifications_are_accepted_without_body() {
        let (_dir, _store, app) = seeded();
        let (status, body) = post(
            app,
            r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
        )
        .await;

        assert_eq!(status, StatusCode::ACCEPTED);
        assert_eq!(body, Value::Null);
    }
}
