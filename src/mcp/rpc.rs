use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const JSONRPC_VERSION: &str = "2.0";

pub const PARSE_ERROR: i64 = -32700;
pub const INVALID_REQUEST: i64 = -32600;
pub const METHOD_NOT_FOUND: i64 = -32601;
pub const INVALID_PARAMS: i64 = -32602;
pub const INTERNAL_ERROR: i64 = -32603;

#[derive(Debug, Deserialize)]
pub struct RpcRequest {
  pub jsonrpc: String,
  // Absent for notifications.
  #[serde(default)]
  pub id: Option<Value>,
  pub method: String,
  #[serde(default)]
  pub params: Value
}

#[derive(Debug, Serialize)]
pub struct RpcError {
  pub code: i64,
  pub message: String
}

#[derive(Debug, Serialize)]
pub struct RpcResponse {
  pub jsonrpc: &'static str,
  pub id: Value,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub result: Option<Value>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub error: Option<RpcError>
}

impl RpcResponse {
  pub fn success(id: Value, result: Value) -> Self {
    Self { jsonrpc: JSONRPC_VERSION, id, result: Some(result), error: None }
  }

  pub fn failure(id: Value, code: i64, message: impl Into<String>) -> Self {
    Self {
      jsonrpc: JSONRPC_VERSION,
      id,
      result: None,
      error: Some(RpcError { code, message: message.into() })
    }
  }
}
