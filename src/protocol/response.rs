use serde::Serialize;

use super::request::RpcId;
use crate::runner::RunError;

// ---------------------------------------------------------------------------
// JSON-RPC 2.0 response layer
// ---------------------------------------------------------------------------

/// JSON-RPC 2.0 response envelope.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RpcId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    pub fn success(id: Option<RpcId>, result: serde_json::Value) -> Self {
        Self {
            jsonrpc: "2.0".into(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn error(id: Option<RpcId>, error: JsonRpcError) -> Self {
        Self {
            jsonrpc: "2.0".into(),
            id,
            result: None,
            error: Some(error),
        }
    }
}

/// JSON-RPC 2.0 error object.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl JsonRpcError {
    /// The interpreter could not be started.
    pub const SPAWN_FAILED: i32 = -1;
    /// A wall-clock ceiling stopped the interpreter; `data` holds partial output.
    pub const TIMED_OUT: i32 = -2;
    /// An output ceiling stopped the interpreter; `data` holds partial output.
    pub const OUTPUT_LIMIT: i32 = -3;
    pub const INTERNAL_ERROR: i32 = -32603;

    pub fn spawn_failed(detail: impl Into<String>) -> Self {
        Self { code: Self::SPAWN_FAILED, message: detail.into(), data: None }
    }
}

/// Map a runner failure onto the JSON-RPC error channel.
///
/// Tripped ceilings carry the partial outcome in `data` so callers still
/// see what the snippet produced before it was stopped.
impl From<RunError> for JsonRpcError {
    fn from(err: RunError) -> Self {
        let code = match &err {
            RunError::Spawn(_) => Self::SPAWN_FAILED,
            RunError::Timeout { .. } => Self::TIMED_OUT,
            RunError::OutputLimit { .. } => Self::OUTPUT_LIMIT,
            RunError::Io(_) => Self::INTERNAL_ERROR,
        };
        let data = err
            .partial()
            .and_then(|partial| serde_json::to_value(partial).ok());
        Self {
            code,
            message: err.to_string(),
            data,
        }
    }
}
