use serde::{Deserialize, Deserializer, Serialize};
use serde_json::value::{to_raw_value, RawValue};

/// JSON-RPC 2.0 ID, held as the exact JSON text the client sent.
///
/// The id is opaque: numbers keep their precision and spelling, and any
/// JSON value (including `null`) is echoed back byte for byte.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RpcId(Box<RawValue>);

impl RpcId {
    /// Parse an id from its JSON text.
    pub fn from_json(text: impl Into<String>) -> Result<Self, serde_json::Error> {
        RawValue::from_string(text.into()).map(Self)
    }

    /// The id's JSON text, exactly as received.
    pub fn as_json(&self) -> &str {
        self.0.get()
    }
}

impl PartialEq for RpcId {
    fn eq(&self, other: &Self) -> bool {
        self.as_json() == other.as_json()
    }
}

impl Eq for RpcId {}

impl From<i64> for RpcId {
    fn from(n: i64) -> Self {
        Self(to_raw_value(&n).expect("i64 must serialize to JSON"))
    }
}

impl From<&str> for RpcId {
    fn from(s: &str) -> Self {
        Self(to_raw_value(s).expect("str must serialize to JSON"))
    }
}

impl std::fmt::Display for RpcId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_json())
    }
}

/// JSON-RPC 2.0 request envelope.
///
/// `jsonrpc` is carried but not validated; routing is on `method` only.
/// An absent `id` marks a notification; an explicit `"id": null` is an id.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcRequest {
    #[serde(default)]
    pub jsonrpc: String,
    #[serde(default, deserialize_with = "present_id")]
    pub id: Option<RpcId>,
    pub method: String,
    #[serde(default)]
    pub params: Option<serde_json::Value>,
}

impl JsonRpcRequest {
    /// A request without an `id` never gets a response.
    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

/// Only called when the `id` key is present, so `null` becomes `Some`.
fn present_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<RpcId>, D::Error> {
    RpcId::deserialize(deserializer).map(Some)
}

/// Parameters for `tools/call`.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolCallParams {
    pub name: String,
    #[serde(default)]
    pub arguments: Option<serde_json::Value>,
}

/// Arguments for the `run_python` tool.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunPythonArgs {
    pub code: String,
}

impl RunPythonArgs {
    /// Extract `code` from raw tool arguments.
    ///
    /// Missing, null, or non-string `code` becomes the empty snippet.
    pub fn from_arguments(arguments: Option<&serde_json::Value>) -> Self {
        let code = arguments
            .and_then(|args| args.get("code"))
            .and_then(serde_json::Value::as_str)
            .unwrap_or_default()
            .to_string();
        Self { code }
    }
}
