pub mod run_python;

use crate::catalog;
use crate::config::ServerConfig;
use crate::protocol::{JsonRpcRequest, JsonRpcResponse, RpcId, RunPythonArgs, ToolCallParams};

/// MCP protocol revision reported by `initialize`.
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// Server name reported by `initialize`.
pub const SERVER_NAME: &str = "mcp-python-bridge";

/// Where a request goes after routing.
#[derive(Debug)]
pub enum Route {
    /// Answer immediately.
    Reply(JsonRpcResponse),
    /// Run a snippet; the response is produced when the process finishes.
    RunPython { id: RpcId, args: RunPythonArgs },
    /// No response is emitted.
    Ignore,
}

/// Decide how to handle a request without doing any process work.
///
/// Notifications, unknown methods, and `tools/call` for unknown tools are
/// all ignored without a reply.
pub fn route(req: &JsonRpcRequest) -> Route {
    let Some(id) = req.id.clone() else {
        tracing::debug!(method = %req.method, "ignoring notification");
        return Route::Ignore;
    };

    match req.method.as_str() {
        "initialize" => Route::Reply(JsonRpcResponse::success(Some(id), initialize_result())),

        "tools/list" => Route::Reply(JsonRpcResponse::success(Some(id), tools_list_result())),

        "tools/call" => {
            let params: Option<ToolCallParams> = req
                .params
                .as_ref()
                .and_then(|v| serde_json::from_value(v.clone()).ok());

            match params {
                Some(p) if p.name == catalog::RUN_PYTHON => Route::RunPython {
                    id,
                    args: RunPythonArgs::from_arguments(p.arguments.as_ref()),
                },
                Some(p) => {
                    tracing::debug!(%id, tool = %p.name, "ignoring call to unknown tool");
                    Route::Ignore
                }
                None => {
                    tracing::debug!(%id, "ignoring tools/call without a tool name");
                    Route::Ignore
                }
            }
        }

        other => {
            tracing::debug!(%id, method = %other, "ignoring unknown method");
            Route::Ignore
        }
    }
}

/// Route a request and, for tool calls, run it to completion.
///
/// This is the sequential entry point for embedding the handlers without
/// the stdio loop. `McpServer` uses [`route`] directly so that tool calls
/// run as separate tasks. Returns `None` when no response is emitted.
pub async fn dispatch(req: &JsonRpcRequest, config: &ServerConfig) -> Option<JsonRpcResponse> {
    match route(req) {
        Route::Reply(resp) => Some(resp),
        Route::RunPython { id, args } => Some(run_python::handle(id, args, config).await),
        Route::Ignore => None,
    }
}

fn initialize_result() -> serde_json::Value {
    serde_json::json!({
        "protocolVersion": PROTOCOL_VERSION,
        "capabilities": {},
        "serverInfo": {
            "name": SERVER_NAME,
            "version": env!("CARGO_PKG_VERSION")
        }
    })
}

fn tools_list_result() -> serde_json::Value {
    serde_json::json!({ "tools": catalog::TOOLS })
}
