use crate::config::ServerConfig;
use crate::protocol::{JsonRpcResponse, RpcId, RunPythonArgs};
use crate::runner;

/// Handle a `run_python` tool call.
///
/// Any outcome of a started process, including nonzero exit codes and
/// stderr output, is a successful result. Only runner errors go out on the
/// JSON-RPC error channel.
pub async fn handle(id: RpcId, args: RunPythonArgs, config: &ServerConfig) -> JsonRpcResponse {
    match runner::run(&config.interpreter, &args.code, config.limits).await {
        Ok(outcome) => {
            let result = serde_json::to_value(&outcome)
                .expect("InvocationOutcome must serialize to JSON Value");
            JsonRpcResponse::success(Some(id), result)
        }
        Err(err) => {
            tracing::warn!(%id, program = ?config.interpreter.program, "run_python failed: {err}");
            JsonRpcResponse::error(Some(id), err.into())
        }
    }
}
