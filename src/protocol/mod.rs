pub mod request;
pub mod response;

pub use request::{JsonRpcRequest, RpcId, RunPythonArgs, ToolCallParams};
pub use response::{JsonRpcError, JsonRpcResponse};
