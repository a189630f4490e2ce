use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::task::JoinSet;

use crate::config::ServerConfig;
use crate::handlers::{self, Route};
use crate::protocol::{JsonRpcRequest, JsonRpcResponse};

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to encode response: {0}")]
    Encode(#[from] serde_json::Error),
}

/// MCP server that communicates over stdio using newline-delimited JSON-RPC 2.0.
pub struct McpServer {
    config: Arc<ServerConfig>,
}

impl McpServer {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// Serve on the process's stdin and stdout until stdin closes.
    pub async fn run(&self) -> Result<(), ServerError> {
        let stdin = BufReader::new(tokio::io::stdin());
        let mut stdout = tokio::io::stdout();
        self.serve(stdin, &mut stdout).await
    }

    /// Serve requests read from `input`, writing responses to `output`.
    ///
    /// `initialize` and `tools/list` are answered inline. Each `tools/call`
    /// runs as its own task so the read loop keeps going while the
    /// interpreter works; its response is written whenever it finishes.
    /// After end of input, outstanding calls are awaited and answered.
    pub async fn serve<R, W>(&self, input: R, output: &mut W) -> Result<(), ServerError>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut reader = input;
        let mut raw = Vec::new();
        let mut in_flight: JoinSet<JsonRpcResponse> = JoinSet::new();
        let mut reading = true;

        while reading || !in_flight.is_empty() {
            tokio::select! {
                // Partial reads stay in `raw` if the other branch wins.
                n = reader.read_until(b'\n', &mut raw), if reading => {
                    if n? == 0 {
                        tracing::debug!(pending = in_flight.len(), "input closed");
                        reading = false;
                    }
                    if !raw.is_empty() && (!reading || raw.ends_with(b"\n")) {
                        self.accept(&raw, &mut in_flight, output).await?;
                        raw.clear();
                    }
                }
                Some(done) = in_flight.join_next(), if !in_flight.is_empty() => {
                    match done {
                        Ok(resp) => write_response(output, &resp).await?,
                        // The id is lost with the task, so nothing can be answered.
                        Err(e) => tracing::error!("Invocation task failed: {e}"),
                    }
                }
                else => break,
            }
        }

        Ok(())
    }

    async fn accept<W>(
        &self,
        raw: &[u8],
        in_flight: &mut JoinSet<JsonRpcResponse>,
        output: &mut W,
    ) -> Result<(), ServerError>
    where
        W: AsyncWrite + Unpin,
    {
        let trimmed = match std::str::from_utf8(raw) {
            Ok(s) => s.trim(),
            Err(e) => {
                tracing::debug!("Dropping non-UTF-8 line: {e}");
                return Ok(());
            }
        };
        if trimmed.is_empty() {
            return Ok(());
        }

        let req: JsonRpcRequest = match serde_json::from_str(trimmed) {
            Ok(r) => r,
            Err(e) => {
                tracing::debug!("Dropping unparseable line: {e}");
                return Ok(());
            }
        };

        match handlers::route(&req) {
            Route::Reply(resp) => write_response(output, &resp).await?,
            Route::RunPython { id, args } => {
                let config = Arc::clone(&self.config);
                in_flight.spawn(async move { handlers::run_python::handle(id, args, &config).await });
            }
            Route::Ignore => {}
        }

        Ok(())
    }
}

/// Write one response as a single newline-terminated line.
async fn write_response<W>(output: &mut W, resp: &JsonRpcResponse) -> Result<(), ServerError>
where
    W: AsyncWrite + Unpin,
{
    let mut out = serde_json::to_vec(resp)?;
    out.push(b'\n');
    output.write_all(&out).await?;
    output.flush().await?;
    Ok(())
}
