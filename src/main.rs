use mcp_python_bridge::config::ServerConfig;
use mcp_python_bridge::server::McpServer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Stdout carries protocol messages only.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(false),
        )
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let config = match ServerConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("mcp-python-bridge: configuration error: {e}");
            std::process::exit(1);
        }
    };

    let server = McpServer::new(config);
    if let Err(e) = server.run().await {
        tracing::error!("mcp-python-bridge: fatal error: {e}");
        std::process::exit(1);
    }
}
