//! Minimal MCP server that runs Python snippets.
//!
//! Exposes a single `run_python` tool over JSON-RPC 2.0 stdio transport.
//! Each call starts one interpreter process, captures its stdout and stderr,
//! and reports the exit code; snippet failures come back as data, not errors.

pub mod catalog;
pub mod config;
pub mod handlers;
pub mod protocol;
pub mod runner;
pub mod server;
