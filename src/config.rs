use std::ffi::OsString;
use std::time::Duration;

use crate::runner::{Interpreter, RunLimits};

const BIN_VAR: &str = "MCP_PYTHON_BIN";
const TIMEOUT_VAR: &str = "MCP_PYTHON_TIMEOUT_SECS";
const MAX_OUTPUT_VAR: &str = "MCP_PYTHON_MAX_OUTPUT_BYTES";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be a positive integer, got {value:?}")]
    NotPositive { var: &'static str, value: String },
    #[error("{0} must not be empty")]
    Empty(&'static str),
}

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerConfig {
    pub interpreter: Interpreter,
    pub limits: RunLimits,
}

impl ServerConfig {
    /// Load configuration from environment.
    ///
    /// - `MCP_PYTHON_BIN` (optional, default `python3`) — interpreter run as `<bin> -c <code>`
    /// - `MCP_PYTHON_TIMEOUT_SECS` (optional, default unbounded) — max seconds per tool call
    /// - `MCP_PYTHON_MAX_OUTPUT_BYTES` (optional, default unbounded) — per-stream capture ceiling
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let interpreter = match lookup(BIN_VAR) {
            Some(bin) if bin.trim().is_empty() => return Err(ConfigError::Empty(BIN_VAR)),
            Some(bin) => Interpreter::new(OsString::from(bin)).arg("-c"),
            None => Interpreter::python3(),
        };

        let timeout = positive(TIMEOUT_VAR, lookup(TIMEOUT_VAR))?.map(Duration::from_secs);
        let max_output_bytes = positive(MAX_OUTPUT_VAR, lookup(MAX_OUTPUT_VAR))?
            .map(|n| usize::try_from(n).unwrap_or(usize::MAX));

        Ok(Self {
            interpreter,
            limits: RunLimits {
                max_output_bytes,
                timeout,
            },
        })
    }
}

fn positive(var: &'static str, value: Option<String>) -> Result<Option<u64>, ConfigError> {
    let Some(value) = value else {
        return Ok(None);
    };
    match value.trim().parse::<u64>() {
        Ok(n) if n > 0 => Ok(Some(n)),
        _ => Err(ConfigError::NotPositive { var, value }),
    }
}
