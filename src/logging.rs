//! Structured logging via the `tracing` crate.
//!
//! Level and format come from the vault configuration, overridable per
//! invocation by CLI flags and by the `SNAPVAULT_LOG` environment variable
//! (highest precedence). Output goes to stderr so command output on stdout
//! stays clean.

use crate::error::{Result, VaultError};
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error, off
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format: json, text (default: text)
    #[serde(default = "default_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_format() -> String {
    "text".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_format(),
        }
    }
}

/// Resolve config + CLI overrides and install the global subscriber.
///
/// Safe to call once per process; a second call reports `Config`.
pub fn init(
    config: &LoggingConfig,
    cli_level: Option<&str>,
    cli_format: Option<&str>,
) -> Result<()> {
    let level = cli_level.unwrap_or(&config.level);
    let filter = match std::env::var("SNAPVAULT_LOG") {
        Ok(directive) if !directive.is_empty() => EnvFilter::try_new(directive),
        _ => EnvFilter::try_new(level),
    }
    .map_err(|e| VaultError::Config(format!("invalid log level: {}", e)))?;

    let format = cli_format.unwrap_or(&config.format);
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match format {
        "json" => builder
            .json()
            .try_init()
            .map_err(|e| VaultError::Config(e.to_string())),
        "text" => builder
            .try_init()
            .map_err(|e| VaultError::Config(e.to_string())),
        other => Err(VaultError::Config(format!(
            "unknown log format {:?} (expected \"text\" or \"json\")",
            other
        ))),
    }
}
