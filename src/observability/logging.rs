//! # Logging
//!
//! Tracing subscriber setup for the `smenctl` binary.

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use crate::config::{LogFormat, ProviderConfig};

/// Default filter directive for a configured log level
pub fn default_directive(log_level: &str) -> String {
    let level = match log_level.to_ascii_uppercase().as_str() {
        "ERROR" => "error",
        "WARN" => "warn",
        "DEBUG" => "debug",
        "TRACE" => "trace",
        _ => "info",
    };
    format!("sm_en_registration={level},smenctl={level}")
}

/// Install the global tracing subscriber
///
/// `RUST_LOG` takes precedence over the configured level.
///
/// # Errors
/// Returns an error if a global subscriber is already installed
pub fn init_tracing(config: &ProviderConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_directive(&config.log_level).into());

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match config.log_format {
        LogFormat::Json => builder
            .json()
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {e}")),
        LogFormat::Text => builder
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {e}")),
    }
}
