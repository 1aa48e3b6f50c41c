//! # Configuration
//!
//! Provider-level settings loaded from environment variables.
//!
//! - `provider`: region, endpoint type, token and logging settings
//! - `pact_mode`: routes Secrets Manager calls to a Pact mock server

pub mod pact_mode;
pub mod provider;

pub use pact_mode::PactModeConfig;
pub use provider::{LogFormat, ProviderConfig};

/// Parse an environment value, falling back to `default` when unset or unparsable
pub(crate) fn env_var_or_default<T, F>(lookup: &F, key: &str, default: T) -> T
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

/// String environment value, falling back to `default` when unset or blank
pub(crate) fn env_var_or_default_str<F>(lookup: &F, key: &str, default: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Optional string environment value; blank counts as unset
pub(crate) fn env_var_opt<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
