//! # Provider Configuration
//!
//! Provider-level settings loaded from environment variables.

use std::fmt;
use std::str::FromStr;

use crate::config::{env_var_opt, env_var_or_default, env_var_or_default_str, PactModeConfig};
use crate::constants::{
    DEFAULT_REGION, ENV_API_ENDPOINT, ENV_ENDPOINT_TYPE, ENV_IAM_TOKEN, ENV_LOG_FORMAT,
    ENV_LOG_LEVEL, ENV_REGION,
};
use crate::provider::EndpointType;

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!("unsupported log format: {other}")),
        }
    }
}

/// Provider-level configuration
///
/// All settings have defaults and can be overridden via environment variables.
#[derive(Clone)]
pub struct ProviderConfig {
    /// Region used when a resource does not name one
    pub region: String,
    /// Endpoint type used when a resource does not name one
    pub endpoint_type: EndpointType,
    /// IAM bearer token; obtaining it is the caller's job
    pub iam_access_token: Option<String>,
    /// Service URL used for every instance instead of the regional endpoint
    pub api_endpoint: Option<String>,
    /// Global log level (ERROR, WARN, INFO, DEBUG, TRACE)
    pub log_level: String,
    pub log_format: LogFormat,
    pub pact_mode: PactModeConfig,
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("region", &self.region)
            .field("endpoint_type", &self.endpoint_type)
            .field("api_endpoint", &self.api_endpoint)
            .field("log_level", &self.log_level)
            .field("log_format", &self.log_format)
            .field("pact_mode", &self.pact_mode)
            .finish_non_exhaustive()
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            region: DEFAULT_REGION.to_string(),
            endpoint_type: EndpointType::Public,
            iam_access_token: None,
            api_endpoint: None,
            log_level: "INFO".to_string(),
            log_format: LogFormat::Text,
            pact_mode: PactModeConfig::default(),
        }
    }
}

impl ProviderConfig {
    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Self {
        Self::from_lookup(&|key: &str| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: &F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            region: env_var_or_default_str(lookup, ENV_REGION, DEFAULT_REGION),
            endpoint_type: env_var_or_default(lookup, ENV_ENDPOINT_TYPE, EndpointType::Public),
            iam_access_token: env_var_opt(lookup, ENV_IAM_TOKEN),
            api_endpoint: env_var_opt(lookup, ENV_API_ENDPOINT),
            log_level: env_var_or_default_str(lookup, ENV_LOG_LEVEL, "INFO"),
            log_format: env_var_or_default(lookup, ENV_LOG_FORMAT, LogFormat::Text),
            pact_mode: PactModeConfig::from_lookup(lookup),
        }
    }
}
