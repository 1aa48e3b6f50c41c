//! # PACT_MODE Configuration
//!
//! Routes Secrets Manager API calls to a Pact mock server.
//!
//! When `PACT_MODE` is set, the client uses `SECRETS_MANAGER_PACT_ENDPOINT`
//! as the service URL for every instance and authenticates with a dummy
//! token. Production endpoints are refused.

use anyhow::Result;
use tracing::{info, warn};

use crate::config::env_var_opt;
use crate::constants::{ENV_PACT_ENDPOINT, ENV_PACT_MODE, SECRETS_MANAGER_DOMAIN};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PactModeConfig {
    pub enabled: bool,
    pub endpoint: Option<String>,
}

impl PactModeConfig {
    /// Enabled mode pointing at `endpoint`
    pub fn enabled(endpoint: impl Into<String>) -> Self {
        Self {
            enabled: true,
            endpoint: Some(endpoint.into()),
        }
    }

    pub fn from_lookup<F>(lookup: &F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let enabled = lookup(ENV_PACT_MODE).is_some_and(|v| {
            let v = v.trim().to_ascii_lowercase();
            !v.is_empty() && v != "false" && v != "0"
        });
        Self {
            enabled,
            endpoint: env_var_opt(lookup, ENV_PACT_ENDPOINT),
        }
    }

    /// The mock server endpoint, if Pact mode is enabled
    ///
    /// # Errors
    /// Returns an error if Pact mode is enabled without an endpoint, or the
    /// endpoint points at a production Secrets Manager host
    pub fn endpoint(&self) -> Result<Option<&str>> {
        if !self.enabled {
            return Ok(None);
        }
        let endpoint = self.endpoint.as_deref().ok_or_else(|| {
            anyhow::anyhow!(
                "PACT_MODE enabled but Secrets Manager endpoint not configured. \
                Set {ENV_PACT_ENDPOINT} environment variable."
            )
        })?;
        Self::validate_endpoint(endpoint)?;
        info!("PACT_MODE: routing Secrets Manager requests to {}", endpoint);
        Ok(Some(endpoint))
    }

    /// Refuse endpoints that point at production
    ///
    /// # Errors
    /// Returns an error if the endpoint contains the production domain
    pub fn validate_endpoint(endpoint: &str) -> Result<()> {
        if endpoint.contains(SECRETS_MANAGER_DOMAIN) {
            return Err(anyhow::anyhow!(
                "PACT_MODE enabled but endpoint '{}' points to production Secrets Manager. \
                This is not allowed in Pact mode. Use a mock server endpoint instead.",
                endpoint
            ));
        }

        let looks_like_mock = endpoint.starts_with("http://localhost")
            || endpoint.starts_with("http://127.0.0.1")
            || endpoint.starts_with("http://[::1]");
        if !looks_like_mock {
            warn!(
                "PACT_MODE endpoint '{}' does not look like a local mock server",
                endpoint
            );
        }
        Ok(())
    }
}
