//! # Client Session
//!
//! [`ClientSession`] backed by [`ProviderConfig`].

use std::sync::Arc;

use crate::config::ProviderConfig;
use crate::error::ProviderError;
use crate::provider::{ClientSession, SecretsManagerApi, SecretsManagerREST};

/// Hands out clones of one REST client built from provider configuration
#[derive(Debug, Clone)]
pub struct DefaultClientSession {
    config: ProviderConfig,
    client: Result<Arc<SecretsManagerREST>, String>,
}

impl DefaultClientSession {
    pub fn new(config: ProviderConfig) -> Self {
        let client = SecretsManagerREST::new(&config)
            .map(Arc::new)
            .map_err(|e| format!("{e:#}"));
        Self { config, client }
    }

    pub fn from_env() -> Self {
        Self::new(ProviderConfig::from_env())
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }
}

impl ClientSession for DefaultClientSession {
    fn secrets_manager_v2(&self) -> Result<Arc<dyn SecretsManagerApi>, ProviderError> {
        match &self.client {
            Ok(client) => Ok(Arc::clone(client) as Arc<dyn SecretsManagerApi>),
            Err(e) => Err(ProviderError::Session(e.clone())),
        }
    }
}
