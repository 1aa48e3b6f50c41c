//! # Resource Registry
//!
//! Maps resource type names to their handlers and validators.

use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::ProviderError;
use crate::resource::{EnRegistrationResource, Resource};
use crate::schema::validation::{ValidateSchema, ValidatorRegistry};

/// Resource types served by this provider
#[derive(Debug, Clone)]
pub struct Provider {
    resources: BTreeMap<&'static str, Arc<dyn Resource>>,
    validators: ValidatorRegistry,
}

impl Default for Provider {
    fn default() -> Self {
        Self::new()
    }
}

impl Provider {
    pub fn new() -> Self {
        let mut provider = Self {
            resources: BTreeMap::new(),
            validators: ValidatorRegistry::new(),
        };
        provider.register(Arc::new(EnRegistrationResource::new()));
        provider
    }

    fn register(&mut self, resource: Arc<dyn Resource>) {
        self.validators.register(resource.validator().clone());
        self.resources.insert(resource.type_name(), resource);
    }

    /// # Errors
    /// Returns [`ProviderError::UnknownResource`] for an unregistered type
    pub fn resource(&self, type_name: &str) -> Result<Arc<dyn Resource>, ProviderError> {
        self.resources
            .get(type_name)
            .cloned()
            .ok_or_else(|| ProviderError::UnknownResource(type_name.to_string()))
    }

    pub fn resource_types(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.resources.keys().copied()
    }

    pub fn validators(&self) -> &ValidatorRegistry {
        &self.validators
    }

    /// Look up the rule for a single attribute
    pub fn invoke_validator(&self, type_name: &str, attribute: &str) -> Option<&ValidateSchema> {
        self.validators.invoke_validator(type_name, attribute)
    }

    /// Validate a full configuration for `type_name`
    ///
    /// # Errors
    /// Returns an error for an unknown type or an invalid configuration
    pub fn validate_resource_config(
        &self,
        type_name: &str,
        config: &Map<String, Value>,
    ) -> Result<(), ProviderError> {
        self.resource(type_name)?.validate(config)?;
        Ok(())
    }
}
