//! # Resources
//!
//! The [`Resource`] trait implemented by every managed resource type, and
//! helpers for the composite `region/instance_id` identifier.

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;

use crate::error::ProviderError;
use crate::provider::ClientSession;
use crate::schema::validation::{ResourceValidator, ValidationErrors};
use crate::schema::Schema;
use crate::state::ResourceData;

pub mod en_registration;

pub use en_registration::EnRegistrationResource;

/// Lifecycle handlers of one resource type
///
/// Handlers run one at a time per resource instance. Each takes the state
/// object by mutable reference and leaves it as the last successful read
/// reported it.
#[async_trait]
pub trait Resource: Send + Sync + std::fmt::Debug {
    fn type_name(&self) -> &'static str;

    fn schema(&self) -> Arc<Schema>;

    fn validator(&self) -> &ResourceValidator;

    /// Validate a configuration before any remote call
    ///
    /// # Errors
    /// Returns every violated rule, including undeclared attributes
    fn validate(&self, config: &Map<String, Value>) -> Result<(), ValidationErrors> {
        let schema = self.schema();
        let known: Vec<&str> = schema.attributes().map(|a| a.name).collect();
        self.validator().validate_config(config, &known)
    }

    async fn create(
        &self,
        session: &dyn ClientSession,
        d: &mut ResourceData,
    ) -> Result<(), ProviderError>;

    async fn read(
        &self,
        session: &dyn ClientSession,
        d: &mut ResourceData,
    ) -> Result<(), ProviderError>;

    async fn update(
        &self,
        session: &dyn ClientSession,
        d: &mut ResourceData,
    ) -> Result<(), ProviderError>;

    async fn delete(
        &self,
        session: &dyn ClientSession,
        d: &mut ResourceData,
    ) -> Result<(), ProviderError>;

    /// Passthrough import: adopt `id` and populate state with a read
    ///
    /// # Errors
    /// Returns an error for a malformed id, a failed read, or a resource
    /// that does not exist
    async fn import(
        &self,
        session: &dyn ClientSession,
        id: &str,
    ) -> Result<ResourceData, ProviderError> {
        parse_composite_id(id)?;
        let mut d = ResourceData::new(self.schema());
        d.set_id(id);
        self.read(session, &mut d).await?;
        if !d.exists() {
            return Err(ProviderError::NotFound {
                resource: self.type_name(),
                id: id.to_string(),
            });
        }
        Ok(d)
    }
}

/// `"{region}/{instance_id}"`
pub fn composite_id(region: &str, instance_id: &str) -> String {
    format!("{region}/{instance_id}")
}

/// Split a composite id into `(region, instance_id)`
///
/// # Errors
/// Returns [`ProviderError::InvalidId`] unless the id has exactly two
/// non-empty `/`-separated parts
pub fn parse_composite_id(id: &str) -> Result<(String, String), ProviderError> {
    let invalid = || ProviderError::InvalidId { id: id.to_string() };
    let (region, instance_id) = id.split_once('/').ok_or_else(invalid)?;
    if region.is_empty() || instance_id.is_empty() || instance_id.contains('/') {
        return Err(invalid());
    }
    Ok((region.to_string(), instance_id.to_string()))
}
