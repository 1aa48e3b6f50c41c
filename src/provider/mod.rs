//! # Provider
//!
//! Client seams between the resource handlers and Secrets Manager.
//!
//! - [`NotificationsRegistrationApi`]: the three remote registration operations
//! - [`SecretsManagerApi`]: a client that can be re-scoped to one instance
//! - [`ClientSession`]: hands out base clients to the handlers
//!
//! [`SecretsManagerREST`] is the reqwest implementation; tests substitute
//! their own.

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::{ApiError, DetailedResponse, ProviderError};

pub mod endpoint;
pub mod registry;
pub mod secrets_manager;
pub mod session;

pub use endpoint::{
    get_client_with_instance_endpoint, get_endpoint_type, get_region, service_url, EndpointType,
};
pub use registry::Provider;
pub use secrets_manager::requests::CreateNotificationsRegistrationRequest;
pub use secrets_manager::responses::NotificationsRegistration;
pub use secrets_manager::SecretsManagerREST;
pub use session::DefaultClientSession;

/// Remote operations on the singleton notifications registration of an instance
#[async_trait]
pub trait NotificationsRegistrationApi: Send + Sync {
    /// Create or replace the registration
    async fn create_notifications_registration(
        &self,
        request: &CreateNotificationsRegistrationRequest,
    ) -> Result<(NotificationsRegistration, DetailedResponse), ApiError>;

    /// Fetch the registration
    async fn get_notifications_registration(
        &self,
    ) -> Result<(NotificationsRegistration, DetailedResponse), ApiError>;

    /// Remove the registration
    async fn delete_notifications_registration(&self) -> Result<DetailedResponse, ApiError>;
}

/// A Secrets Manager client
///
/// A base client knows the provider defaults; [`SecretsManagerApi::with_instance_endpoint`]
/// returns a copy that targets one instance in one region.
pub trait SecretsManagerApi: NotificationsRegistrationApi {
    fn default_region(&self) -> &str;

    fn default_endpoint_type(&self) -> EndpointType;

    fn with_instance_endpoint(
        &self,
        instance_id: &str,
        region: &str,
        endpoint_type: EndpointType,
    ) -> Arc<dyn SecretsManagerApi>;
}

/// Source of Secrets Manager clients for the handlers
pub trait ClientSession: Send + Sync {
    /// # Errors
    /// Returns [`ProviderError::Session`] if no client can be built
    fn secrets_manager_v2(&self) -> Result<Arc<dyn SecretsManagerApi>, ProviderError>;
}
