//! Common test utilities
//!
//! Provides rustls crypto provider setup for the Pact tests and an
//! in-memory Secrets Manager for the handler tests.

#![allow(dead_code, reason = "each test binary uses a different subset")]

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, Once};

use sm_en_registration::error::{ApiError, DetailedResponse, ProviderError};
use sm_en_registration::provider::{
    ClientSession, CreateNotificationsRegistrationRequest, EndpointType,
    NotificationsRegistration, NotificationsRegistrationApi, SecretsManagerApi,
};

static RUSTLS_INIT: Once = Once::new();

/// Initialize rustls crypto provider for tests
///
/// This must be called before any async operations that use rustls.
/// Uses a `Once` to ensure it's only called once across all tests.
pub fn init_rustls() {
    RUSTLS_INIT.call_once(|| {
        rustls::crypto::ring::default_provider()
            .install_default()
            .expect("Failed to install rustls crypto provider");
    });
}

pub const CRN: &str = "crn:v1:bluemix:public:event-notifications:us-south:a/abc123:def456::";

/// Attribute map from a JSON object literal
pub fn map(value: Value) -> Map<String, Value> {
    value.as_object().cloned().expect("expected a JSON object")
}

/// Instance a call was scoped to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scope {
    pub instance_id: String,
    pub region: String,
    pub endpoint_type: EndpointType,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Create(Scope, CreateNotificationsRegistrationRequest),
    Get(Scope),
    Delete(Scope),
}

#[derive(Debug, Default)]
pub struct FakeState {
    /// Registrations keyed by instance id
    pub registrations: HashMap<String, CreateNotificationsRegistrationRequest>,
    pub calls: Vec<Call>,
    pub fail_create: Option<u16>,
    pub fail_get: Option<u16>,
    pub fail_delete: Option<u16>,
}

/// In-memory Secrets Manager
#[derive(Debug, Clone)]
pub struct FakeSecretsManager {
    state: Arc<Mutex<FakeState>>,
    default_region: String,
    default_endpoint_type: EndpointType,
    scope: Option<Scope>,
}

impl FakeSecretsManager {
    pub fn new(default_region: &str) -> Self {
        Self {
            state: Arc::new(Mutex::new(FakeState::default())),
            default_region: default_region.to_string(),
            default_endpoint_type: EndpointType::Public,
            scope: None,
        }
    }

    pub fn with_registration(self, instance_id: &str, crn: &str, name: &str) -> Self {
        self.state.lock().unwrap().registrations.insert(
            instance_id.to_string(),
            CreateNotificationsRegistrationRequest::new(crn, name),
        );
        self
    }

    pub fn state(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state().calls.clone()
    }

    pub fn create_calls(&self) -> Vec<CreateNotificationsRegistrationRequest> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Create(_, request) => Some(request),
                _ => None,
            })
            .collect()
    }

    pub fn clear_calls(&self) {
        self.state().calls.clear();
    }

    fn scope(&self) -> Result<Scope, ApiError> {
        self.scope
            .clone()
            .ok_or_else(|| ApiError::transport("client is not scoped to an instance"))
    }

    fn simulated(status: u16) -> ApiError {
        ApiError::with_response(
            "Simulated failure",
            DetailedResponse::new(status).with_result(serde_json::json!({"trace": "fake"})),
        )
    }
}

#[async_trait]
impl NotificationsRegistrationApi for FakeSecretsManager {
    async fn create_notifications_registration(
        &self,
        request: &CreateNotificationsRegistrationRequest,
    ) -> Result<(NotificationsRegistration, DetailedResponse), ApiError> {
        let scope = self.scope()?;
        let mut state = self.state();
        state.calls.push(Call::Create(scope.clone(), request.clone()));
        if let Some(status) = state.fail_create {
            return Err(Self::simulated(status));
        }
        state
            .registrations
            .insert(scope.instance_id, request.clone());
        Ok((
            NotificationsRegistration {
                event_notifications_instance_crn: request.event_notifications_instance_crn.clone(),
            },
            DetailedResponse::new(201),
        ))
    }

    async fn get_notifications_registration(
        &self,
    ) -> Result<(NotificationsRegistration, DetailedResponse), ApiError> {
        let scope = self.scope()?;
        let mut state = self.state();
        state.calls.push(Call::Get(scope.clone()));
        if let Some(status) = state.fail_get {
            return Err(Self::simulated(status));
        }
        match state.registrations.get(&scope.instance_id) {
            Some(registration) => Ok((
                NotificationsRegistration {
                    event_notifications_instance_crn: registration
                        .event_notifications_instance_crn
                        .clone(),
                },
                DetailedResponse::new(200),
            )),
            None => Err(ApiError::with_response(
                "Not Found",
                DetailedResponse::new(404),
            )),
        }
    }

    async fn delete_notifications_registration(&self) -> Result<DetailedResponse, ApiError> {
        let scope = self.scope()?;
        let mut state = self.state();
        state.calls.push(Call::Delete(scope.clone()));
        if let Some(status) = state.fail_delete {
            return Err(Self::simulated(status));
        }
        state.registrations.remove(&scope.instance_id);
        Ok(DetailedResponse::new(204))
    }
}

impl SecretsManagerApi for FakeSecretsManager {
    fn default_region(&self) -> &str {
        &self.default_region
    }

    fn default_endpoint_type(&self) -> EndpointType {
        self.default_endpoint_type
    }

    fn with_instance_endpoint(
        &self,
        instance_id: &str,
        region: &str,
        endpoint_type: EndpointType,
    ) -> Arc<dyn SecretsManagerApi> {
        Arc::new(Self {
            scope: Some(Scope {
                instance_id: instance_id.to_string(),
                region: region.to_string(),
                endpoint_type,
            }),
            ..self.clone()
        })
    }
}

/// [`ClientSession`] handing out a shared [`FakeSecretsManager`]
#[derive(Debug, Clone)]
pub struct FakeSession {
    pub manager: FakeSecretsManager,
    pub fail: bool,
}

impl FakeSession {
    pub fn new(manager: FakeSecretsManager) -> Self {
        Self {
            manager,
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            manager: FakeSecretsManager::new("us-south"),
            fail: true,
        }
    }
}

impl ClientSession for FakeSession {
    fn secrets_manager_v2(&self) -> Result<Arc<dyn SecretsManagerApi>, ProviderError> {
        if self.fail {
            return Err(ProviderError::Session("no IAM token".to_string()));
        }
        Ok(Arc::new(self.manager.clone()))
    }
}
