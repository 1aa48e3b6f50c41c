//! # Secrets Manager REST Client
//!
//! Native REST implementation of the Secrets Manager v2 notifications
//! registration API. Uses reqwest for HTTP requests; the IAM bearer token is
//! supplied by configuration.
//!
//! A client built by [`SecretsManagerREST::new`] carries the provider defaults
//! only. It must be scoped with [`SecretsManagerApi::with_instance_endpoint`]
//! before it can reach an instance.
//!
//! References:
//! - [Secrets Manager API v2](https://cloud.ibm.com/apidocs/secrets-manager/secrets-manager-v2)

use anyhow::{Context, Result};
use reqwest::{Client, Method};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::ProviderConfig;
use crate::constants::{CORRELATION_ID_HEADER, ENV_IAM_TOKEN, PACT_MODE_ACCESS_TOKEN};
use crate::error::{ApiError, DetailedResponse};
use crate::provider::endpoint::{service_url, EndpointType};
use crate::provider::SecretsManagerApi;

mod operations;
pub mod requests;
pub mod responses;

use responses::ErrorResponse;

/// Secrets Manager REST client
#[derive(Clone)]
pub struct SecretsManagerREST {
    http_client: Client,
    access_token: String,
    default_region: String,
    default_endpoint_type: EndpointType,
    endpoint_override: Option<String>,
    service_url: Option<String>,
}

impl std::fmt::Debug for SecretsManagerREST {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretsManagerREST")
            .field("default_region", &self.default_region)
            .field("default_endpoint_type", &self.default_endpoint_type)
            .field("service_url", &self.service_url)
            .finish_non_exhaustive()
    }
}

impl SecretsManagerREST {
    /// Create a base client from provider configuration
    ///
    /// When Pact mode is enabled, uses a dummy token and routes every
    /// instance to the mock server.
    ///
    /// # Errors
    /// Returns an error if no token is configured, the Pact configuration is
    /// invalid, or the HTTP client cannot be built
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        let pact_endpoint = config
            .pact_mode
            .endpoint()
            .context("Invalid PACT_MODE configuration")?
            .map(ToString::to_string);

        let access_token = if pact_endpoint.is_some() {
            debug!("Pact mode: using dummy access token");
            PACT_MODE_ACCESS_TOKEN.to_string()
        } else {
            config.iam_access_token.clone().ok_or_else(|| {
                anyhow::anyhow!("No IAM access token available. Set {ENV_IAM_TOKEN}.")
            })?
        };

        let endpoint_override = pact_endpoint.or_else(|| config.api_endpoint.clone());
        if let Some(endpoint) = &endpoint_override {
            info!("Using Secrets Manager endpoint override: {}", endpoint);
        }

        let http_client = Client::builder()
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http_client,
            access_token,
            default_region: config.region.clone(),
            default_endpoint_type: config.endpoint_type,
            endpoint_override,
            service_url: None,
        })
    }

    /// Service URL this client targets, once scoped
    pub fn service_url(&self) -> Option<&str> {
        self.service_url.as_deref()
    }

    /// Build HTTP request with authentication headers
    fn make_request(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<reqwest::RequestBuilder, ApiError> {
        let base_url = self.service_url.as_deref().ok_or_else(|| {
            ApiError::transport("Secrets Manager client is not scoped to an instance")
        })?;
        let url = format!("{}{}", base_url.trim_end_matches('/'), path);

        // Add "Bearer " prefix if not already present
        let auth_header = if self.access_token.starts_with("Bearer ") {
            self.access_token.clone()
        } else {
            format!("Bearer {}", self.access_token)
        };

        let mut request = self
            .http_client
            .request(method, &url)
            .header("Authorization", auth_header)
            .header("Accept", "application/json")
            .header(CORRELATION_ID_HEADER, Uuid::new_v4().to_string());

        if let Some(body) = body {
            request = request.json(&body);
        }

        Ok(request)
    }

    /// Send a request and split the outcome into body and transport details
    async fn execute(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<(Option<serde_json::Value>, DetailedResponse), ApiError> {
        let response = request
            .send()
            .await
            .map_err(|e| ApiError::transport(format!("request failed: {e}")))?;

        let status = response.status();
        let headers = response.headers().clone();
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::transport(format!("failed to read response body: {e}")))?;

        let body = if text.trim().is_empty() {
            None
        } else {
            serde_json::from_str::<serde_json::Value>(&text).ok()
        };
        let detailed = DetailedResponse::from_parts(status, &headers, body.clone());

        if status.is_success() {
            Ok((body, detailed))
        } else {
            Err(Self::handle_error_response(status, &text, detailed))
        }
    }

    /// Turn a non-success response into an [`ApiError`]
    fn handle_error_response(
        status: reqwest::StatusCode,
        error_text: &str,
        detailed: DetailedResponse,
    ) -> ApiError {
        let message = serde_json::from_str::<ErrorResponse>(error_text)
            .ok()
            .and_then(|body| body.summary())
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .map_or_else(|| format!("HTTP {}", status.as_u16()), ToString::to_string)
            });
        ApiError::with_response(message, detailed)
    }
}

impl SecretsManagerApi for SecretsManagerREST {
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
        let url = self
            .endpoint_override
            .clone()
            .unwrap_or_else(|| service_url(instance_id, region, endpoint_type));
        debug!(
            instance.id = instance_id,
            region = region,
            endpoint_type = %endpoint_type,
            "Scoping Secrets Manager client to {}",
            url
        );
        Arc::new(Self {
            service_url: Some(url),
            ..self.clone()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PactModeConfig;

    #[test]
    fn test_new_requires_token() {
        let err = SecretsManagerREST::new(&ProviderConfig::default()).unwrap_err();
        assert!(err.to_string().contains("IC_IAM_TOKEN"));
    }

    #[test]
    fn test_pact_mode_uses_dummy_token_and_override() {
        let config = ProviderConfig {
            pact_mode: PactModeConfig::enabled("http://localhost:9999"),
            ..ProviderConfig::default()
        };
        let client = SecretsManagerREST::new(&config).unwrap();
        assert_eq!(client.access_token, "test-token");
        let scoped = client.with_instance_endpoint("abc", "us-south", EndpointType::Public);
        assert_eq!(scoped.default_region(), "us-south");
        assert_eq!(
            client.endpoint_override.as_deref(),
            Some("http://localhost:9999")
        );
    }

    #[test]
    fn test_unscoped_client_refuses_requests() {
        let config = ProviderConfig {
            iam_access_token: Some("token".to_string()),
            ..ProviderConfig::default()
        };
        let client = SecretsManagerREST::new(&config).unwrap();
        assert!(client.service_url().is_none());
        assert!(client.make_request(Method::GET, "/x", None).is_err());
    }

    #[test]
    fn test_error_response_prefers_body_message() {
        let detailed = DetailedResponse::new(404);
        let err = SecretsManagerREST::handle_error_response(
            reqwest::StatusCode::NOT_FOUND,
            r#"{"errors":[{"code":"not_found","message":"Not registered"}]}"#,
            detailed,
        );
        assert!(err.message.starts_with("Not registered"));
        assert!(err.is_not_found());
    }

    #[test]
    fn test_error_response_falls_back_to_reason() {
        let err = SecretsManagerREST::handle_error_response(
            reqwest::StatusCode::INTERNAL_SERVER_ERROR,
            "oops",
            DetailedResponse::new(500),
        );
        assert_eq!(err.message, "Internal Server Error");
    }
}
