//! # Registration Operations
//!
//! Implementation of `NotificationsRegistrationApi` for the Secrets Manager REST API.

use async_trait::async_trait;
use reqwest::Method;
use std::time::Instant;
use tracing::{debug, info_span, Instrument};

use super::requests::CreateNotificationsRegistrationRequest;
use super::responses::NotificationsRegistration;
use super::SecretsManagerREST;
use crate::constants::{
    NOTIFICATIONS_REGISTRATION_PATH, OP_CREATE_NOTIFICATIONS_REGISTRATION,
    OP_DELETE_NOTIFICATIONS_REGISTRATION, OP_GET_NOTIFICATIONS_REGISTRATION,
};
use crate::error::{ApiError, DetailedResponse};
use crate::observability::metrics;
use crate::provider::NotificationsRegistrationApi;

/// Decode a registration body, keeping the transport details on failure
fn parse_registration(
    body: Option<serde_json::Value>,
    detailed: DetailedResponse,
) -> Result<(NotificationsRegistration, DetailedResponse), ApiError> {
    let Some(body) = body else {
        return Err(ApiError::with_response(
            "response did not contain a notifications registration",
            detailed,
        ));
    };
    match serde_json::from_value::<NotificationsRegistration>(body) {
        Ok(registration) => Ok((registration, detailed)),
        Err(e) => Err(ApiError::with_response(
            format!("failed to parse notifications registration: {e}"),
            detailed,
        )),
    }
}

/// Record duration and outcome of a finished call
fn record_outcome<T>(operation: &str, start: Instant, result: &Result<T, ApiError>) {
    let elapsed = start.elapsed();
    let span = tracing::Span::current();
    span.record("operation.duration_ms", elapsed.as_millis() as u64);
    metrics::record_operation(operation, elapsed.as_secs_f64());
    match result {
        Ok(_) => {
            span.record("operation.success", true);
        }
        Err(e) => {
            span.record("operation.success", false);
            if let Some(status) = e.status_code() {
                span.record("http.status_code", status);
            }
            metrics::increment_operation_errors(operation);
        }
    }
}

#[async_trait]
impl NotificationsRegistrationApi for SecretsManagerREST {
    async fn create_notifications_registration(
        &self,
        request: &CreateNotificationsRegistrationRequest,
    ) -> Result<(NotificationsRegistration, DetailedResponse), ApiError> {
        let span = info_span!(
            "secrets_manager.notifications_registration.create",
            service.url = self.service_url(),
            operation.success = tracing::field::Empty,
            operation.duration_ms = tracing::field::Empty,
            http.status_code = tracing::field::Empty,
        );

        async move {
            let start = Instant::now();
            let body = serde_json::to_value(request)
                .map_err(|e| ApiError::transport(format!("failed to encode request: {e}")))?;
            let http_request =
                self.make_request(Method::POST, NOTIFICATIONS_REGISTRATION_PATH, Some(body))?;

            let result = match self.execute(http_request).await {
                Ok((body, detailed)) => parse_registration(body, detailed),
                Err(e) => Err(e),
            };
            record_outcome(OP_CREATE_NOTIFICATIONS_REGISTRATION, start, &result);
            result
        }
        .instrument(span)
        .await
    }

    async fn get_notifications_registration(
        &self,
    ) -> Result<(NotificationsRegistration, DetailedResponse), ApiError> {
        let span = tracing::debug_span!(
            "secrets_manager.notifications_registration.get",
            service.url = self.service_url(),
            operation.success = tracing::field::Empty,
            operation.duration_ms = tracing::field::Empty,
            http.status_code = tracing::field::Empty,
        );

        async move {
            let start = Instant::now();
            let http_request = self.make_request(Method::GET, NOTIFICATIONS_REGISTRATION_PATH, None)?;

            let result = match self.execute(http_request).await {
                Ok((body, detailed)) => parse_registration(body, detailed),
                Err(e) => Err(e),
            };
            record_outcome(OP_GET_NOTIFICATIONS_REGISTRATION, start, &result);
            result
        }
        .instrument(span)
        .await
    }

    async fn delete_notifications_registration(&self) -> Result<DetailedResponse, ApiError> {
        let span = info_span!(
            "secrets_manager.notifications_registration.delete",
            service.url = self.service_url(),
            operation.success = tracing::field::Empty,
            operation.duration_ms = tracing::field::Empty,
            http.status_code = tracing::field::Empty,
        );

        async move {
            let start = Instant::now();
            let http_request =
                self.make_request(Method::DELETE, NOTIFICATIONS_REGISTRATION_PATH, None)?;

            let result = self.execute(http_request).await.map(|(_, detailed)| detailed);
            if let Ok(detailed) = &result {
                debug!(
                    "Notifications registration deleted (status {})",
                    detailed.status_code
                );
            }
            record_outcome(OP_DELETE_NOTIFICATIONS_REGISTRATION, start, &result);
            result
        }
        .instrument(span)
        .await
    }
}
