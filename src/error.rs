//! # Errors
//!
//! Error types surfaced by the resource handlers.
//!
//! Remote failures keep the raw [`DetailedResponse`] so callers can inspect
//! the status code and the body returned by Secrets Manager.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

use crate::schema::validation::ValidationErrors;

/// Transport-level view of a Secrets Manager response
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailedResponse {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub result: Option<serde_json::Value>,
}

impl DetailedResponse {
    pub fn new(status_code: u16) -> Self {
        Self {
            status_code,
            headers: BTreeMap::new(),
            result: None,
        }
    }

    #[must_use]
    pub fn with_result(mut self, result: serde_json::Value) -> Self {
        self.result = Some(result);
        self
    }

    pub fn from_parts(
        status: reqwest::StatusCode,
        headers: &reqwest::header::HeaderMap,
        result: Option<serde_json::Value>,
    ) -> Self {
        let headers = headers
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        Self {
            status_code: status.as_u16(),
            headers,
            result,
        }
    }
}

impl fmt::Display for DetailedResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Response (status code: {})", self.status_code)?;
        if let Some(result) = &self.result {
            write!(f, ", result: {result}")?;
        }
        Ok(())
    }
}

/// A failed call against the Secrets Manager API
///
/// `response` is `None` when the request never produced an HTTP response
/// (connection refused, cancelled, invalid body).
#[derive(Debug, Clone, Error)]
#[error("{message}\n{}", describe_response(.response.as_ref()))]
pub struct ApiError {
    pub message: String,
    pub response: Option<DetailedResponse>,
}

impl ApiError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            response: None,
        }
    }

    pub fn with_response(message: impl Into<String>, response: DetailedResponse) -> Self {
        Self {
            message: message.into(),
            response: Some(response),
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        self.response.as_ref().map(|r| r.status_code)
    }

    pub fn is_not_found(&self) -> bool {
        self.status_code() == Some(404)
    }
}

fn describe_response(response: Option<&DetailedResponse>) -> String {
    response.map_or_else(|| "<no response>".to_string(), ToString::to_string)
}

/// Failure assigning a value on a [`crate::state::ResourceData`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    #[error("attribute {0:?} is not declared in the resource schema")]
    UnknownAttribute(String),
    #[error("attribute {attribute:?} expects a {expected} value")]
    TypeMismatch {
        attribute: String,
        expected: &'static str,
    },
}

/// Errors returned by the resource lifecycle handlers
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The session could not produce a Secrets Manager client
    #[error("failed to build Secrets Manager client: {0}")]
    Session(String),

    /// A remote call failed; carries the operation name and the raw response
    #[error("{operation} failed {error}")]
    Api {
        operation: &'static str,
        error: ApiError,
    },

    /// Configuration was rejected before any remote call
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    /// Writing a value back into resource state failed
    #[error("Error setting {attribute}: {source}")]
    State {
        attribute: String,
        #[source]
        source: StateError,
    },

    #[error("invalid resource id {id:?}: expected <region>/<instance_id>")]
    InvalidId { id: String },

    #[error("required attribute {0} is not set")]
    MissingAttribute(&'static str),

    #[error("{resource} with id {id} was not found")]
    NotFound { resource: &'static str, id: String },

    #[error("resource type {0:?} is not supported by this provider")]
    UnknownResource(String),
}

impl ProviderError {
    pub fn api(operation: &'static str, error: ApiError) -> Self {
        Self::Api { operation, error }
    }

    pub fn state(attribute: &str, source: StateError) -> Self {
        Self::State {
            attribute: attribute.to_string(),
            source,
        }
    }

    /// Status code of the failed remote call, if there was one
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Api { error, .. } => error.status_code(),
            _ => None,
        }
    }
}
