//! # Instance Endpoints
//!
//! Resolution of region, endpoint type and instance-scoped clients.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::warn;

use crate::constants::{ATTR_ENDPOINT_TYPE, ATTR_REGION, SECRETS_MANAGER_DOMAIN};
use crate::provider::SecretsManagerApi;
use crate::state::ResourceData;

/// Network path used to reach an instance
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndpointType {
    #[default]
    Public,
    Private,
}

impl EndpointType {
    pub const ALL: &'static [&'static str] = &["public", "private"];

    pub fn as_str(self) -> &'static str {
        match self {
            EndpointType::Public => "public",
            EndpointType::Private => "private",
        }
    }
}

impl fmt::Display for EndpointType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EndpointType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "public" => Ok(Self::Public),
            "private" => Ok(Self::Private),
            other => Err(format!("unsupported endpoint type: {other}")),
        }
    }
}

/// Service URL of one Secrets Manager instance
pub fn service_url(instance_id: &str, region: &str, endpoint_type: EndpointType) -> String {
    match endpoint_type {
        EndpointType::Public => {
            format!("https://{instance_id}.{region}.{SECRETS_MANAGER_DOMAIN}")
        }
        EndpointType::Private => {
            format!("https://{instance_id}.private.{region}.{SECRETS_MANAGER_DOMAIN}")
        }
    }
}

/// Region from the resource, or the client's default
pub fn get_region(client: &dyn SecretsManagerApi, d: &ResourceData) -> String {
    d.get_non_empty(ATTR_REGION)
        .map_or_else(|| client.default_region().to_string(), ToString::to_string)
}

/// Endpoint type from the resource, or the client's default
pub fn get_endpoint_type(client: &dyn SecretsManagerApi, d: &ResourceData) -> EndpointType {
    match d.get_non_empty(ATTR_ENDPOINT_TYPE) {
        Some(value) => value.parse().unwrap_or_else(|e| {
            warn!("{}; using {}", e, client.default_endpoint_type());
            client.default_endpoint_type()
        }),
        None => client.default_endpoint_type(),
    }
}

/// Client scoped to one instance in one region
pub fn get_client_with_instance_endpoint(
    client: &dyn SecretsManagerApi,
    instance_id: &str,
    region: &str,
    endpoint_type: EndpointType,
) -> Arc<dyn SecretsManagerApi> {
    client.with_instance_endpoint(instance_id, region, endpoint_type)
}
