//! Secrets Manager Event Notifications Registration
//!
//! Resource handlers for `ibm_sm_en_registration`, which registers an IBM
//! Cloud Secrets Manager instance as a source of an Event Notifications
//! instance.
//!
//! - [`resource`]: the lifecycle handlers (create, read, update, delete, import)
//! - [`provider`]: the Secrets Manager client seams and the REST client
//! - [`schema`]: attribute declarations and validators
//! - [`state`]: per-operation resource state and the on-disk state file
//! - [`config`]: environment configuration, including Pact mode
//! - [`observability`]: tracing setup and Prometheus metrics
//!
//! Tests are included in the module files and under `tests/`.

pub mod config;
pub mod constants;
pub mod error;
pub mod observability;
pub mod provider;
pub mod resource;
pub mod schema;
pub mod state;

pub use error::{ApiError, DetailedResponse, ProviderError};
pub use provider::{ClientSession, DefaultClientSession, Provider, SecretsManagerApi};
pub use resource::{EnRegistrationResource, Resource};
pub use state::ResourceData;
