//! # Constants
//!
//! Shared constants used throughout the provider.
//!
//! These values represent reasonable defaults and can be overridden via
//! configuration or environment variables where applicable.

/// Resource type name of the Event Notifications registration
pub const RESOURCE_EN_REGISTRATION: &str = "ibm_sm_en_registration";

// Attribute names

/// CRN of the Event Notifications instance to register with
pub const ATTR_EN_INSTANCE_CRN: &str = "event_notifications_instance_crn";

/// Display name of the source in the Event Notifications instance
pub const ATTR_EN_SOURCE_NAME: &str = "event_notifications_source_name";

/// Optional description of the source
pub const ATTR_EN_SOURCE_DESCRIPTION: &str = "event_notifications_source_description";

/// Secrets Manager instance GUID
pub const ATTR_INSTANCE_ID: &str = "instance_id";

/// Region of the Secrets Manager instance
pub const ATTR_REGION: &str = "region";

/// Endpoint type used to reach the instance (`public` or `private`)
pub const ATTR_ENDPOINT_TYPE: &str = "endpoint_type";

// Validation

/// CRN pattern accepted for `event_notifications_instance_crn`
pub const CRN_PATTERN: &str =
    r"^crn:v[0-9](:([A-Za-z0-9-._~!$&'()*+,;=@/]|%[0-9A-Z]{2})*){8}$";

/// Free-form pattern used by the name and description attributes
pub const ANY_STRING_PATTERN: &str = r"(.*?)";

pub const CRN_MIN_LENGTH: usize = 9;
pub const CRN_MAX_LENGTH: usize = 512;

pub const SOURCE_NAME_MIN_LENGTH: usize = 2;
pub const SOURCE_NAME_MAX_LENGTH: usize = 256;

pub const SOURCE_DESCRIPTION_MIN_LENGTH: usize = 0;
pub const SOURCE_DESCRIPTION_MAX_LENGTH: usize = 1024;

// Secrets Manager API

/// Path of the singleton registration resource
pub const NOTIFICATIONS_REGISTRATION_PATH: &str = "/api/v2/notifications/registration";

/// Domain suffix of Secrets Manager instance endpoints
pub const SECRETS_MANAGER_DOMAIN: &str = "secrets-manager.appdomain.cloud";

/// Region used when neither the resource nor the provider names one
pub const DEFAULT_REGION: &str = "us-south";

/// Header carrying the per-request correlation id
pub const CORRELATION_ID_HEADER: &str = "X-Correlation-Id";

/// Token used against Pact mock servers
pub const PACT_MODE_ACCESS_TOKEN: &str = "test-token";

// Environment variables

pub const ENV_REGION: &str = "IC_REGION";
pub const ENV_IAM_TOKEN: &str = "IC_IAM_TOKEN";
pub const ENV_ENDPOINT_TYPE: &str = "IBMCLOUD_SECRETS_MANAGER_ENDPOINT_TYPE";
pub const ENV_API_ENDPOINT: &str = "IBMCLOUD_SECRETS_MANAGER_API_ENDPOINT";
pub const ENV_LOG_LEVEL: &str = "LOG_LEVEL";
pub const ENV_LOG_FORMAT: &str = "LOG_FORMAT";
pub const ENV_PACT_MODE: &str = "PACT_MODE";
pub const ENV_PACT_ENDPOINT: &str = "SECRETS_MANAGER_PACT_ENDPOINT";

/// Current on-disk state file format version
pub const STATE_FILE_VERSION: u32 = 1;

// Remote operation names, used in error messages and metric labels

pub const OP_CREATE_NOTIFICATIONS_REGISTRATION: &str = "CreateNotificationsRegistration";
pub const OP_GET_NOTIFICATIONS_REGISTRATION: &str = "GetNotificationsRegistration";
pub const OP_DELETE_NOTIFICATIONS_REGISTRATION: &str = "DeleteNotificationsRegistration";
