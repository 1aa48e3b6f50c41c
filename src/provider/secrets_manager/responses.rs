//! # Response Types
//!
//! Secrets Manager v2 REST API response structures.

use serde::{Deserialize, Serialize};

/// The notifications registration of an instance
///
/// Returned by create and get. The API only echoes the Event Notifications
/// instance CRN; source name and description are write-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationsRegistration {
    pub event_notifications_instance_crn: String,
}

/// Error body returned by Secrets Manager
///
/// `{"errors":[{"code":"not_found","message":"..."}],"trace":"...","status_code":404}`
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorResponse {
    #[serde(default)]
    pub errors: Vec<ErrorDetail>,
    #[serde(default)]
    pub trace: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorDetail {
    #[serde(default)]
    pub code: Option<String>,
    pub message: String,
}

impl ErrorResponse {
    /// First error message with its code, if any
    pub fn summary(&self) -> Option<String> {
        let first = self.errors.first()?;
        let mut summary = first.message.clone();
        if let Some(code) = &first.code {
            summary.push_str(&format!(" (code: {code})"));
        }
        if let Some(trace) = &self.trace {
            summary.push_str(&format!(" (trace: {trace})"));
        }
        Some(summary)
    }
}
