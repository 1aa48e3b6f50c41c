//! # Request Types
//!
//! Secrets Manager v2 REST API request structures.

use serde::Serialize;

/// Request body for creating (or replacing) the notifications registration
///
/// Used in `POST /api/v2/notifications/registration`. The registration is a
/// singleton per instance, so posting again replaces it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateNotificationsRegistrationRequest {
    /// CRN of the Event Notifications instance
    pub event_notifications_instance_crn: String,
    /// Name shown as the source in the Event Notifications instance
    pub event_notifications_source_name: String,
    /// Omitted entirely when `None`; `Some("")` is sent as an empty string
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_notifications_source_description: Option<String>,
}

impl CreateNotificationsRegistrationRequest {
    pub fn new(
        event_notifications_instance_crn: impl Into<String>,
        event_notifications_source_name: impl Into<String>,
    ) -> Self {
        Self {
            event_notifications_instance_crn: event_notifications_instance_crn.into(),
            event_notifications_source_name: event_notifications_source_name.into(),
            event_notifications_source_description: None,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.event_notifications_source_description = description;
        self
    }
}
