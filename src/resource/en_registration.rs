//! # Event Notifications Registration
//!
//! `ibm_sm_en_registration`: registers a Secrets Manager instance as a source
//! of an Event Notifications instance.
//!
//! The registration is a singleton per Secrets Manager instance and the API
//! only offers create-or-replace, get and delete. Create and update therefore
//! both issue a create call carrying every field. The resource id is
//! `"{region}/{instance_id}"`.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::{Arc, LazyLock};
use tracing::{debug, info, info_span, Instrument};

use crate::constants::{
    ANY_STRING_PATTERN, ATTR_ENDPOINT_TYPE, ATTR_EN_INSTANCE_CRN, ATTR_EN_SOURCE_DESCRIPTION,
    ATTR_EN_SOURCE_NAME, ATTR_INSTANCE_ID, ATTR_REGION, CRN_MAX_LENGTH, CRN_MIN_LENGTH,
    CRN_PATTERN, OP_CREATE_NOTIFICATIONS_REGISTRATION, OP_DELETE_NOTIFICATIONS_REGISTRATION,
    OP_GET_NOTIFICATIONS_REGISTRATION, RESOURCE_EN_REGISTRATION, SOURCE_DESCRIPTION_MAX_LENGTH,
    SOURCE_DESCRIPTION_MIN_LENGTH, SOURCE_NAME_MAX_LENGTH, SOURCE_NAME_MIN_LENGTH,
};
use crate::error::ProviderError;
use crate::observability::metrics;
use crate::provider::{
    get_client_with_instance_endpoint, get_endpoint_type, get_region, ClientSession,
    CreateNotificationsRegistrationRequest, EndpointType, SecretsManagerApi,
};
use crate::resource::{composite_id, parse_composite_id, Resource};
use crate::schema::validation::{ResourceValidator, ValidateSchema};
use crate::schema::{Attribute, Schema};
use crate::state::ResourceData;

/// Attribute declarations of `ibm_sm_en_registration`
pub fn resource_schema() -> Schema {
    Schema::new()
        .with_attribute(
            Attribute::required_string(ATTR_INSTANCE_ID)
                .force_new()
                .with_description("The ID of the Secrets Manager instance."),
        )
        .with_attribute(
            Attribute::optional_string(ATTR_REGION)
                .computed()
                .force_new()
                .with_description(
                    "The region of the Secrets Manager instance. Defaults to the provider region.",
                ),
        )
        .with_attribute(
            Attribute::optional_string(ATTR_ENDPOINT_TYPE)
                .computed()
                .with_description("public or private."),
        )
        .with_attribute(
            Attribute::required_string(ATTR_EN_INSTANCE_CRN)
                .with_description("A CRN that uniquely identifies an IBM Cloud resource."),
        )
        .with_attribute(
            Attribute::required_string(ATTR_EN_SOURCE_NAME).with_description(
                "The name that is displayed as a source that is in your Event Notifications instance.",
            ),
        )
        .with_attribute(
            Attribute::optional_string(ATTR_EN_SOURCE_DESCRIPTION).with_description(
                "An optional description for the source that is in your Event Notifications instance.",
            ),
        )
}

/// Validation rules of `ibm_sm_en_registration`
///
/// # Errors
/// Returns an error if one of the patterns fails to compile
pub fn resource_validator() -> Result<ResourceValidator, regex::Error> {
    Ok(ResourceValidator {
        resource_name: RESOURCE_EN_REGISTRATION,
        schema: vec![
            ValidateSchema::regexp_len(
                ATTR_EN_INSTANCE_CRN,
                CRN_PATTERN,
                CRN_MIN_LENGTH,
                CRN_MAX_LENGTH,
            )?
            .required(),
            ValidateSchema::regexp_len(
                ATTR_EN_SOURCE_NAME,
                ANY_STRING_PATTERN,
                SOURCE_NAME_MIN_LENGTH,
                SOURCE_NAME_MAX_LENGTH,
            )?
            .required(),
            ValidateSchema::regexp_len(
                ATTR_EN_SOURCE_DESCRIPTION,
                ANY_STRING_PATTERN,
                SOURCE_DESCRIPTION_MIN_LENGTH,
                SOURCE_DESCRIPTION_MAX_LENGTH,
            )?,
            ValidateSchema::allowed_values(ATTR_ENDPOINT_TYPE, EndpointType::ALL),
        ],
    })
}

static SCHEMA: LazyLock<Arc<Schema>> = LazyLock::new(|| Arc::new(resource_schema()));

static VALIDATOR: LazyLock<ResourceValidator> = LazyLock::new(|| {
    resource_validator()
        .expect("Failed to compile registration validators - this should never happen")
});

/// Desired registration fields taken from resource state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationConfig {
    pub crn: String,
    pub name: String,
    pub description: Option<String>,
}

impl RegistrationConfig {
    /// # Errors
    /// Returns [`ProviderError::MissingAttribute`] if the CRN or source name is unset
    pub fn from_resource_data(d: &ResourceData) -> Result<Self, ProviderError> {
        let crn = d
            .get_str(ATTR_EN_INSTANCE_CRN)
            .ok_or(ProviderError::MissingAttribute(ATTR_EN_INSTANCE_CRN))?;
        let name = d
            .get_str(ATTR_EN_SOURCE_NAME)
            .ok_or(ProviderError::MissingAttribute(ATTR_EN_SOURCE_NAME))?;
        Ok(Self {
            crn: crn.to_string(),
            name: name.to_string(),
            description: d.get_str(ATTR_EN_SOURCE_DESCRIPTION).map(ToString::to_string),
        })
    }

    pub fn into_request(self) -> CreateNotificationsRegistrationRequest {
        CreateNotificationsRegistrationRequest::new(self.crn, self.name)
            .with_description(self.description)
    }
}

/// Upsert needed to bring the registration in line with `d`, if any
///
/// # Errors
/// Returns an error if a required field is missing from state
pub fn plan_upsert(
    d: &ResourceData,
) -> Result<Option<CreateNotificationsRegistrationRequest>, ProviderError> {
    let changed = [
        ATTR_EN_INSTANCE_CRN,
        ATTR_EN_SOURCE_NAME,
        ATTR_EN_SOURCE_DESCRIPTION,
    ]
    .iter()
    .any(|attr| d.has_change(attr));

    if !changed {
        return Ok(None);
    }
    let mut config = RegistrationConfig::from_resource_data(d)?;
    // A description dropped from config is cleared remotely
    if config.description.is_none() && d.has_change(ATTR_EN_SOURCE_DESCRIPTION) {
        config.description = Some(String::new());
    }
    Ok(Some(config.into_request()))
}

/// The `ibm_sm_en_registration` resource
#[derive(Debug, Default, Clone, Copy)]
pub struct EnRegistrationResource;

impl EnRegistrationResource {
    pub fn new() -> Self {
        Self
    }

    /// Client scoped to the instance named by the resource id
    fn scoped_client(
        client: &dyn SecretsManagerApi,
        d: &ResourceData,
    ) -> Result<(String, String, Arc<dyn SecretsManagerApi>), ProviderError> {
        let (region, instance_id) = parse_composite_id(d.id())?;
        let scoped = get_client_with_instance_endpoint(
            client,
            &instance_id,
            &region,
            get_endpoint_type(client, d),
        );
        Ok((region, instance_id, scoped))
    }

    async fn upsert(
        client: &dyn SecretsManagerApi,
        request: &CreateNotificationsRegistrationRequest,
    ) -> Result<(), ProviderError> {
        match client.create_notifications_registration(request).await {
            Ok((registration, detailed)) => {
                debug!(
                    "Registered Event Notifications instance {} (status {})",
                    registration.event_notifications_instance_crn, detailed.status_code
                );
                Ok(())
            }
            Err(e) => {
                debug!("CreateNotificationsRegistration failed {}", e);
                Err(ProviderError::api(OP_CREATE_NOTIFICATIONS_REGISTRATION, e))
            }
        }
    }
}

fn set_attr(d: &mut ResourceData, key: &str, value: impl Into<Value>) -> Result<(), ProviderError> {
    d.set(key, value).map_err(|e| ProviderError::state(key, e))
}

#[async_trait]
impl Resource for EnRegistrationResource {
    fn type_name(&self) -> &'static str {
        RESOURCE_EN_REGISTRATION
    }

    fn schema(&self) -> Arc<Schema> {
        Arc::clone(&SCHEMA)
    }

    fn validator(&self) -> &ResourceValidator {
        &VALIDATOR
    }

    async fn create(
        &self,
        session: &dyn ClientSession,
        d: &mut ResourceData,
    ) -> Result<(), ProviderError> {
        self.validate(d.attributes())?;
        let client = session.secrets_manager_v2()?;

        let region = get_region(client.as_ref(), d);
        let instance_id = d
            .get_non_empty(ATTR_INSTANCE_ID)
            .ok_or(ProviderError::MissingAttribute(ATTR_INSTANCE_ID))?
            .to_string();
        let id = composite_id(&region, &instance_id);
        parse_composite_id(&id)?;

        let span = info_span!(
            "sm.en_registration.create",
            instance.id = %instance_id,
            region = %region,
        );

        async {
            let scoped = get_client_with_instance_endpoint(
                client.as_ref(),
                &instance_id,
                &region,
                get_endpoint_type(client.as_ref(), d),
            );
            let request = RegistrationConfig::from_resource_data(d)?.into_request();
            Self::upsert(scoped.as_ref(), &request).await?;

            d.set_id(id);
            info!("Created notifications registration {}", d.id());
            self.read(session, d).await
        }
        .instrument(span)
        .await
    }

    async fn read(
        &self,
        session: &dyn ClientSession,
        d: &mut ResourceData,
    ) -> Result<(), ProviderError> {
        let client = session.secrets_manager_v2()?;
        let (region, instance_id, scoped) = Self::scoped_client(client.as_ref(), d)?;
        let endpoint_type = get_endpoint_type(client.as_ref(), d);

        let span = tracing::debug_span!(
            "sm.en_registration.read",
            instance.id = %instance_id,
            region = %region,
        );

        async {
            let registration = match scoped.get_notifications_registration().await {
                Ok((registration, _)) => registration,
                Err(e) if e.is_not_found() => {
                    info!(
                        "Notifications registration {} not found, removing from state",
                        d.id()
                    );
                    metrics::increment_not_found();
                    d.clear_id();
                    return Ok(());
                }
                Err(e) => {
                    debug!("GetNotificationsRegistration failed {}", e);
                    return Err(ProviderError::api(OP_GET_NOTIFICATIONS_REGISTRATION, e));
                }
            };

            set_attr(d, ATTR_INSTANCE_ID, instance_id.as_str())?;
            set_attr(d, ATTR_REGION, region.as_str())?;
            set_attr(d, ATTR_ENDPOINT_TYPE, endpoint_type.as_str())?;
            set_attr(
                d,
                ATTR_EN_INSTANCE_CRN,
                registration.event_notifications_instance_crn,
            )?;
            Ok::<(), ProviderError>(())
        }
        .instrument(span)
        .await
    }

    async fn update(
        &self,
        session: &dyn ClientSession,
        d: &mut ResourceData,
    ) -> Result<(), ProviderError> {
        self.validate(d.attributes())?;
        let client = session.secrets_manager_v2()?;
        let (region, instance_id, scoped) = Self::scoped_client(client.as_ref(), d)?;

        let span = info_span!(
            "sm.en_registration.update",
            instance.id = %instance_id,
            region = %region,
        );

        async {
            match plan_upsert(d)? {
                Some(request) => {
                    Self::upsert(scoped.as_ref(), &request).await?;
                    info!("Updated notifications registration {}", d.id());
                }
                None => debug!("Notifications registration {} is up to date", d.id()),
            }
            self.read(session, d).await
        }
        .instrument(span)
        .await
    }

    async fn delete(
        &self,
        session: &dyn ClientSession,
        d: &mut ResourceData,
    ) -> Result<(), ProviderError> {
        let client = session.secrets_manager_v2()?;
        let (region, instance_id, scoped) = Self::scoped_client(client.as_ref(), d)?;

        let span = info_span!(
            "sm.en_registration.delete",
            instance.id = %instance_id,
            region = %region,
        );

        async {
            if let Err(e) = scoped.delete_notifications_registration().await {
                debug!("DeleteNotificationsRegistration failed {}", e);
                return Err(ProviderError::api(OP_DELETE_NOTIFICATIONS_REGISTRATION, e));
            }
            info!("Deleted notifications registration {}", d.id());
            d.clear_id();
            Ok::<(), ProviderError>(())
        }
        .instrument(span)
        .await
    }
}
