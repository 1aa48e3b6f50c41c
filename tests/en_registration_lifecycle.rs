//! Lifecycle tests for the `ibm_sm_en_registration` handlers
//!
//! Drive create, read, update, delete and import against an in-memory
//! Secrets Manager and check the calls it received.

mod common;

use common::{map, Call, FakeSecretsManager, FakeSession, Scope, CRN};
use serde_json::json;

use sm_en_registration::provider::EndpointType;
use sm_en_registration::{EnRegistrationResource, ProviderError, Resource, ResourceData};

fn config() -> serde_json::Map<String, serde_json::Value> {
    map(json!({
        "instance_id": "abc-123",
        "event_notifications_instance_crn": CRN,
        "event_notifications_source_name": "My Secrets Manager",
    }))
}

fn scope(region: &str) -> Scope {
    Scope {
        instance_id: "abc-123".to_string(),
        region: region.to_string(),
        endpoint_type: EndpointType::Public,
    }
}

/// State of a registration created with [`config`] in us-south
fn created_state(prior_config: serde_json::Map<String, serde_json::Value>) -> ResourceData {
    let mut prior = prior_config;
    prior.insert("region".into(), json!("us-south"));
    prior.insert("endpoint_type".into(), json!("public"));
    ResourceData::from_prior(
        EnRegistrationResource.schema(),
        "us-south/abc-123",
        prior.clone(),
        prior,
    )
}

#[tokio::test]
async fn test_create_sets_composite_id_and_reads_back() {
    let session = FakeSession::new(FakeSecretsManager::new("us-south"));
    let mut d = ResourceData::from_config(EnRegistrationResource.schema(), config());

    EnRegistrationResource.create(&session, &mut d).await.unwrap();

    assert_eq!(d.id(), "us-south/abc-123");
    assert_eq!(d.get_str("event_notifications_instance_crn"), Some(CRN));
    assert_eq!(d.get_str("region"), Some("us-south"));
    assert_eq!(d.get_str("instance_id"), Some("abc-123"));
    assert_eq!(d.get_str("endpoint_type"), Some("public"));

    let calls = session.manager.calls();
    assert_eq!(calls.len(), 2);
    assert!(matches!(&calls[0], Call::Create(s, _) if *s == scope("us-south")));
    assert_eq!(calls[1], Call::Get(scope("us-south")));
}

#[tokio::test]
async fn test_create_request_omits_unset_description() {
    let session = FakeSession::new(FakeSecretsManager::new("us-south"));
    let mut d = ResourceData::from_config(EnRegistrationResource.schema(), config());

    EnRegistrationResource.create(&session, &mut d).await.unwrap();

    let creates = session.manager.create_calls();
    assert_eq!(creates.len(), 1);
    assert_eq!(creates[0].event_notifications_instance_crn, CRN);
    assert_eq!(creates[0].event_notifications_source_name, "My Secrets Manager");
    assert_eq!(creates[0].event_notifications_source_description, None);
}

#[tokio::test]
async fn test_create_uses_resource_region_and_endpoint_type() {
    let session = FakeSession::new(FakeSecretsManager::new("us-south"));
    let mut input = config();
    input.insert("region".into(), json!("eu-de"));
    input.insert("endpoint_type".into(), json!("private"));
    input.insert("event_notifications_source_description".into(), json!(""));
    let mut d = ResourceData::from_config(EnRegistrationResource.schema(), input);

    EnRegistrationResource.create(&session, &mut d).await.unwrap();

    assert_eq!(d.id(), "eu-de/abc-123");
    let expected = Scope {
        instance_id: "abc-123".to_string(),
        region: "eu-de".to_string(),
        endpoint_type: EndpointType::Private,
    };
    match &session.manager.calls()[0] {
        Call::Create(s, request) => {
            assert_eq!(*s, expected);
            assert_eq!(
                request.event_notifications_source_description.as_deref(),
                Some("")
            );
        }
        other => panic!("expected a create call, got {other:?}"),
    }
}

#[tokio::test]
async fn test_create_failure_carries_operation_and_status() {
    let manager = FakeSecretsManager::new("us-south");
    manager.state().fail_create = Some(500);
    let session = FakeSession::new(manager);
    let mut d = ResourceData::from_config(EnRegistrationResource.schema(), config());

    let err = EnRegistrationResource
        .create(&session, &mut d)
        .await
        .unwrap_err();

    assert!(!d.exists());
    assert_eq!(err.status_code(), Some(500));
    let message = err.to_string();
    assert!(message.starts_with("CreateNotificationsRegistration failed Simulated failure"));
    assert!(message.contains("status code: 500"));
    assert_eq!(session.manager.calls().len(), 1);
}

#[tokio::test]
async fn test_invalid_crn_rejected_before_remote_call() {
    let session = FakeSession::new(FakeSecretsManager::new("us-south"));
    let mut input = config();
    input.insert("event_notifications_instance_crn".into(), json!("arn:aws:sns"));
    let mut d = ResourceData::from_config(EnRegistrationResource.schema(), input);

    let err = EnRegistrationResource
        .create(&session, &mut d)
        .await
        .unwrap_err();

    match err {
        ProviderError::Validation(errors) => {
            assert!(errors.has_error_for("event_notifications_instance_crn"));
        }
        other => panic!("expected validation error, got {other:?}"),
    }
    assert!(session.manager.calls().is_empty());
}

#[tokio::test]
async fn test_short_source_name_rejected_before_remote_call() {
    let session = FakeSession::new(FakeSecretsManager::new("us-south"));
    let mut input = config();
    input.insert("event_notifications_source_name".into(), json!("x"));
    let mut d = ResourceData::from_config(EnRegistrationResource.schema(), input);

    let err = EnRegistrationResource
        .create(&session, &mut d)
        .await
        .unwrap_err();

    assert!(matches!(err, ProviderError::Validation(_)));
    assert!(session.manager.calls().is_empty());
}

#[tokio::test]
async fn test_missing_instance_id_rejected() {
    let session = FakeSession::new(FakeSecretsManager::new("us-south"));
    let mut input = config();
    input.remove("instance_id");
    let mut d = ResourceData::from_config(EnRegistrationResource.schema(), input);

    let err = EnRegistrationResource
        .create(&session, &mut d)
        .await
        .unwrap_err();

    assert!(matches!(err, ProviderError::MissingAttribute("instance_id")));
    assert!(session.manager.calls().is_empty());
}

#[tokio::test]
async fn test_slash_in_id_parts_rejected_before_remote_call() {
    for (attribute, value, id) in [
        ("region", "us/south", "us/south/abc-123"),
        ("instance_id", "abc/123", "us-south/abc/123"),
    ] {
        let session = FakeSession::new(FakeSecretsManager::new("us-south"));
        let mut input = config();
        input.insert(attribute.into(), json!(value));
        let mut d = ResourceData::from_config(EnRegistrationResource.schema(), input);

        let err = EnRegistrationResource
            .create(&session, &mut d)
            .await
            .unwrap_err();

        assert!(
            matches!(&err, ProviderError::InvalidId { id: got } if got == id),
            "{attribute} = {value:?} gave {err:?}"
        );
        assert!(session.manager.calls().is_empty());
        assert!(session.manager.state().registrations.is_empty());
        assert!(!d.exists());
    }
}

#[tokio::test]
async fn test_session_failure_surfaces_before_remote_call() {
    let session = FakeSession::failing();
    let mut d = ResourceData::from_config(EnRegistrationResource.schema(), config());

    let err = EnRegistrationResource
        .create(&session, &mut d)
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::Session(_)));

    let mut existing = created_state(config());
    let err = EnRegistrationResource
        .read(&session, &mut existing)
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::Session(_)));
    assert_eq!(existing.id(), "us-south/abc-123");
    assert!(session.manager.calls().is_empty());
}

#[tokio::test]
async fn test_read_not_found_clears_id() {
    let session = FakeSession::new(FakeSecretsManager::new("us-south"));
    let mut d = created_state(config());

    EnRegistrationResource.read(&session, &mut d).await.unwrap();

    assert!(!d.exists());
    assert_eq!(session.manager.calls(), vec![Call::Get(scope("us-south"))]);
}

#[tokio::test]
async fn test_read_refreshes_crn() {
    let other_crn = "crn:v1:bluemix:public:event-notifications:eu-de:a/abc123:other::";
    let manager =
        FakeSecretsManager::new("us-south").with_registration("abc-123", other_crn, "renamed");
    let session = FakeSession::new(manager);
    let mut d = created_state(config());

    EnRegistrationResource.read(&session, &mut d).await.unwrap();

    assert_eq!(d.id(), "us-south/abc-123");
    assert_eq!(d.get_str("event_notifications_instance_crn"), Some(other_crn));
}

#[tokio::test]
async fn test_read_failure_is_wrapped() {
    let manager = FakeSecretsManager::new("us-south");
    manager.state().fail_get = Some(403);
    let session = FakeSession::new(manager);
    let mut d = created_state(config());

    let err = EnRegistrationResource.read(&session, &mut d).await.unwrap_err();

    assert!(err
        .to_string()
        .starts_with("GetNotificationsRegistration failed"));
    assert_eq!(err.status_code(), Some(403));
    assert!(d.exists());
}

#[tokio::test]
async fn test_read_rejects_malformed_id() {
    let session = FakeSession::new(FakeSecretsManager::new("us-south"));
    let mut d = ResourceData::from_prior(
        EnRegistrationResource.schema(),
        "abc-123",
        config(),
        config(),
    );

    let err = EnRegistrationResource.read(&session, &mut d).await.unwrap_err();

    assert!(matches!(err, ProviderError::InvalidId { .. }));
    assert!(session.manager.calls().is_empty());
}

#[tokio::test]
async fn test_update_description_only_sends_one_full_upsert() {
    let manager =
        FakeSecretsManager::new("us-south").with_registration("abc-123", CRN, "My Secrets Manager");
    let session = FakeSession::new(manager);
    let mut desired = config();
    desired.insert(
        "event_notifications_source_description".into(),
        json!("Secrets rotation events"),
    );
    let mut prior = config();
    prior.insert("region".into(), json!("us-south"));
    let mut d = ResourceData::from_prior(
        EnRegistrationResource.schema(),
        "us-south/abc-123",
        prior,
        desired,
    );

    EnRegistrationResource.update(&session, &mut d).await.unwrap();

    let creates = session.manager.create_calls();
    assert_eq!(creates.len(), 1);
    assert_eq!(creates[0].event_notifications_instance_crn, CRN);
    assert_eq!(creates[0].event_notifications_source_name, "My Secrets Manager");
    assert_eq!(
        creates[0].event_notifications_source_description.as_deref(),
        Some("Secrets rotation events")
    );
    assert_eq!(d.id(), "us-south/abc-123");
}

#[tokio::test]
async fn test_update_removed_description_clears_it_remotely() {
    let manager =
        FakeSecretsManager::new("us-south").with_registration("abc-123", CRN, "My Secrets Manager");
    let session = FakeSession::new(manager);
    let mut prior = config();
    prior.insert("region".into(), json!("us-south"));
    prior.insert(
        "event_notifications_source_description".into(),
        json!("Secrets rotation events"),
    );
    let mut d = ResourceData::from_prior(
        EnRegistrationResource.schema(),
        "us-south/abc-123",
        prior,
        config(),
    );

    EnRegistrationResource.update(&session, &mut d).await.unwrap();

    let creates = session.manager.create_calls();
    assert_eq!(creates.len(), 1);
    assert_eq!(
        creates[0].event_notifications_source_description.as_deref(),
        Some("")
    );
}

#[tokio::test]
async fn test_update_without_changes_makes_no_create_call() {
    let manager =
        FakeSecretsManager::new("us-south").with_registration("abc-123", CRN, "My Secrets Manager");
    let session = FakeSession::new(manager);
    let mut d = created_state(config());

    EnRegistrationResource.update(&session, &mut d).await.unwrap();

    assert!(session.manager.create_calls().is_empty());
    assert_eq!(session.manager.calls(), vec![Call::Get(scope("us-south"))]);
}

#[tokio::test]
async fn test_update_rejects_invalid_config_before_remote_call() {
    let session = FakeSession::new(FakeSecretsManager::new("us-south"));
    let mut desired = config();
    desired.insert(
        "event_notifications_source_description".into(),
        json!("d".repeat(1025)),
    );
    let mut d = ResourceData::from_prior(
        EnRegistrationResource.schema(),
        "us-south/abc-123",
        config(),
        desired,
    );

    let err = EnRegistrationResource
        .update(&session, &mut d)
        .await
        .unwrap_err();

    assert!(matches!(err, ProviderError::Validation(_)));
    assert!(session.manager.calls().is_empty());
}

#[tokio::test]
async fn test_delete_clears_id() {
    let manager =
        FakeSecretsManager::new("us-south").with_registration("abc-123", CRN, "My Secrets Manager");
    let session = FakeSession::new(manager);
    let mut d = created_state(config());

    EnRegistrationResource.delete(&session, &mut d).await.unwrap();

    assert!(!d.exists());
    assert_eq!(session.manager.calls(), vec![Call::Delete(scope("us-south"))]);
    assert!(session.manager.state().registrations.is_empty());
}

#[tokio::test]
async fn test_delete_failure_keeps_id() {
    let manager = FakeSecretsManager::new("us-south");
    manager.state().fail_delete = Some(500);
    let session = FakeSession::new(manager);
    let mut d = created_state(config());

    let err = EnRegistrationResource
        .delete(&session, &mut d)
        .await
        .unwrap_err();

    assert!(err
        .to_string()
        .starts_with("DeleteNotificationsRegistration failed"));
    assert_eq!(d.id(), "us-south/abc-123");
}

#[tokio::test]
async fn test_full_lifecycle() {
    let session = FakeSession::new(FakeSecretsManager::new("us-south"));
    let mut d = ResourceData::from_config(EnRegistrationResource.schema(), config());
    EnRegistrationResource.create(&session, &mut d).await.unwrap();
    assert!(d.exists());

    let mut renamed = config();
    renamed.insert("event_notifications_source_name".into(), json!("Renamed source"));
    let mut d = ResourceData::from_prior(
        EnRegistrationResource.schema(),
        d.id().to_string(),
        d.attributes().clone(),
        renamed,
    );
    EnRegistrationResource.update(&session, &mut d).await.unwrap();
    assert_eq!(
        session.manager.state().registrations["abc-123"].event_notifications_source_name,
        "Renamed source"
    );

    EnRegistrationResource.delete(&session, &mut d).await.unwrap();
    assert!(!d.exists());

    let mut gone = created_state(config());
    EnRegistrationResource.read(&session, &mut gone).await.unwrap();
    assert!(!gone.exists());
}

#[tokio::test]
async fn test_import_existing_registration() {
    let manager =
        FakeSecretsManager::new("us-south").with_registration("abc-123", CRN, "My Secrets Manager");
    let session = FakeSession::new(manager);

    let d = EnRegistrationResource
        .import(&session, "eu-gb/abc-123")
        .await
        .unwrap();

    assert_eq!(d.id(), "eu-gb/abc-123");
    assert_eq!(d.get_str("region"), Some("eu-gb"));
    assert_eq!(d.get_str("instance_id"), Some("abc-123"));
    assert_eq!(d.get_str("event_notifications_instance_crn"), Some(CRN));
}

#[tokio::test]
async fn test_import_missing_registration_fails() {
    let session = FakeSession::new(FakeSecretsManager::new("us-south"));

    let err = EnRegistrationResource
        .import(&session, "us-south/abc-123")
        .await
        .unwrap_err();

    assert!(matches!(err, ProviderError::NotFound { .. }));
}

#[tokio::test]
async fn test_import_rejects_malformed_id() {
    let session = FakeSession::new(FakeSecretsManager::new("us-south"));

    let err = EnRegistrationResource
        .import(&session, "us-south")
        .await
        .unwrap_err();

    assert!(matches!(err, ProviderError::InvalidId { .. }));
    assert!(session.manager.calls().is_empty());
}
