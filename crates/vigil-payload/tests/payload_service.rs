//! Payload service behavior against an in-memory endpoint set.

use std::sync::Arc;

use chrono::Utc;

use vigil_core::effects::RecordKind;
use vigil_core::{ContentId, EndpointList, SecretKey};
use vigil_crypto::{CryptoCapabilities, Effects, EnvelopeRecord};
use vigil_payload::{NoticeSummary, PayloadService, StoredPayload};
use vigil_testkit::MemoryEndpoint;

fn test_defaults() -> EndpointList {
    EndpointList::new(["mem://alpha", "mem://beta"])
}

fn service(endpoint: &Arc<MemoryEndpoint>, capabilities: CryptoCapabilities) -> PayloadService {
    PayloadService::new(endpoint.clone(), capabilities, Effects::test())
        .with_defaults(test_defaults())
}

fn payload() -> StoredPayload {
    StoredPayload {
        subject: "If you are reading this".to_string(),
        content: "The combination is 12-34-56.".to_string(),
        recipients: vec!["r1@example.com".to_string()],
        created_at: Utc::now(),
    }
}

#[tokio::test]
async fn store_then_retrieve_returns_original() {
    let endpoint = Arc::new(MemoryEndpoint::new());
    let service = service(&endpoint, CryptoCapabilities::default());
    let owner_key = SecretKey::from_bytes([5u8; 32]);

    let original = payload();
    let id = service
        .store(&EndpointList::default(), &original, &owner_key)
        .await
        .unwrap();

    let retrieved = service.retrieve(&id, &owner_key, None).await.unwrap();
    assert_eq!(retrieved, original);
}

#[tokio::test]
async fn store_publishes_to_every_default_endpoint() {
    let endpoint = Arc::new(MemoryEndpoint::new());
    let service = service(&endpoint, CryptoCapabilities::default());
    let owner_key = SecretKey::from_bytes([5u8; 32]);

    service
        .store(&EndpointList::default(), &payload(), &owner_key)
        .await
        .unwrap();

    assert_eq!(endpoint.records_at("mem://alpha").len(), 1);
    assert_eq!(endpoint.records_at("mem://beta").len(), 1);
}

#[tokio::test]
async fn owner_endpoints_override_defaults() {
    let endpoint = Arc::new(MemoryEndpoint::new());
    let service = service(&endpoint, CryptoCapabilities::default());
    let owner_key = SecretKey::from_bytes([5u8; 32]);
    let mine = EndpointList::new(["mem://mine"]);

    let id = service.store(&mine, &payload(), &owner_key).await.unwrap();

    assert_eq!(endpoint.records_at("mem://mine").len(), 1);
    assert!(endpoint.records_at("mem://alpha").is_empty());

    // Retrieval must look at the same list.
    assert!(service.retrieve(&id, &owner_key, None).await.is_none());
    let retrieved = service.retrieve(&id, &owner_key, Some(&mine)).await;
    assert!(retrieved.is_some());
}

#[tokio::test]
async fn publish_failure_propagates_from_store() {
    let endpoint = Arc::new(MemoryEndpoint::new());
    endpoint.fail_publishes();
    let service = service(&endpoint, CryptoCapabilities::default());
    let owner_key = SecretKey::from_bytes([5u8; 32]);

    let result = service
        .store(&EndpointList::default(), &payload(), &owner_key)
        .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn retrieve_with_wrong_key_yields_none() {
    let endpoint = Arc::new(MemoryEndpoint::new());
    let service = service(&endpoint, CryptoCapabilities::default());
    let owner_key = SecretKey::from_bytes([5u8; 32]);
    let wrong_key = SecretKey::from_bytes([6u8; 32]);

    let id = service
        .store(&EndpointList::default(), &payload(), &owner_key)
        .await
        .unwrap();

    assert!(service.retrieve(&id, &wrong_key, None).await.is_none());
}

#[tokio::test]
async fn retrieve_unknown_id_yields_none() {
    let endpoint = Arc::new(MemoryEndpoint::new());
    let service = service(&endpoint, CryptoCapabilities::default());
    let owner_key = SecretKey::from_bytes([5u8; 32]);

    let missing = ContentId::new("no-such-record");
    assert!(service.retrieve(&missing, &owner_key, None).await.is_none());
}

#[tokio::test]
async fn missing_gift_wrap_capability_stores_plain_signed() {
    let endpoint = Arc::new(MemoryEndpoint::new());
    let service = service(
        &endpoint,
        CryptoCapabilities {
            supports_gift_wrap: false,
        },
    );
    let owner_key = SecretKey::from_bytes([5u8; 32]);

    let original = payload();
    let id = service
        .store(&EndpointList::default(), &original, &owner_key)
        .await
        .unwrap();

    // The published record is signed but unencrypted.
    let records = endpoint.records_at("mem://alpha");
    let envelope = EnvelopeRecord::from_bytes(&records[0].body).unwrap();
    assert!(envelope.is_plain());

    // Retrieval still works through the fallback path.
    let retrieved = service.retrieve(&id, &owner_key, None).await.unwrap();
    assert_eq!(retrieved, original);
}

#[tokio::test]
async fn notify_public_publishes_one_notice_per_recipient() {
    let endpoint = Arc::new(MemoryEndpoint::new());
    let service = service(&endpoint, CryptoCapabilities::default());
    let owner_key = SecretKey::from_bytes([5u8; 32]);

    let summary = NoticeSummary {
        message: "A dead man's switch has been triggered.".to_string(),
        recipient_count: 3,
    };
    service.notify_public(&summary, &owner_key, None).await;

    // Three notices, each published to both default endpoints.
    assert_eq!(endpoint.count_kind(RecordKind::PublicNotice), 6);
}

#[tokio::test]
async fn notify_public_swallows_publish_failures() {
    let endpoint = Arc::new(MemoryEndpoint::new());
    endpoint.fail_publishes();
    let service = service(&endpoint, CryptoCapabilities::default());
    let owner_key = SecretKey::from_bytes([5u8; 32]);

    let summary = NoticeSummary {
        message: "notice".to_string(),
        recipient_count: 2,
    };
    // Must not panic or error; failures are logged only.
    service.notify_public(&summary, &owner_key, None).await;
    assert_eq!(endpoint.count_kind(RecordKind::PublicNotice), 0);
}
