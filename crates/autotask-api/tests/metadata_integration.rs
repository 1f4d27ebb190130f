//! Integration tests for the metadata cache.
//!
//! These tests use wiremock to mock the entity information endpoints.

use autotask_api_rs::client::AutotaskClient;
use autotask_api_rs::error::Error;
use autotask_api_rs::metadata::MetadataCache;
use autotask_api_rs::resources;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(server: &MockServer) -> AutotaskClient {
    AutotaskClient::new(server.uri(), "INTCODE", "apiuser@example.com", "hunter2").unwrap()
}

/// Test: metadata is fetched once per resource and memoized
#[tokio::test]
async fn test_metadata_is_memoized() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/Tickets/entityInformation/fields"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "fields": [
                {"name": "status", "isPickList": true, "picklistValues": [
                    {"value": 1, "label": "Open"}
                ]}
            ]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/Tickets/entityInformation/userDefinedFields"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "fields": [{"name": "CustomRef"}]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let cache = MetadataCache::new();
    let descriptor = resources::lookup("Tickets").unwrap();

    let first = cache.resource_metadata(&client, descriptor).await.unwrap();
    let second = cache.resource_metadata(&client, descriptor).await.unwrap();

    assert!(first.picklists.fields.contains("status"));
    assert!(second.is_udf("customref"));
    assert_eq!(cache.len(), 1);
}

/// Test: a failed fetch caches nothing, so the next call retries
#[tokio::test]
async fn test_failed_fetch_is_not_cached() {
    let mock_server = MockServer::start().await;

    // First attempt fails, the retry succeeds.
    Mock::given(method("GET"))
        .and(path("/Tickets/entityInformation/fields"))
        .respond_with(ResponseTemplate::new(500).set_body_string("transient"))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/Tickets/entityInformation/fields"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"fields": []})))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/Tickets/entityInformation/userDefinedFields"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"fields": []})))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let cache = MetadataCache::new();
    let descriptor = resources::lookup("Tickets").unwrap();

    assert!(cache.resource_metadata(&client, descriptor).await.is_err());
    assert!(cache.is_empty());

    assert!(cache.resource_metadata(&client, descriptor).await.is_ok());
    assert_eq!(cache.len(), 1);
}

/// Test: child collections skip the user-defined-fields endpoint
#[tokio::test]
async fn test_child_resource_skips_udf_fetch() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/Tickets/entityInformation/fields"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"fields": []})))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/Tickets/entityInformation/userDefinedFields"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"fields": []})))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let cache = MetadataCache::new();
    let descriptor = resources::lookup("TicketNotes").unwrap();

    let metadata = cache.resource_metadata(&client, descriptor).await.unwrap();
    assert!(metadata.udf_names.is_empty());
}

/// Test: reset drops every entry, forcing a refetch
#[tokio::test]
async fn test_reset_forces_refetch() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/Companies/entityInformation/fields"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"fields": []})))
        .expect(2)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/Companies/entityInformation/userDefinedFields"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"fields": []})))
        .expect(2)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let cache = MetadataCache::new();
    let descriptor = resources::lookup("Companies").unwrap();

    cache.resource_metadata(&client, descriptor).await.unwrap();
    cache.reset();
    assert!(cache.is_empty());
    cache.resource_metadata(&client, descriptor).await.unwrap();
    assert_eq!(cache.len(), 1);
}

/// Test: metadata lookups fail fast without a session
#[tokio::test]
async fn test_metadata_requires_session() {
    let mock_server = MockServer::start().await;
    let client = AutotaskClient::new(mock_server.uri(), "INTCODE", "", "hunter2").unwrap();
    let cache = MetadataCache::new();
    let descriptor = resources::lookup("Tickets").unwrap();

    let err = cache.resource_metadata(&client, descriptor).await.unwrap_err();
    assert!(matches!(err, Error::NotAuthenticated));
    assert!(cache.is_empty());
}
