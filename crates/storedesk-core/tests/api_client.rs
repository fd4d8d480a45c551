mod common;

use std::time::Duration;

use chrono::Utc;
use serde_json::Value;
use storedesk_core::api::FilePart;
use storedesk_core::auth::EntryWrite;
use storedesk_core::{ApiError, ApiRequest, CredentialKey, SessionRepository};

fn seed_credentials(repo: &dyn SessionRepository, token: &str, store_id: &str) {
    let keep = Utc::now() + chrono::Duration::hours(1);
    repo.apply(vec![
        EntryWrite::set(CredentialKey::Token, token, keep),
        EntryWrite::set(CredentialKey::TokenExpiry, keep.to_rfc3339(), keep),
        EntryWrite::set(CredentialKey::StoreId, store_id, keep),
    ])
    .unwrap();
}

#[tokio::test]
async fn test_no_credential_headers_without_session() {
    let base_url = common::spawn_backend().await;
    let (api, _repo) = common::client(&base_url, Duration::from_secs(5));

    let seen: Value = api.send_data(ApiRequest::get("/echo")).await.unwrap();
    assert_eq!(seen["authorization"], Value::Null);
    assert_eq!(seen["storeId"], Value::Null);
}

#[tokio::test]
async fn test_credential_headers_read_fresh_each_call() {
    let base_url = common::spawn_backend().await;
    let (api, repo) = common::client(&base_url, Duration::from_secs(5));

    seed_credentials(repo.as_ref(), "tok-1", "S1");
    let seen: Value = api.send_data(ApiRequest::get("/echo")).await.unwrap();
    assert_eq!(seen["authorization"], "Bearer tok-1");
    assert_eq!(seen["storeId"], "S1");

    // Switching store must show up on the very next request
    repo.remove(CredentialKey::StoreId).unwrap();
    let seen: Value = api.send_data(ApiRequest::get("/echo")).await.unwrap();
    assert_eq!(seen["authorization"], "Bearer tok-1");
    assert_eq!(seen["storeId"], Value::Null);
}

#[tokio::test]
async fn test_error_statuses_are_normalized() {
    let base_url = common::spawn_backend().await;
    let (api, _repo) = common::client(&base_url, Duration::from_secs(5));

    let err = api.send(ApiRequest::get("/status/400")).await.unwrap_err();
    assert_eq!(err, ApiError::BadRequest("stub status 400".to_string()));

    let err = api.send(ApiRequest::get("/status/401")).await.unwrap_err();
    assert_eq!(err, ApiError::Unauthorized);
    assert!(err.requires_login());

    let err = api.send(ApiRequest::get("/status/404")).await.unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));

    let err = api.send(ApiRequest::get("/status/503")).await.unwrap_err();
    assert!(matches!(err, ApiError::ServerError(_)));

    let err = api.send(ApiRequest::get("/status/409")).await.unwrap_err();
    assert!(matches!(err, ApiError::Unknown(_)));
}

#[tokio::test]
async fn test_success_false_on_ok_is_bad_request() {
    let base_url = common::spawn_backend().await;
    let (api, _repo) = common::client(&base_url, Duration::from_secs(5));

    let err = api.send(ApiRequest::get("/soft-fail")).await.unwrap_err();
    assert_eq!(err, ApiError::BadRequest("Store inactive".to_string()));
}

#[tokio::test]
async fn test_empty_body_is_null_and_html_is_unknown() {
    let base_url = common::spawn_backend().await;
    let (api, _repo) = common::client(&base_url, Duration::from_secs(5));

    let response = api.send(ApiRequest::get("/empty")).await.unwrap();
    assert_eq!(response.body, Value::Null);

    let err = api.send(ApiRequest::get("/not-json")).await.unwrap_err();
    assert!(matches!(err, ApiError::Unknown(_)));
}

#[tokio::test]
async fn test_timeout_is_network_error() {
    let base_url = common::spawn_backend().await;
    let (api, _repo) = common::client(&base_url, Duration::from_millis(200));

    let err = api.send(ApiRequest::get("/slow")).await.unwrap_err();
    assert!(matches!(err, ApiError::Network(_)), "got {:?}", err);
    assert!(err.is_transient());
}

#[tokio::test]
async fn test_refused_connection_is_network_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let (api, _repo) = common::client(&format!("http://{}", addr), Duration::from_secs(2));
    let err = api.send(ApiRequest::get("/echo")).await.unwrap_err();
    assert!(matches!(err, ApiError::Network(_)), "got {:?}", err);
}

#[tokio::test]
async fn test_login_is_sent_without_token() {
    let base_url = common::spawn_backend().await;
    let (api, repo) = common::client(&base_url, Duration::from_secs(5));
    seed_credentials(repo.as_ref(), "stale-token", "S9");

    let data = api.login("manager@store.in", "secret").await.unwrap();
    assert_eq!(data.token, "manager-token");
    assert_eq!(data.user.role, "storemanager");
    assert_eq!(data.store.map(|s| s.id), Some("S1".to_string()));
}

#[tokio::test]
async fn test_login_rejection_carries_backend_message() {
    let base_url = common::spawn_backend().await;
    let (api, _repo) = common::client(&base_url, Duration::from_secs(5));

    let err = api.login("manager@store.in", "wrong").await.unwrap_err();
    assert_eq!(err, ApiError::BadRequest("Invalid email or password".to_string()));
}

#[tokio::test]
async fn test_store_upload_without_store_surfaces_backend_error() {
    let base_url = common::spawn_backend().await;
    let (api, repo) = common::client(&base_url, Duration::from_secs(5));
    assert!(repo.get(CredentialKey::StoreId).is_none());

    let file = FilePart::csv("stock.csv", b"productId,quantity\nP1,4\n".to_vec());
    let err = api.upload_inventory_csv("S1", file).await.unwrap_err();
    assert_eq!(
        err,
        ApiError::BadRequest("X-Store-Id header is required".to_string())
    );
}

#[tokio::test]
async fn test_upload_image_sends_access_token() {
    let base_url = common::spawn_backend().await;
    let (api, _repo) = common::client(&base_url, Duration::from_secs(5));
    let api = api.with_access_token(Some(common::IMAGE_ACCESS_TOKEN.to_string()));

    let response = api
        .upload_image(FilePart::image("tomato.png", vec![0x89, b'P', b'N', b'G']))
        .await
        .unwrap();
    let data: Value = response.data().unwrap();
    assert_eq!(data["url"], "https://cdn.example.test/tomato.png");
}

#[tokio::test]
async fn test_upload_image_without_access_token_is_rejected() {
    let base_url = common::spawn_backend().await;
    let (api, _repo) = common::client(&base_url, Duration::from_secs(5));

    let err = api
        .upload_image(FilePart::image("tomato.png", vec![1]))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Unknown(_)), "got {:?}", err);
}
