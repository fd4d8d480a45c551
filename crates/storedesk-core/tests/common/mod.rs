//! Stub platform backend for integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Bytes,
    extract::{Path, Query},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use storedesk_core::auth::MemorySessionRepository;
use storedesk_core::{ApiClient, Console, SessionRepository};
use tokio::net::TcpListener;

/// Key the image service accepts
pub const IMAGE_ACCESS_TOKEN: &str = "cloud-key";

/// How long `/slow` stalls before answering
pub const SLOW_RESPONSE: Duration = Duration::from_secs(5);

fn header(headers: &HeaderMap, name: &str) -> Value {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|v| Value::String(v.to_string()))
        .unwrap_or(Value::Null)
}

#[derive(Deserialize)]
struct Credentials {
    email: String,
    password: String,
}

async fn login(headers: HeaderMap, Json(creds): Json<Credentials>) -> impl IntoResponse {
    if headers.contains_key("authorization") {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"success": false, "message": "login must not carry a token"})),
        );
    }
    if creds.password != "secret" {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"success": false, "message": "Invalid email or password"})),
        );
    }

    let valid_till = (Utc::now() + chrono::Duration::hours(1)).to_rfc3339();
    let data = match creds.email.as_str() {
        "admin@store.in" => json!({
            "token": "admin-token",
            "tokenValidTill": valid_till,
            "user": {"role": "superadmin", "name": "Asha"},
        }),
        "manager@store.in" => json!({
            "token": "manager-token",
            "tokenValidTill": valid_till,
            "user": {"role": "storemanager", "name": "Ravi", "storeId": "S1"},
            "store": {"_id": "S1", "name": "Deccan"},
        }),
        "cashier@store.in" => json!({
            "token": "cashier-token",
            "tokenValidTill": valid_till,
            "user": {"role": "cashier"},
        }),
        _ => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({"success": false, "message": "User not found"})),
            )
        }
    };
    (
        StatusCode::OK,
        Json(json!({"success": true, "message": "Login successful", "data": data})),
    )
}

/// Reflects the credential headers it received.
async fn echo(headers: HeaderMap) -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "authorization": header(&headers, "authorization"),
            "storeId": header(&headers, "x-store-id"),
        }
    }))
}

async fn status(Path(code): Path<u16>) -> impl IntoResponse {
    let status = StatusCode::from_u16(code).unwrap_or(StatusCode::IM_A_TEAPOT);
    (
        status,
        Json(json!({"success": false, "message": format!("stub status {}", code)})),
    )
}

#[derive(Deserialize)]
struct InventoryQuery {
    #[serde(rename = "storeId")]
    store_id: String,
    page: u32,
    skip: u64,
}

async fn inventory(headers: HeaderMap, Query(query): Query<InventoryQuery>) -> impl IntoResponse {
    if header(&headers, "x-store-id") != Value::String(query.store_id.clone()) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"success": false, "message": "store header mismatch"})),
        );
    }
    (
        StatusCode::OK,
        Json(json!({
            "success": true,
            "data": {
                "products": [
                    {"productId": "P1", "name": "Tomato",
                     "inventory": {"quantity": 3, "threshold": 5}},
                ],
                "pagination": {"currentPage": query.page, "totalPages": 1,
                               "totalProducts": 1, "skip": query.skip},
            }
        })),
    )
}

async fn upload_image(headers: HeaderMap, body: Bytes) -> impl IntoResponse {
    if header(&headers, "access_token") != Value::String(IMAGE_ACCESS_TOKEN.to_string()) {
        return (
            StatusCode::FORBIDDEN,
            Json(json!({"success": false, "message": "invalid access token"})),
        );
    }
    let multipart = header(&headers, "content-type")
        .as_str()
        .is_some_and(|ct| ct.starts_with("multipart/form-data"));
    let body = String::from_utf8_lossy(&body);
    if !multipart || !body.contains("name=\"image\"") {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"success": false, "message": "image part missing"})),
        );
    }
    (
        StatusCode::OK,
        Json(json!({"success": true, "data": {"url": "https://cdn.example.test/tomato.png"}})),
    )
}

/// Bulk stock upload; the backend insists on the store header.
async fn upload_inventory(headers: HeaderMap) -> impl IntoResponse {
    if header(&headers, "x-store-id").is_null() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"success": false, "message": "X-Store-Id header is required"})),
        );
    }
    (
        StatusCode::OK,
        Json(json!({"success": true, "message": "Inventory uploaded"})),
    )
}

pub fn router() -> Router {
    Router::new()
        .route("/admin/login", post(login))
        .route("/echo", get(echo))
        .route("/status/{code}", get(status))
        .route(
            "/slow",
            get(|| async {
                tokio::time::sleep(SLOW_RESPONSE).await;
                Json(json!({"success": true}))
            }),
        )
        .route(
            "/soft-fail",
            get(|| async { Json(json!({"success": false, "message": "Store inactive"})) }),
        )
        .route("/empty", get(|| async { StatusCode::NO_CONTENT }))
        .route("/not-json", get(|| async { "<html>oops</html>" }))
        .route("/inventory/", get(inventory))
        .route("/inventory/upload", post(upload_inventory))
        .route("/cloud/upload-image", post(upload_image))
        .route(
            "/category/",
            get(|| async {
                Json(json!({
                    "success": true,
                    "categories": [{"_id": "C1", "name": "Vegetables"}],
                }))
            }),
        )
        .route(
            "/admin/stores",
            get(|| async {
                (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({"success": false, "message": "jwt expired"})),
                )
            }),
        )
}

/// Start the stub backend and return its base URL.
pub async fn spawn_backend() -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind stub backend");
    let addr = listener.local_addr().expect("Stub backend has no address");
    tokio::spawn(async move {
        axum::serve(listener, router()).await.ok();
    });
    format!("http://{}", addr)
}

pub fn client(base_url: &str, timeout: Duration) -> (ApiClient, Arc<MemorySessionRepository>) {
    let repo = Arc::new(MemorySessionRepository::new());
    let shared: Arc<dyn SessionRepository> = repo.clone();
    let api = ApiClient::new(base_url, timeout, shared).expect("Failed to build client");
    (api, repo)
}

pub async fn console() -> (Console, Arc<MemorySessionRepository>) {
    let base_url = spawn_backend().await;
    let (api, repo) = client(&base_url, Duration::from_secs(5));
    (Console::new(api), repo)
}
