//! API client for the grocery platform's REST backend.
//!
//! Every call reads the token and the active store afresh from the session
//! repository, attaches them as headers, and normalizes the outcome into
//! [`ApiResponse`] or [`ApiError`].

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{header, multipart, Client, Method, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::auth::{CredentialKey, LoginData, SessionRepository};
use crate::config::Config;

use super::envelope::Envelope;
use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// Default per-call timeout in seconds. A call that has not completed by
/// then fails as a network error.
pub const REQUEST_TIMEOUT_SECS: u64 = 15;

/// Header naming the store a call acts on.
pub const STORE_HEADER: &str = "X-Store-Id";

/// Characters of the token shown in logs
const TOKEN_LOG_PREFIX: usize = 10;

// ============================================================================
// Requests
// ============================================================================

/// A file sent as one part of a multipart upload.
#[derive(Debug, Clone)]
pub struct FilePart {
    pub field: String,
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl FilePart {
    pub fn csv(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            field: "file".to_string(),
            file_name: file_name.into(),
            mime: "text/csv".to_string(),
            bytes,
        }
    }

    /// An `image` part typed from the file extension.
    pub fn image(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let extension = file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        let mime = match extension.as_str() {
            "png" => "image/png",
            "jpg" | "jpeg" => "image/jpeg",
            "webp" => "image/webp",
            "gif" => "image/gif",
            "svg" => "image/svg+xml",
            _ => "application/octet-stream",
        };
        Self {
            field: "image".to_string(),
            file_name,
            mime: mime.to_string(),
            bytes,
        }
    }
}

#[derive(Debug, Clone)]
enum RequestBody {
    Empty,
    Json(Value),
    Multipart(Vec<FilePart>),
    /// Body that failed to serialize; reported when the request is sent
    Unserializable(String),
}

/// Description of a single backend call.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    body: RequestBody,
    headers: Vec<(String, String)>,
    anonymous: bool,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: RequestBody::Empty,
            headers: Vec::new(),
            anonymous: false,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Self {
        self.body = match serde_json::to_value(body) {
            Ok(value) => RequestBody::Json(value),
            Err(e) => RequestBody::Unserializable(e.to_string()),
        };
        self
    }

    pub fn file(mut self, part: FilePart) -> Self {
        match self.body {
            RequestBody::Multipart(ref mut parts) => parts.push(part),
            _ => self.body = RequestBody::Multipart(vec![part]),
        }
        self
    }

    /// Extra header sent alongside the credential headers.
    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((name.to_string(), value.into()));
        self
    }

    /// Send without credential headers.
    pub fn anonymous(mut self) -> Self {
        self.anonymous = true;
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

/// A successful (2xx, not `success: false`) backend response.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    /// Decoded JSON body; `Null` when the body was empty
    pub body: Value,
}

impl ApiResponse {
    pub fn message(&self) -> Option<&str> {
        self.body.get("message").and_then(Value::as_str)
    }

    /// Decode the envelope's `data` member.
    pub fn data<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        let envelope: Envelope<T> = serde_json::from_value(self.body.clone())
            .map_err(|e| ApiError::Unknown(format!("Failed to parse response data: {}", e)))?;
        envelope
            .data
            .ok_or_else(|| ApiError::Unknown("Response carried no data".to_string()))
    }

    /// Decode a top-level member outside the envelope's `data`. Some
    /// endpoints list their records as `{success, coupons: [...]}`.
    pub fn field<T: DeserializeOwned>(&self, name: &str) -> Result<T, ApiError> {
        let value = self
            .body
            .get(name)
            .cloned()
            .ok_or_else(|| ApiError::Unknown(format!("Response has no `{}` field", name)))?;
        serde_json::from_value(value)
            .map_err(|e| ApiError::Unknown(format!("Failed to parse `{}`: {}", name, e)))
    }
}

// ============================================================================
// Client
// ============================================================================

/// API client for the platform backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    repo: Arc<dyn SessionRepository>,
    /// Key for the image upload service
    access_token: Option<String>,
}

impl ApiClient {
    /// Create a client for `base_url` reading credentials from `repo`.
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        repo: Arc<dyn SessionRepository>,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            repo,
            access_token: None,
        })
    }

    pub fn from_config(config: &Config, repo: Arc<dyn SessionRepository>) -> Result<Self> {
        let client = Self::new(config.api_base_url()?, config.request_timeout(), repo)?;
        Ok(client.with_access_token(config.access_token.clone()))
    }

    pub fn with_access_token(mut self, access_token: Option<String>) -> Self {
        self.access_token = access_token.filter(|t| !t.trim().is_empty());
        self
    }

    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn repository(&self) -> &Arc<dyn SessionRepository> {
        &self.repo
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// Authorization and store headers from whatever is stored right now.
    /// Absent entries are simply not sent.
    fn credential_headers(&self) -> header::HeaderMap {
        let mut headers = header::HeaderMap::new();

        match self.repo.get(CredentialKey::Token) {
            Some(token) => match header::HeaderValue::from_str(&format!("Bearer {}", token)) {
                Ok(value) => {
                    debug!(
                        token = %token.chars().take(TOKEN_LOG_PREFIX).collect::<String>(),
                        "Attaching bearer token"
                    );
                    headers.insert(header::AUTHORIZATION, value);
                }
                Err(_) => warn!("Stored token is not a valid header value, sending without it"),
            },
            None => debug!("No token stored"),
        }

        if let Some(store_id) = self.repo.get(CredentialKey::StoreId) {
            match header::HeaderValue::from_str(&store_id) {
                Ok(value) => {
                    headers.insert(STORE_HEADER, value);
                }
                Err(_) => warn!(store_id = %store_id, "Store id is not a valid header value"),
            }
        }

        headers
    }

    fn multipart_form(parts: Vec<FilePart>) -> Result<multipart::Form, ApiError> {
        let mut form = multipart::Form::new();
        for part in parts {
            let body = multipart::Part::bytes(part.bytes)
                .file_name(part.file_name)
                .mime_str(&part.mime)
                .map_err(|e| ApiError::Unknown(format!("Invalid upload type: {}", e)))?;
            form = form.part(part.field, body);
        }
        Ok(form)
    }

    /// Dispatch a request. No retries; a call that exceeds the timeout or
    /// gets no response fails with [`ApiError::Network`].
    pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let url = self.url(&request.path);
        let mut builder = self.client.request(request.method.clone(), &url);

        if !request.anonymous {
            builder = builder.headers(self.credential_headers());
        }
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(&value),
            RequestBody::Multipart(parts) => builder.multipart(Self::multipart_form(parts)?),
            RequestBody::Unserializable(e) => {
                return Err(ApiError::Unknown(format!("Failed to encode request body: {}", e)))
            }
        };

        debug!(method = %request.method, path = %request.path, "Sending request");

        let response = builder.send().await.map_err(|e| {
            warn!(method = %request.method, path = %request.path, error = %e, "Request failed");
            ApiError::from(e)
        })?;

        let status = response.status();
        let text = response.text().await.map_err(ApiError::from)?;

        if !status.is_success() {
            let err = ApiError::from_status(status, &text);
            warn!(
                method = %request.method,
                path = %request.path,
                status = status.as_u16(),
                error = %err,
                "Backend returned an error"
            );
            return Err(err);
        }

        let body: Value = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).map_err(|e| {
                ApiError::Unknown(format!("Failed to parse JSON response from {}: {}", request.path, e))
            })?
        };

        if body.get("success").and_then(Value::as_bool) == Some(false) {
            let message = body
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("Request failed")
                .to_string();
            debug!(path = %request.path, message = %message, "Backend reported failure");
            return Err(ApiError::BadRequest(message));
        }

        debug!(path = %request.path, status = status.as_u16(), "Request succeeded");
        Ok(ApiResponse { status, body })
    }

    /// Dispatch a request and decode the envelope's `data` member.
    pub async fn send_data<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, ApiError> {
        self.send(request).await?.data()
    }

    /// Exchange email and password for a session payload. Sent without
    /// credential headers.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginData, ApiError> {
        let request = ApiRequest::post("/admin/login")
            .json(&json!({ "email": email, "password": password }))
            .anonymous();
        let response = self.send(request).await?;

        match response.data::<LoginData>() {
            Ok(data) if !data.token.is_empty() => Ok(data),
            _ => Err(ApiError::BadRequest(
                response.message().unwrap_or("Login failed").to_string(),
            )),
        }
    }
}
