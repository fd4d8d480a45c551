use serde_json::Value;
use thiserror::Error;

/// Normalized failure of a backend call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("Unauthorized - token may be expired")]
    Unauthorized,

    #[error("{0}")]
    BadRequest(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Unexpected response: {0}")]
    Unknown(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            return body.to_string();
        }
        let mut end = MAX_ERROR_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
    }

    /// The backend's `message` field, if the body is a JSON object with one.
    pub fn server_message(body: &str) -> Option<String> {
        let parsed: Value = serde_json::from_str(body).ok()?;
        parsed
            .get("message")
            .and_then(Value::as_str)
            .filter(|m| !m.trim().is_empty())
            .map(str::to_string)
    }

    fn describe(body: &str, fallback: &str) -> String {
        Self::server_message(body).unwrap_or_else(|| {
            if body.trim().is_empty() {
                fallback.to_string()
            } else {
                Self::truncate_body(body)
            }
        })
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        match status.as_u16() {
            401 => ApiError::Unauthorized,
            400 => ApiError::BadRequest(Self::describe(body, "Invalid request")),
            404 => ApiError::NotFound(Self::describe(body, "Not found")),
            500..=599 => ApiError::ServerError(Self::describe(body, status.as_str())),
            _ => ApiError::Unknown(format!("Status {}: {}", status, Self::truncate_body(body))),
        }
    }

    /// Whether the remedy is a fresh login.
    pub fn requires_login(&self) -> bool {
        matches!(self, ApiError::Unauthorized)
    }

    /// Failures worth telling the user to try again later.
    pub fn is_transient(&self) -> bool {
        matches!(self, ApiError::Network(_) | ApiError::ServerError(_))
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() || err.is_connect() || err.is_request() {
            ApiError::Network(err.to_string())
        } else if let Some(status) = err.status() {
            ApiError::from_status(status, "")
        } else {
            ApiError::Unknown(err.to_string())
        }
    }
}
