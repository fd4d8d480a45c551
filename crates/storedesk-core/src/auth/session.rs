//! Session liveness and the typed view of a stored session.

use anyhow::Result;
use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use super::error::LoginError;
use super::repository::{CredentialKey, SessionRepository};
use super::roles::Role;

/// Parse a stored token expiry. Accepts RFC 3339, a zone-less ISO timestamp
/// (taken as UTC) or integer epoch milliseconds.
pub fn parse_expiry(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    raw.parse::<i64>()
        .ok()
        .and_then(DateTime::<Utc>::from_timestamp_millis)
}

/// Liveness of a stored token. Missing or empty token, missing or
/// unparseable expiry, and an expiry at or before `now` are all invalid.
pub fn is_session_valid(token: Option<&str>, token_expiry: Option<&str>, now: DateTime<Utc>) -> bool {
    let Some(token) = token else {
        return false;
    };
    if token.is_empty() {
        return false;
    }
    token_expiry
        .and_then(parse_expiry)
        .map(|expiry| expiry > now)
        .unwrap_or(false)
}

/// Delete every session and store-context entry.
pub fn teardown(repo: &dyn SessionRepository) -> Result<()> {
    repo.clear()?;
    info!("Session torn down");
    Ok(())
}

/// A live, typed session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub role: Role,
    /// Opaque user record as returned by the backend
    pub user: Value,
}

impl Session {
    /// Create a session; the expiry must lie after `now`.
    pub fn new(
        token: String,
        expires_at: DateTime<Utc>,
        role: Role,
        user: Value,
        now: DateTime<Utc>,
    ) -> Result<Self, LoginError> {
        if token.is_empty() {
            return Err(LoginError::Rejected("empty token".to_string()));
        }
        if expires_at <= now {
            return Err(LoginError::AlreadyExpired(expires_at.to_rfc3339()));
        }
        Ok(Self {
            token,
            expires_at,
            role,
            user,
        })
    }

    /// Read the session from storage. Returns `None` unless the token is live
    /// and the stored role is recognized.
    pub fn load(repo: &dyn SessionRepository, now: DateTime<Utc>) -> Option<Self> {
        let token = repo.get(CredentialKey::Token);
        let expiry = repo.get(CredentialKey::TokenExpiry);
        if !is_session_valid(token.as_deref(), expiry.as_deref(), now) {
            return None;
        }

        let role = match repo.get(CredentialKey::UserRole)?.parse::<Role>() {
            Ok(role) => role,
            Err(e) => {
                debug!(error = %e, "Stored role not recognized");
                return None;
            }
        };
        let user = repo
            .get(CredentialKey::UserData)
            .map(|raw| serde_json::from_str(&raw).unwrap_or(Value::String(raw)))
            .unwrap_or(Value::Null);

        Some(Self {
            token: token?,
            expires_at: expiry.as_deref().and_then(parse_expiry)?,
            role,
            user,
        })
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    pub fn time_until_expiry(&self, now: DateTime<Utc>) -> Duration {
        self.expires_at - now
    }

    /// Get minutes remaining until expiry (for display)
    pub fn minutes_until_expiry(&self, now: DateTime<Utc>) -> i64 {
        self.time_until_expiry(now).num_minutes().max(0)
    }
}
