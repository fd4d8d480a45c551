//! Turning a successful login response into stored session state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{info, warn};

use super::error::LoginError;
use super::repository::{CredentialKey, EntryWrite, SessionRepository};
use super::roles::{resolve_landing, Role};
use super::session::{parse_expiry, Session};
use super::store_context::StoreContext;

/// `data` member of the login endpoint's envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginData {
    pub token: String,
    /// ISO timestamp or epoch milliseconds
    pub token_valid_till: Value,
    pub user: LoginUser,
    #[serde(default)]
    pub store: Option<LoginStore>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginUser {
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_id: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginStore {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Stored result of a login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub session: Session,
    pub store: Option<StoreContext>,
    pub landing: &'static str,
}

fn expiry_text(raw: &Value) -> Option<String> {
    match raw {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Persist a login response, replacing whatever was stored before.
///
/// Store managers and store admins get their store context from the
/// response's store record, or from the user's `storeId` when no record is
/// sent. Superadmins start without a store context.
pub fn persist_login(
    repo: &dyn SessionRepository,
    data: LoginData,
    now: DateTime<Utc>,
) -> Result<LoginOutcome, LoginError> {
    let role: Role = data.user.role.parse()?;
    let raw_expiry = expiry_text(&data.token_valid_till)
        .ok_or_else(|| LoginError::InvalidExpiry(data.token_valid_till.to_string()))?;
    let expires_at =
        parse_expiry(&raw_expiry).ok_or_else(|| LoginError::InvalidExpiry(raw_expiry.clone()))?;

    let user_json = serde_json::to_value(&data.user).unwrap_or(Value::Null);
    let session = Session::new(data.token, expires_at, role, user_json, now)?;

    let store = if role.is_store_role() {
        match (data.store, data.user.store_id) {
            (Some(record), _) => Some(StoreContext {
                store_id: record.id.clone(),
                store: serde_json::to_value(&record).ok(),
            }),
            (None, Some(store_id)) => Some(StoreContext {
                store_id,
                store: None,
            }),
            (None, None) => {
                warn!(role = %role, "Store role logged in without a store");
                None
            }
        }
    } else {
        None
    };

    let mut writes: Vec<EntryWrite> = CredentialKey::ALL
        .iter()
        .copied()
        .map(EntryWrite::Remove)
        .collect();
    writes.extend([
        EntryWrite::set(CredentialKey::Token, session.token.clone(), expires_at),
        EntryWrite::set(CredentialKey::TokenExpiry, expires_at.to_rfc3339(), expires_at),
        EntryWrite::set(CredentialKey::UserRole, role.as_str(), expires_at),
        EntryWrite::set(CredentialKey::UserData, session.user.to_string(), expires_at),
    ]);
    if let Some(ref context) = store {
        writes.push(EntryWrite::set(
            CredentialKey::StoreId,
            context.store_id.clone(),
            expires_at,
        ));
        if let Some(ref snapshot) = context.store {
            writes.push(EntryWrite::set(
                CredentialKey::StoreData,
                snapshot.to_string(),
                expires_at,
            ));
        }
    }
    repo.apply(writes)?;

    let landing = resolve_landing(Some(role));
    info!(
        role = %role,
        store_id = store.as_ref().map(|s| s.store_id.as_str()),
        expires_at = %expires_at,
        "Session stored"
    );

    Ok(LoginOutcome {
        session,
        store,
        landing,
    })
}
