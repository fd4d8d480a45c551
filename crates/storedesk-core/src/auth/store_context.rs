//! The "acting as store" slot shared by store roles and superadmins.

use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use super::error::AccessError;
use super::repository::{CredentialKey, EntryWrite, SessionRepository};
use super::session::Session;

/// The store that store-scoped API calls act on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreContext {
    pub store_id: String,
    /// Store record as returned by the backend, when known
    pub store: Option<Value>,
}

impl StoreContext {
    pub fn name(&self) -> Option<&str> {
        self.store.as_ref()?.get("name")?.as_str()
    }
}

/// Single slot holding the active [`StoreContext`].
///
/// Entering a store replaces the previous one outright; the slot never holds
/// two stores or a mix of two snapshots.
#[derive(Clone)]
pub struct StoreContextBinder {
    repo: Arc<dyn SessionRepository>,
}

impl StoreContextBinder {
    pub fn new(repo: Arc<dyn SessionRepository>) -> Self {
        Self { repo }
    }

    /// Bind subsequent store-scoped calls to `store_id`. The entries expire
    /// together with the current session.
    pub fn enter_store_context(
        &self,
        store_id: &str,
        store: Option<Value>,
    ) -> Result<(), EnterStoreError> {
        let session =
            Session::load(self.repo.as_ref(), Utc::now()).ok_or(AccessError::SessionExpired)?;

        let mut writes = vec![EntryWrite::set(
            CredentialKey::StoreId,
            store_id,
            session.expires_at,
        )];
        match store {
            Some(snapshot) => writes.push(EntryWrite::set(
                CredentialKey::StoreData,
                snapshot.to_string(),
                session.expires_at,
            )),
            None => writes.push(EntryWrite::Remove(CredentialKey::StoreData)),
        }

        self.repo.apply(writes)?;
        info!(store_id = store_id, "Entered store context");
        Ok(())
    }

    pub fn current_store_context(&self) -> Option<StoreContext> {
        let store_id = self.repo.get(CredentialKey::StoreId)?;
        let store = self.repo.get(CredentialKey::StoreData).and_then(|raw| {
            serde_json::from_str(&raw)
                .map_err(|e| debug!(error = %e, "Stored store snapshot is not JSON"))
                .ok()
        });
        Some(StoreContext { store_id, store })
    }

    /// Like [`current_store_context`](Self::current_store_context) for callers
    /// that cannot proceed without a store.
    pub fn require_store_context(&self) -> Result<StoreContext, AccessError> {
        self.current_store_context()
            .ok_or(AccessError::NoStoreSelected)
    }

    pub fn exit_store_context(&self) -> Result<()> {
        self.repo.apply(vec![
            EntryWrite::Remove(CredentialKey::StoreId),
            EntryWrite::Remove(CredentialKey::StoreData),
        ])?;
        info!("Left store context");
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EnterStoreError {
    #[error(transparent)]
    Access(#[from] AccessError),

    #[error("Failed to store context: {0}")]
    Storage(#[from] anyhow::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::repository::MemorySessionRepository;
    use chrono::Duration;
    use serde_json::json;

    fn logged_in_repo() -> Arc<MemorySessionRepository> {
        let repo = Arc::new(MemorySessionRepository::new());
        let expiry = Utc::now() + Duration::hours(1);
        repo.apply(vec![
            EntryWrite::set(CredentialKey::Token, "t1", expiry),
            EntryWrite::set(CredentialKey::TokenExpiry, expiry.to_rfc3339(), expiry),
            EntryWrite::set(CredentialKey::UserRole, "superadmin", expiry),
        ])
        .unwrap();
        repo
    }

    #[test]
    fn test_last_store_wins() {
        let binder = StoreContextBinder::new(logged_in_repo());

        binder
            .enter_store_context("A", Some(json!({"name": "Koregaon Park"})))
            .unwrap();
        binder.enter_store_context("B", None).unwrap();

        let context = binder.current_store_context().unwrap();
        assert_eq!(context.store_id, "B");
        // A's snapshot must not leak into B
        assert_eq!(context.store, None);
    }

    #[test]
    fn test_absent_context_is_distinct_error() {
        let binder = StoreContextBinder::new(logged_in_repo());
        assert_eq!(binder.current_store_context(), None);
        assert_eq!(
            binder.require_store_context(),
            Err(AccessError::NoStoreSelected)
        );
    }

    #[test]
    fn test_exit_clears_slot() {
        let binder = StoreContextBinder::new(logged_in_repo());
        binder
            .enter_store_context("A", Some(json!({"name": "Baner"})))
            .unwrap();
        assert_eq!(binder.current_store_context().unwrap().name(), Some("Baner"));

        binder.exit_store_context().unwrap();
        assert_eq!(binder.current_store_context(), None);
    }

    #[test]
    fn test_enter_requires_live_session() {
        let binder = StoreContextBinder::new(Arc::new(MemorySessionRepository::new()));
        let result = binder.enter_store_context("A", None);
        assert!(matches!(
            result,
            Err(EnterStoreError::Access(AccessError::SessionExpired))
        ));
    }
}
