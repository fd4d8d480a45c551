//! Console orchestration: login, store context and guarded backend calls.
//!
//! [`Console`] owns the session repository, the store-context binder and the
//! API client, and applies the error remedies at the call site:
//!
//! - a session found dead locally fails with `SessionExpired` before any
//!   network traffic, and is torn down
//! - a backend `401` tears the whole session down
//! - everything else is handed back untouched for the caller to report
//!
//! [`ConsoleError::redirect`] names where a UI should navigate afterwards.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use crate::api::{ApiClient, ApiError, ApiRequest, ApiResponse, FilePart};
use crate::auth::{
    persist_login, resolve_authorization, teardown, AccessError, Area, EnterStoreError,
    LoginError, LoginOutcome, Role, Session, SessionRepository, StoreContext,
    StoreContextBinder, PUBLIC_ROOT,
};
use crate::models::{
    AnalysisRange, Cashback, Category, Coupon, CouponUpdate, InventoryPage, InventoryUpdate,
    NewAdmin, NewCashback, NewCoupon, NewProduct, NewStore, NewUser, Notification, PageRequest,
    ProductPage, StorePage, StoreUpdate, UserPage, UserUpdate, ValidationError,
};

#[derive(Error, Debug)]
pub enum ConsoleError {
    #[error(transparent)]
    Access(#[from] AccessError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Login(#[from] LoginError),

    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),

    #[error("Storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

impl From<EnterStoreError> for ConsoleError {
    fn from(err: EnterStoreError) -> Self {
        match err {
            EnterStoreError::Access(e) => ConsoleError::Access(e),
            EnterStoreError::Storage(e) => ConsoleError::Storage(e),
        }
    }
}

impl ConsoleError {
    /// Navigation target after this error; `None` means show a message and
    /// stay put.
    pub fn redirect(&self) -> Option<&'static str> {
        match self {
            ConsoleError::Access(e) => e.redirect(),
            ConsoleError::Api(e) if e.requires_login() => Some(PUBLIC_ROOT),
            _ => None,
        }
    }
}

/// Store dashboard landing data.
#[derive(Debug, Clone)]
pub struct Overview {
    pub store: StoreContext,
    pub categories: Vec<Category>,
    pub inventory: InventoryPage,
}

pub struct Console {
    repo: Arc<dyn SessionRepository>,
    binder: StoreContextBinder,
    api: ApiClient,
}

impl Console {
    /// Build a console around `api`, sharing its session repository.
    pub fn new(api: ApiClient) -> Self {
        let repo = api.repository().clone();
        Self {
            binder: StoreContextBinder::new(repo.clone()),
            repo,
            api,
        }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn binder(&self) -> &StoreContextBinder {
        &self.binder
    }

    // ===== Session =====

    /// Authenticate and store the session, replacing any previous one.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, ConsoleError> {
        let data = self.api.login(email, password).await?;
        let outcome = persist_login(self.repo.as_ref(), data, Utc::now())?;
        Ok(outcome)
    }

    pub fn logout(&self) -> Result<(), ConsoleError> {
        teardown(self.repo.as_ref())?;
        Ok(())
    }

    /// The live session, if there is one.
    pub fn session(&self) -> Option<Session> {
        Session::load(self.repo.as_ref(), Utc::now())
    }

    /// The live session; a dead one is torn down.
    fn require_session(&self) -> Result<Session, ConsoleError> {
        match self.session() {
            Some(session) => Ok(session),
            None => {
                info!("No live session");
                self.discard_session();
                Err(AccessError::SessionExpired.into())
            }
        }
    }

    fn require_area(&self, area: Area) -> Result<Session, ConsoleError> {
        let session = self.require_session()?;
        if !resolve_authorization(Some(session.role), area).is_allowed() {
            return Err(AccessError::RoleDenied {
                role: session.role,
                area,
            }
            .into());
        }
        Ok(session)
    }

    fn discard_session(&self) {
        if let Err(e) = teardown(self.repo.as_ref()) {
            warn!(error = %e, "Failed to tear down session");
        }
    }

    // ===== Store context =====

    /// Act on behalf of `store_id`. Only superadmins choose a store; store
    /// roles are bound to theirs at login.
    pub fn act_as_store(
        &self,
        store_id: &str,
        snapshot: Option<Value>,
    ) -> Result<StoreContext, ConsoleError> {
        self.require_area(Area::Admin)?;
        self.binder.enter_store_context(store_id, snapshot.clone())?;
        Ok(StoreContext {
            store_id: store_id.to_string(),
            store: snapshot,
        })
    }

    pub fn leave_store(&self) -> Result<(), ConsoleError> {
        self.require_area(Area::Admin)?;
        self.binder.exit_store_context()?;
        Ok(())
    }

    /// The active store; absent is `NoStoreSelected`.
    pub fn require_store(&self) -> Result<StoreContext, ConsoleError> {
        Ok(self.binder.require_store_context()?)
    }

    fn require_live_store(&self) -> Result<StoreContext, ConsoleError> {
        self.require_area(Area::Store)?;
        self.require_store()
    }

    // ===== Calls =====

    /// Apply the remedy for a finished call: a `401` ends the session.
    fn settle<T>(&self, result: Result<T, ApiError>) -> Result<T, ConsoleError> {
        match result {
            Ok(value) => Ok(value),
            Err(ApiError::Unauthorized) => {
                warn!("Backend rejected the session");
                self.discard_session();
                Err(ApiError::Unauthorized.into())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Send an arbitrary request with the session checked first.
    pub async fn call(&self, request: ApiRequest) -> Result<ApiResponse, ConsoleError> {
        self.require_session()?;
        self.settle(self.api.send(request).await)
    }

    /// Categories and the first inventory page of the active store, fetched
    /// concurrently.
    pub async fn overview(&self, page: PageRequest) -> Result<Overview, ConsoleError> {
        let store = self.require_live_store()?;
        let result = futures::try_join!(
            self.api.list_categories(),
            self.api.list_inventory(&store.store_id, page)
        );
        let (categories, inventory) = self.settle(result)?;
        Ok(Overview {
            store,
            categories,
            inventory,
        })
    }

    // ===== Store area =====

    pub async fn inventory(&self, page: PageRequest) -> Result<InventoryPage, ConsoleError> {
        let store = self.require_live_store()?;
        self.settle(self.api.list_inventory(&store.store_id, page).await)
    }

    /// Update one product's stock in the active store.
    pub async fn update_inventory(
        &self,
        product_id: &str,
        quantity: Option<f64>,
        availability: Option<bool>,
        threshold: Option<f64>,
    ) -> Result<ApiResponse, ConsoleError> {
        let store = self.require_live_store()?;
        let update = InventoryUpdate {
            store_id: store.store_id,
            product_id: product_id.to_string(),
            quantity,
            availability,
            threshold,
        };
        update.validate()?;
        self.settle(self.api.update_inventory(&update).await)
    }

    pub async fn upload_inventory(&self, file: FilePart) -> Result<ApiResponse, ConsoleError> {
        let store = self.require_live_store()?;
        self.settle(self.api.upload_inventory_csv(&store.store_id, file).await)
    }

    pub async fn store_report(&self, date: NaiveDate) -> Result<Value, ConsoleError> {
        let store = self.require_live_store()?;
        self.settle(self.api.store_report(&store.store_id, date).await)
    }

    pub async fn upload_purchase_report(
        &self,
        date: NaiveDate,
        file: FilePart,
    ) -> Result<ApiResponse, ConsoleError> {
        let store = self.require_live_store()?;
        self.settle(
            self.api
                .upload_purchase_report(&store.store_id, date, file)
                .await,
        )
    }

    // ===== Admin area =====

    pub async fn stores(&self, page: PageRequest) -> Result<StorePage, ConsoleError> {
        self.require_area(Area::Admin)?;
        self.settle(self.api.list_stores(page).await)
    }

    pub async fn create_store(&self, store: &NewStore) -> Result<ApiResponse, ConsoleError> {
        store.validate()?;
        self.require_area(Area::Admin)?;
        self.settle(self.api.create_store(store).await)
    }

    pub async fn update_store(
        &self,
        store_id: &str,
        update: &StoreUpdate,
    ) -> Result<ApiResponse, ConsoleError> {
        update.validate()?;
        self.require_area(Area::Admin)?;
        self.settle(self.api.update_store(store_id, update).await)
    }

    pub async fn create_admin(&self, admin: &NewAdmin) -> Result<ApiResponse, ConsoleError> {
        admin.validate()?;
        self.require_area(Area::Admin)?;
        self.settle(self.api.create_admin(admin).await)
    }

    pub async fn assign_store_manager(
        &self,
        admin_id: &str,
        store_id: &str,
    ) -> Result<ApiResponse, ConsoleError> {
        if admin_id.trim().is_empty() {
            return Err(ValidationError::Required("adminId").into());
        }
        if store_id.trim().is_empty() {
            return Err(ValidationError::Required("storeId").into());
        }
        self.require_area(Area::Admin)?;
        self.settle(self.api.assign_store_manager(admin_id, store_id).await)
    }

    pub async fn users(
        &self,
        role: Option<&str>,
        page: PageRequest,
    ) -> Result<UserPage, ConsoleError> {
        self.require_area(Area::Admin)?;
        self.settle(self.api.list_users(role, page).await)
    }

    pub async fn create_user(&self, user: &NewUser) -> Result<ApiResponse, ConsoleError> {
        user.validate()?;
        self.require_area(Area::Admin)?;
        self.settle(self.api.create_user(user).await)
    }

    pub async fn update_user(
        &self,
        id: &str,
        update: &UserUpdate,
    ) -> Result<ApiResponse, ConsoleError> {
        if id.trim().is_empty() {
            return Err(ValidationError::Required("id").into());
        }
        update.validate()?;
        self.require_area(Area::Admin)?;
        self.settle(self.api.update_user(id, update).await)
    }

    pub async fn delete_user(&self, id: &str) -> Result<ApiResponse, ConsoleError> {
        if id.trim().is_empty() {
            return Err(ValidationError::Required("id").into());
        }
        self.require_area(Area::Admin)?;
        self.settle(self.api.delete_user(id).await)
    }

    pub async fn products(&self, page: PageRequest) -> Result<ProductPage, ConsoleError> {
        self.require_area(Area::Admin)?;
        self.settle(self.api.list_products(page).await)
    }

    pub async fn create_product(&self, product: &NewProduct) -> Result<ApiResponse, ConsoleError> {
        product.validate()?;
        self.require_area(Area::Admin)?;
        self.settle(
            self.api
                .create_products(std::slice::from_ref(product))
                .await,
        )
    }

    /// Upload a category or product image ahead of creating the record.
    pub async fn upload_image(&self, image: FilePart) -> Result<ApiResponse, ConsoleError> {
        self.require_area(Area::Admin)?;
        self.settle(self.api.upload_image(image).await)
    }

    pub async fn coupons(&self) -> Result<Vec<Coupon>, ConsoleError> {
        self.require_area(Area::Admin)?;
        self.settle(self.api.list_coupons().await)
    }

    pub async fn create_coupon(&self, coupon: &NewCoupon) -> Result<ApiResponse, ConsoleError> {
        coupon.validate()?;
        self.require_area(Area::Admin)?;
        self.settle(self.api.create_coupon(coupon).await)
    }

    pub async fn update_coupon(
        &self,
        id: &str,
        update: &CouponUpdate,
    ) -> Result<ApiResponse, ConsoleError> {
        update.validate()?;
        self.require_area(Area::Admin)?;
        self.settle(self.api.update_coupon(id, update).await)
    }

    pub async fn set_coupon_active(
        &self,
        id: &str,
        active: bool,
    ) -> Result<ApiResponse, ConsoleError> {
        self.require_area(Area::Admin)?;
        self.settle(self.api.set_coupon_active(id, active).await)
    }

    pub async fn cashbacks(&self) -> Result<Vec<Cashback>, ConsoleError> {
        self.require_area(Area::Admin)?;
        self.settle(self.api.list_cashbacks().await)
    }

    pub async fn create_cashback(&self, cashback: &NewCashback) -> Result<ApiResponse, ConsoleError> {
        cashback.validate()?;
        self.require_area(Area::Admin)?;
        self.settle(self.api.create_cashback(cashback).await)
    }

    pub async fn set_cashback_active(
        &self,
        id: &str,
        active: bool,
    ) -> Result<ApiResponse, ConsoleError> {
        if id.trim().is_empty() {
            return Err(ValidationError::Required("id").into());
        }
        self.require_area(Area::Admin)?;
        self.settle(self.api.set_cashback_active(id, active).await)
    }

    pub async fn notify(&self, notification: &Notification) -> Result<ApiResponse, ConsoleError> {
        notification.validate()?;
        self.require_area(Area::Admin)?;
        self.settle(self.api.send_notification(notification).await)
    }

    pub async fn analysis(&self, range: &AnalysisRange) -> Result<Value, ConsoleError> {
        range.validate()?;
        self.require_area(Area::Admin)?;
        self.settle(self.api.analysis(range).await)
    }

    /// Role of the live session, if any.
    pub fn role(&self) -> Option<Role> {
        self.session().map(|s| s.role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{CredentialKey, EntryWrite, MemorySessionRepository};
    use chrono::Duration;
    use std::time::Duration as StdDuration;

    fn console_with(role: &str, store: Option<&str>) -> (Console, Arc<MemorySessionRepository>) {
        let repo = Arc::new(MemorySessionRepository::new());
        let expires = Utc::now() + Duration::hours(1);
        let mut writes = vec![
            EntryWrite::set(CredentialKey::Token, "tok", expires),
            EntryWrite::set(CredentialKey::TokenExpiry, expires.to_rfc3339(), expires),
            EntryWrite::set(CredentialKey::UserRole, role, expires),
            EntryWrite::set(CredentialKey::UserData, "{}", expires),
        ];
        if let Some(id) = store {
            writes.push(EntryWrite::set(CredentialKey::StoreId, id, expires));
        }
        repo.apply(writes).unwrap();

        // Nothing listens here; these tests never reach the network.
        let api = ApiClient::new("http://127.0.0.1:9", StdDuration::from_secs(1), repo.clone())
            .unwrap();
        (Console::new(api), repo)
    }

    #[test]
    fn test_store_role_cannot_act_as_store() {
        let (console, _) = console_with("storemanager", Some("S1"));
        let err = console.act_as_store("S2", None).unwrap_err();
        assert!(matches!(
            err,
            ConsoleError::Access(AccessError::RoleDenied {
                role: Role::StoreManager,
                area: Area::Admin
            })
        ));
        assert_eq!(err.redirect(), Some("/unauthorized"));
        assert_eq!(console.require_store().unwrap().store_id, "S1");
    }

    #[test]
    fn test_superadmin_switches_store() {
        let (console, _) = console_with("superadmin", None);
        assert!(matches!(
            console.require_store(),
            Err(ConsoleError::Access(AccessError::NoStoreSelected))
        ));

        console.act_as_store("S1", None).unwrap();
        console
            .act_as_store("S2", Some(serde_json::json!({"name": "Kothrud"})))
            .unwrap();
        let store = console.require_store().unwrap();
        assert_eq!(store.store_id, "S2");
        assert_eq!(store.name(), Some("Kothrud"));

        console.leave_store().unwrap();
        assert!(console.binder().current_store_context().is_none());
    }

    #[tokio::test]
    async fn test_expired_session_fails_before_network() {
        let (console, repo) = console_with("superadmin", Some("S1"));
        repo.set(
            CredentialKey::TokenExpiry,
            (Utc::now() - Duration::minutes(1)).to_rfc3339(),
            Utc::now() + Duration::hours(1),
        )
        .unwrap();

        let err = console.stores(PageRequest::default()).await.unwrap_err();
        assert!(matches!(err, ConsoleError::Access(AccessError::SessionExpired)));
        assert_eq!(err.redirect(), Some("/"));
        for key in CredentialKey::ALL {
            assert_eq!(repo.get(key), None);
        }
    }

    #[tokio::test]
    async fn test_validation_runs_before_dispatch() {
        let (console, _) = console_with("superadmin", None);
        let err = console
            .notify(&Notification::new("", "body"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ConsoleError::Validation(ValidationError::Required("title"))
        ));
        assert_eq!(err.redirect(), None);
    }

    #[tokio::test]
    async fn test_superadmin_without_store_gets_no_store_selected() {
        let (console, _) = console_with("superadmin", None);
        let err = console.inventory(PageRequest::default()).await.unwrap_err();
        assert!(matches!(err, ConsoleError::Access(AccessError::NoStoreSelected)));
        assert_eq!(err.redirect(), None);
    }
}
