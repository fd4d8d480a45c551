mod common;

use storedesk_core::auth::{AccessError, ADMIN_AREA_ROOT, STORE_AREA_ROOT};
use storedesk_core::models::PageRequest;
use storedesk_core::{ApiError, ConsoleError, CredentialKey, Role, SessionRepository};

#[tokio::test]
async fn test_store_manager_login_binds_store() {
    let (console, repo) = common::console().await;

    let outcome = console.login("manager@store.in", "secret").await.unwrap();
    assert_eq!(outcome.session.role, Role::StoreManager);
    assert_eq!(outcome.landing, STORE_AREA_ROOT);
    assert_eq!(repo.get(CredentialKey::StoreId).as_deref(), Some("S1"));

    let store = console.require_store().unwrap();
    assert_eq!(store.store_id, "S1");
    assert_eq!(store.name(), Some("Deccan"));
}

#[tokio::test]
async fn test_store_calls_carry_the_bound_store() {
    let (console, _repo) = common::console().await;
    console.login("manager@store.in", "secret").await.unwrap();

    let inventory = console.inventory(PageRequest::new(2, 25)).await.unwrap();
    assert_eq!(inventory.products.len(), 1);
    assert!(inventory.products[0].is_low_stock());
    assert_eq!(inventory.pagination.current_page, Some(2));

    let overview = console.overview(PageRequest::default()).await.unwrap();
    assert_eq!(overview.store.store_id, "S1");
    assert_eq!(overview.categories[0].name, "Vegetables");
    assert_eq!(overview.inventory.products[0].name, "Tomato");
}

#[tokio::test]
async fn test_superadmin_has_no_store_until_chosen() {
    let (console, _repo) = common::console().await;

    let outcome = console.login("admin@store.in", "secret").await.unwrap();
    assert_eq!(outcome.landing, ADMIN_AREA_ROOT);
    assert!(outcome.store.is_none());

    let err = console.inventory(PageRequest::default()).await.unwrap_err();
    assert!(matches!(
        err,
        ConsoleError::Access(AccessError::NoStoreSelected)
    ));

    console.act_as_store("S1", None).unwrap();
    let inventory = console.inventory(PageRequest::default()).await.unwrap();
    assert_eq!(inventory.products.len(), 1);
}

#[tokio::test]
async fn test_store_manager_cannot_switch_store() {
    let (console, _repo) = common::console().await;
    console.login("manager@store.in", "secret").await.unwrap();

    let err = console.act_as_store("S2", None).unwrap_err();
    assert_eq!(err.redirect(), Some("/unauthorized"));
    assert_eq!(console.require_store().unwrap().store_id, "S1");
}

#[tokio::test]
async fn test_backend_401_tears_session_down() {
    let (console, repo) = common::console().await;
    console.login("admin@store.in", "secret").await.unwrap();
    console.act_as_store("S9", None).unwrap();

    let err = console.stores(PageRequest::default()).await.unwrap_err();
    assert!(matches!(err, ConsoleError::Api(ApiError::Unauthorized)));
    assert_eq!(err.redirect(), Some("/"));

    assert!(console.session().is_none());
    assert!(console.binder().current_store_context().is_none());
    assert!(repo.get(CredentialKey::Token).is_none());
}

#[tokio::test]
async fn test_unknown_role_is_rejected_at_login() {
    let (console, repo) = common::console().await;

    let err = console.login("cashier@store.in", "secret").await.unwrap_err();
    assert!(matches!(err, ConsoleError::Login(_)));
    assert!(repo.get(CredentialKey::Token).is_none());
}

#[tokio::test]
async fn test_no_session_fails_before_network() {
    let (console, _repo) = common::console().await;

    let err = console.coupons().await.unwrap_err();
    assert!(matches!(err, ConsoleError::Access(AccessError::SessionExpired)));
    assert_eq!(err.redirect(), Some("/"));
}
