//! Authentication module for managing console sessions and store context.
//!
//! This module provides:
//! - `SessionRepository`: key-value credential storage with expiry-bound entries
//! - `Session`: typed view of a live session and the liveness check
//! - `Role` / `Area`: the role-to-area authorization rules
//! - `StoreContextBinder`: the single "acting as store" slot
//! - `CredentialStore`: remembered passwords in the OS keychain
//!
//! Every entry lives no longer than the token that created it.

pub mod credentials;
pub mod error;
pub mod login;
pub mod repository;
pub mod roles;
pub mod session;
pub mod store_context;

pub use credentials::CredentialStore;
pub use error::{AccessError, LoginError};
pub use login::{persist_login, LoginData, LoginOutcome, LoginStore, LoginUser};
pub use repository::{
    CookieSessionRepository, CredentialKey, EntryWrite, FileSessionRepository,
    MemorySessionRepository, SessionRepository,
};
pub use roles::{
    authorize, resolve_authorization, resolve_landing, Area, Role, RouteAuthorization,
    ADMIN_AREA_ROOT, PUBLIC_ROOT, STORE_AREA_ROOT, UNAUTHORIZED_PAGE,
};
pub use session::{is_session_valid, teardown, Session};
pub use store_context::{EnterStoreError, StoreContext, StoreContextBinder};
