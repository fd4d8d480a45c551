//! Core library for the storedesk admin console.
//!
//! Provides session storage and validation, role-based route authorization,
//! store-context binding, the edge request gate, and the REST client used to
//! talk to the grocery platform backend.

pub mod api;
pub mod auth;
pub mod config;
pub mod console;
pub mod gate;
pub mod models;

pub use api::{ApiClient, ApiError, ApiRequest, ApiResponse};
pub use auth::{
    AccessError, Area, CredentialKey, Role, RouteAuthorization, Session, SessionRepository,
    StoreContext, StoreContextBinder,
};
pub use config::Config;
pub use console::{Console, ConsoleError};
pub use gate::{GateDecision, RequestGate};
