//! Access and login errors.

use thiserror::Error;

use super::roles::{Area, Role, PUBLIC_ROOT, UNAUTHORIZED_PAGE};

/// Local access decisions, made without contacting the backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AccessError {
    #[error("Session expired - please log in again")]
    SessionExpired,

    #[error("Role {role} may not access the {area} area")]
    RoleDenied { role: Role, area: Area },

    #[error("No store selected")]
    NoStoreSelected,
}

impl AccessError {
    /// Navigation target that resolves this error, if any.
    pub fn redirect(&self) -> Option<&'static str> {
        match self {
            AccessError::SessionExpired => Some(PUBLIC_ROOT),
            AccessError::RoleDenied { .. } => Some(UNAUTHORIZED_PAGE),
            AccessError::NoStoreSelected => None,
        }
    }
}

#[derive(Error, Debug)]
pub enum LoginError {
    #[error("Login failed: {0}")]
    Rejected(String),

    #[error("Unrecognized role: {0}")]
    UnknownRole(String),

    #[error("Invalid token expiry: {0}")]
    InvalidExpiry(String),

    #[error("Token already expired at {0}")]
    AlreadyExpired(String),

    #[error("Failed to store session: {0}")]
    Storage(#[from] anyhow::Error),
}
