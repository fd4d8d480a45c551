//! Role-to-area authorization.
//!
//! This is the only place that decides which role may enter which area of
//! the console. Callers pass `None` for a role string that did not parse.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::LoginError;

/// Login page and landing for unauthenticated users
pub const PUBLIC_ROOT: &str = "/";

/// Root of the store management area
pub const STORE_AREA_ROOT: &str = "/store-dashboard";

/// Root of the superadmin area
pub const ADMIN_AREA_ROOT: &str = "/admin-dashboard";

/// Shown to a logged-in user who requested an area their role cannot enter
pub const UNAUTHORIZED_PAGE: &str = "/unauthorized";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "lowercase")]
pub enum Role {
    SuperAdmin,
    StoreAdmin,
    StoreManager,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::SuperAdmin => "superadmin",
            Role::StoreAdmin => "storeadmin",
            Role::StoreManager => "storemanager",
        }
    }

    /// Store roles own a store context from login onwards
    pub fn is_store_role(self) -> bool {
        matches!(self, Role::StoreAdmin | Role::StoreManager)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = LoginError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "superadmin" => Ok(Role::SuperAdmin),
            "storeadmin" => Ok(Role::StoreAdmin),
            "storemanager" => Ok(Role::StoreManager),
            other => Err(LoginError::UnknownRole(other.to_string())),
        }
    }
}

/// Protected areas of the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "lowercase")]
pub enum Area {
    Store,
    Admin,
}

impl Area {
    pub const ALL: [Area; 2] = [Area::Store, Area::Admin];

    pub fn prefix(self) -> &'static str {
        match self {
            Area::Store => STORE_AREA_ROOT,
            Area::Admin => ADMIN_AREA_ROOT,
        }
    }

    /// Area owning `path`: the prefix itself or anything below it.
    /// `/store-dashboard-old` belongs to no area.
    pub fn from_path(path: &str) -> Option<Area> {
        Self::ALL.into_iter().find(|area| area.contains(path))
    }

    pub fn contains(self, path: &str) -> bool {
        match path.strip_prefix(self.prefix()) {
            Some(rest) => rest.is_empty() || rest.starts_with('/'),
            None => false,
        }
    }
}

impl fmt::Display for Area {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Area::Store => f.write_str("store"),
            Area::Admin => f.write_str("admin"),
        }
    }
}

/// Outcome of checking a role against an area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteAuthorization {
    Allow,
    Deny { redirect: &'static str },
}

impl RouteAuthorization {
    pub fn is_allowed(self) -> bool {
        matches!(self, RouteAuthorization::Allow)
    }

    pub fn redirect(self) -> Option<&'static str> {
        match self {
            RouteAuthorization::Allow => None,
            RouteAuthorization::Deny { redirect } => Some(redirect),
        }
    }
}

/// Where a freshly authenticated user lands.
pub fn resolve_landing(role: Option<Role>) -> &'static str {
    match role {
        Some(Role::StoreManager) | Some(Role::StoreAdmin) => STORE_AREA_ROOT,
        Some(Role::SuperAdmin) => ADMIN_AREA_ROOT,
        None => PUBLIC_ROOT,
    }
}

/// Whether `role` may enter `area`. Superadmins may enter the store area to
/// act on behalf of a store.
pub fn resolve_authorization(role: Option<Role>, area: Area) -> RouteAuthorization {
    let allowed = match (area, role) {
        (Area::Store, Some(_)) => true,
        (Area::Admin, Some(Role::SuperAdmin)) => true,
        _ => false,
    };

    if allowed {
        RouteAuthorization::Allow
    } else {
        RouteAuthorization::Deny {
            redirect: UNAUTHORIZED_PAGE,
        }
    }
}

/// Full authorization for a request: an invalid session sends the user to
/// login before any role is considered.
pub fn authorize(session_valid: bool, role: Option<Role>, area: Area) -> RouteAuthorization {
    if !session_valid {
        return RouteAuthorization::Deny {
            redirect: PUBLIC_ROOT,
        };
    }
    resolve_authorization(role, area)
}
