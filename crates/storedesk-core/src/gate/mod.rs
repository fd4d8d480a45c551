//! Edge request gate for the console's protected areas.
//!
//! The gate only looks at requests under a protected area prefix; every
//! other path passes through untouched. For a protected path it checks, in
//! order, session liveness and then role against area:
//!
//! - dead session: every credential entry is deleted and the request is
//!   sent to `/`
//! - live session, role not allowed: sent to `/unauthorized`, session kept
//! - otherwise the request proceeds
//!
//! [`RequestGate::evaluate`] is the pure decision; [`middleware`] applies it
//! to axum requests carrying the session as cookies.

pub mod middleware;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::auth::{
    authorize, is_session_valid, teardown, Area, CredentialKey, Role, RouteAuthorization,
    SessionRepository, PUBLIC_ROOT, UNAUTHORIZED_PAGE,
};

pub use middleware::gate_middleware;

/// What to do with one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// Outside every protected area
    Unprotected,
    Allow { role: Role, area: Area },
    /// Session missing or expired; it has already been torn down
    RedirectLogin,
    RedirectUnauthorized { role: Option<Role>, area: Area },
}

impl GateDecision {
    pub fn redirect(&self) -> Option<&'static str> {
        match self {
            GateDecision::Unprotected | GateDecision::Allow { .. } => None,
            GateDecision::RedirectLogin => Some(PUBLIC_ROOT),
            GateDecision::RedirectUnauthorized { .. } => Some(UNAUTHORIZED_PAGE),
        }
    }

    pub fn passes(&self) -> bool {
        self.redirect().is_none()
    }
}

/// Percent-decode `raw` and resolve its segments: empty and `.` segments
/// are dropped, `..` removes the one before it and never climbs above `/`.
/// Backslashes count as separators.
pub fn normalize_path(raw: &str) -> String {
    let decoded = urlencoding::decode_binary(raw.as_bytes());
    let decoded = String::from_utf8_lossy(&decoded);

    let mut segments: Vec<&str> = Vec::new();
    for segment in decoded.split(['/', '\\']) {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    format!("/{}", segments.join("/"))
}

#[derive(Debug, Clone)]
pub struct RequestGate {
    areas: Vec<Area>,
}

impl Default for RequestGate {
    fn default() -> Self {
        Self::new(Area::ALL.to_vec())
    }
}

impl RequestGate {
    pub fn new(areas: Vec<Area>) -> Self {
        Self { areas }
    }

    pub fn areas(&self) -> &[Area] {
        &self.areas
    }

    /// Protected area owning `path`, if any. The path is matched in the
    /// form a file server resolves it, see [`normalize_path`].
    pub fn protected_area(&self, path: &str) -> Option<Area> {
        let path = normalize_path(path).to_ascii_lowercase();
        self.areas.iter().copied().find(|area| area.contains(&path))
    }

    /// Decide a request for `path` against the session in `repo`. A dead
    /// session is torn down before this returns.
    pub fn evaluate(
        &self,
        path: &str,
        repo: &dyn SessionRepository,
        now: DateTime<Utc>,
    ) -> GateDecision {
        let Some(area) = self.protected_area(path) else {
            return GateDecision::Unprotected;
        };

        let token = repo.get(CredentialKey::Token);
        let expiry = repo.get(CredentialKey::TokenExpiry);
        let valid = is_session_valid(token.as_deref(), expiry.as_deref(), now);
        if !valid {
            info!(path = %path, "Session invalid, redirecting to login");
            if let Err(e) = teardown(repo) {
                warn!(error = %e, "Failed to tear down session");
            }
            return GateDecision::RedirectLogin;
        }

        let role: Option<Role> = repo
            .get(CredentialKey::UserRole)
            .and_then(|raw| raw.parse().ok());

        match (authorize(valid, role, area), role) {
            (RouteAuthorization::Allow, Some(role)) => {
                debug!(path = %path, role = %role, area = %area, "Request allowed");
                GateDecision::Allow { role, area }
            }
            _ => {
                info!(path = %path, role = ?role, area = %area, "Role not allowed in area");
                GateDecision::RedirectUnauthorized { role, area }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{EntryWrite, MemorySessionRepository};
    use chrono::Duration;

    fn session_repo(role: &str, expires_at: DateTime<Utc>) -> MemorySessionRepository {
        let repo = MemorySessionRepository::new();
        // Entries outlive the stored expiry so the check under test is the
        // token_expiry comparison itself.
        let entry_expiry = Utc::now() + Duration::days(1);
        repo.apply(vec![
            EntryWrite::set(CredentialKey::Token, "tok", entry_expiry),
            EntryWrite::set(CredentialKey::TokenExpiry, expires_at.to_rfc3339(), entry_expiry),
            EntryWrite::set(CredentialKey::UserRole, role, entry_expiry),
            EntryWrite::set(CredentialKey::StoreId, "S1", entry_expiry),
        ])
        .unwrap();
        repo
    }

    #[test]
    fn test_unprotected_paths_pass_without_session() {
        let gate = RequestGate::default();
        let repo = MemorySessionRepository::new();
        let now = Utc::now();
        assert_eq!(gate.evaluate("/", &repo, now), GateDecision::Unprotected);
        assert_eq!(gate.evaluate("/login", &repo, now), GateDecision::Unprotected);
        assert_eq!(
            gate.evaluate("/store-dashboard-old", &repo, now),
            GateDecision::Unprotected
        );
    }

    #[test]
    fn test_expired_superadmin_on_admin_goes_to_login() {
        let now = Utc::now();
        let repo = session_repo("superadmin", now - Duration::minutes(1));
        let decision = RequestGate::default().evaluate("/admin-dashboard/stores", &repo, now);

        assert_eq!(decision, GateDecision::RedirectLogin);
        assert_eq!(decision.redirect(), Some("/"));
        for key in CredentialKey::ALL {
            assert_eq!(repo.get(key), None);
        }
    }

    #[test]
    fn test_storemanager_on_admin_is_unauthorized_and_keeps_session() {
        let now = Utc::now();
        let repo = session_repo("storemanager", now + Duration::hours(1));
        let decision = RequestGate::default().evaluate("/admin-dashboard", &repo, now);

        assert_eq!(
            decision,
            GateDecision::RedirectUnauthorized {
                role: Some(Role::StoreManager),
                area: Area::Admin
            }
        );
        assert_eq!(decision.redirect(), Some("/unauthorized"));
        assert_eq!(repo.get(CredentialKey::Token).as_deref(), Some("tok"));
    }

    #[test]
    fn test_superadmin_allowed_in_store_area() {
        let now = Utc::now();
        let repo = session_repo("superadmin", now + Duration::hours(1));
        let decision = RequestGate::default().evaluate("/store-dashboard/inventory", &repo, now);
        assert_eq!(
            decision,
            GateDecision::Allow {
                role: Role::SuperAdmin,
                area: Area::Store
            }
        );
        assert!(decision.passes());
    }

    #[test]
    fn test_unknown_role_with_live_session_is_unauthorized() {
        let now = Utc::now();
        let repo = session_repo("cashier", now + Duration::hours(1));
        let decision = RequestGate::default().evaluate("/store-dashboard", &repo, now);
        assert_eq!(
            decision,
            GateDecision::RedirectUnauthorized {
                role: None,
                area: Area::Store
            }
        );
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("/admin-dashboard"), "/admin-dashboard");
        assert_eq!(normalize_path("/%61dmin-dashboard/x"), "/admin-dashboard/x");
        assert_eq!(normalize_path("//admin-dashboard//stores/"), "/admin-dashboard/stores");
        assert_eq!(normalize_path("/public/../admin-dashboard"), "/admin-dashboard");
        assert_eq!(normalize_path("/./store-dashboard"), "/store-dashboard");
        assert_eq!(normalize_path("/../../admin-dashboard"), "/admin-dashboard");
        assert_eq!(normalize_path("/%2Fadmin-dashboard"), "/admin-dashboard");
        assert_eq!(normalize_path("\\admin-dashboard\\stores"), "/admin-dashboard/stores");
        assert_eq!(normalize_path(""), "/");
    }

    #[test]
    fn test_disguised_paths_are_still_protected() {
        let gate = RequestGate::default();
        for path in [
            "/%61dmin-dashboard/index.html",
            "//admin-dashboard/index.html",
            "/assets/../admin-dashboard",
            "/./admin-dashboard/",
            "/Admin-Dashboard",
            "/admin-dashboard%2Fstores",
        ] {
            assert_eq!(gate.protected_area(path), Some(Area::Admin), "{}", path);

            let repo = MemorySessionRepository::new();
            assert_eq!(
                gate.evaluate(path, &repo, Utc::now()),
                GateDecision::RedirectLogin,
                "{}",
                path
            );
        }
        assert_eq!(gate.protected_area("/store-dashboard%78"), None);
    }

    #[test]
    fn test_narrowed_gate() {
        let gate = RequestGate::new(vec![Area::Admin]);
        let repo = MemorySessionRepository::new();
        assert_eq!(
            gate.evaluate("/store-dashboard", &repo, Utc::now()),
            GateDecision::Unprotected
        );
    }
}
