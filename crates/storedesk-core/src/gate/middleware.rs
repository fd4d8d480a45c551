//! axum middleware applying the [`RequestGate`] to incoming requests.
//!
//! ```rust,ignore
//! let gate = Arc::new(RequestGate::default());
//! let app = Router::new()
//!     .fallback_service(ServeDir::new("out"))
//!     .layer(axum::middleware::from_fn_with_state(gate, gate_middleware));
//! ```

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use chrono::Utc;

use super::{GateDecision, RequestGate};
use crate::auth::{CookieSessionRepository, PUBLIC_ROOT, UNAUTHORIZED_PAGE};

/// Gate a request on the session cookies it carries.
///
/// Redirects are `307 Temporary Redirect`. A redirect to login also
/// expires every credential cookie the browser sent.
pub async fn gate_middleware(
    State(gate): State<Arc<RequestGate>>,
    jar: CookieJar,
    request: Request,
    next: Next,
) -> Response {
    let repo = CookieSessionRepository::new(jar);
    let decision = gate.evaluate(request.uri().path(), &repo, Utc::now());

    match decision {
        GateDecision::Unprotected | GateDecision::Allow { .. } => next.run(request).await,
        GateDecision::RedirectLogin => {
            (repo.into_jar(), Redirect::temporary(PUBLIC_ROOT)).into_response()
        }
        GateDecision::RedirectUnauthorized { .. } => {
            Redirect::temporary(UNAUTHORIZED_PAGE).into_response()
        }
    }
}
