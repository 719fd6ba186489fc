//! Axum adapter for the route guard
//!
//! Mount with `axum::middleware::from_fn_with_state`:
//!
//! ```rust,no_run
//! use axum::{middleware, routing::get, Router};
//! use homexpert_auth::{middleware::route_guard, GuardConfig, JwtService, RouteGuard};
//! use std::sync::Arc;
//!
//! let jwt = Arc::new(JwtService::with_secret("a-long-enough-secret-for-hmac").unwrap());
//! let guard = Arc::new(RouteGuard::new(GuardConfig::default(), jwt));
//!
//! let app: Router = Router::new()
//!     .route("/admin/dashboard", get(|| async { "dashboard" }))
//!     .layer(middleware::from_fn_with_state(guard, route_guard));
//! ```

use crate::guard::{GuardDecision, RouteGuard};
use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

/// Route guard middleware.
///
/// Passes the request on or answers with `302 Found`. On pass-through the
/// verified [`Session`](crate::claims::Session), if any, is inserted into
/// the request extensions.
pub async fn route_guard(State(guard): State<Arc<RouteGuard>>, mut req: Request, next: Next) -> Response {
    let uri = req.uri().clone();
    let session = guard.session(req.headers());
    let decision = guard.decide(uri.path(), uri.query(), session.as_ref()).await;

    match decision {
        GuardDecision::Continue => {
            if let Some(session) = session {
                req.extensions_mut().insert(session);
            }
            next.run(req).await
        }
        GuardDecision::Redirect(location) => found(location),
    }
}

fn found(location: String) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
}
