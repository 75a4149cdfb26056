//! Request pipeline stages
//!
//! Global stages, outermost first: panic recovery, request identification,
//! HTTP tracing, CORS. Protected route groups add authentication, tenant
//! isolation and, per group, role enforcement. Each stage either forwards the
//! request or ends it with an error envelope.

pub mod auth;
pub mod authorization;
pub mod cors;
pub mod error;
pub mod recovery;
pub mod request_id;

use axum::{middleware, Router};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::infrastructure::config::CorsConfig;
use crate::infrastructure::jwt::JwtService;

// Re-export commonly used types
pub use auth::{authenticate, bearer_token};
pub use authorization::{require_roles, require_tenant};
pub use cors::apply_cors;
pub use error::{AppError, ErrorCode};
pub use recovery::recover_panics;
pub use request_id::{
    propagate_request_id_layer, set_request_id_layer, GenerateRequestId, RequestId,
    REQUEST_ID_HEADER,
};

/// Wrap every route and the fallback of `router` in the global stages
///
/// Recovery settles the correlation id first; the tower-http request-id
/// layers then store it as an extension and mirror it on every response.
pub fn apply_global_stages<S>(router: Router<S>, cors: Arc<CorsConfig>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.layer(
        ServiceBuilder::new()
            .layer(middleware::from_fn(recover_panics))
            .layer(set_request_id_layer())
            .layer(TraceLayer::new_for_http().make_span_with(request_id::make_request_span))
            .layer(propagate_request_id_layer())
            .layer(middleware::from_fn_with_state(cors, apply_cors)),
    )
}

/// Require a valid access token on every route of `router`
///
/// Applied as a route layer, so unmatched paths still fall through to the
/// not-found handler instead of reporting `UNAUTHORIZED`.
pub fn apply_authentication<S>(router: Router<S>, tokens: Arc<JwtService>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.route_layer(middleware::from_fn_with_state(tokens, authenticate))
}

/// Authentication followed by tenant isolation
///
/// Role enforcement is added per route group with
/// `route_layer(from_fn(require_roles(..)))` before calling this.
pub fn apply_protected_stages<S>(router: Router<S>, tokens: Arc<JwtService>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.route_layer(
        ServiceBuilder::new()
            .layer(middleware::from_fn_with_state(tokens, authenticate))
            .layer(middleware::from_fn(require_tenant)),
    )
}
