use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::{
    domain::repositories::AccountDirectory,
    infrastructure::{http::health_check, jwt::JwtService},
    presentation::{
        handlers::{self, auth::AuthState},
        middleware::apply_authentication,
    },
};

/// Create all application routes
///
/// The refresh exchange needs the account directory and is only mounted when
/// one is supplied.
pub fn create_routes(
    tokens: Arc<JwtService>,
    directory: Option<Arc<dyn AccountDirectory>>,
) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1/auth", auth_routes(tokens, directory))
}

/// Create authentication routes
fn auth_routes(tokens: Arc<JwtService>, directory: Option<Arc<dyn AccountDirectory>>) -> Router {
    let session = apply_authentication(
        Router::new()
            .route("/me", get(handlers::auth::me))
            .route("/logout", post(handlers::auth::logout)),
        tokens.clone(),
    );

    match directory {
        Some(directory) => session.merge(
            Router::new()
                .route("/refresh", post(handlers::auth::refresh))
                .with_state(AuthState { tokens, directory }),
        ),
        None => session,
    }
}
