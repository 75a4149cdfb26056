use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::debug;

use super::error::AppError;
use crate::domain::entities::AuthContext;
use crate::infrastructure::jwt::{parse_bearer, JwtService};
use crate::presentation::response::Responder;

/// Bearer token from the `Authorization` header
///
/// # Errors
/// `Unauthorized` when the header is missing or is not `Bearer <token>`
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or_else(|| AppError::unauthorized("Authorization required"))?;

    value
        .to_str()
        .ok()
        .and_then(parse_bearer)
        .ok_or_else(|| AppError::unauthorized("Invalid authorization header format"))
}

/// Authentication middleware that validates access tokens
///
/// On success the request carries an [`AuthContext`] extension; otherwise the
/// chain stops with an `UNAUTHORIZED` envelope.
pub async fn authenticate(
    State(tokens): State<Arc<JwtService>>,
    mut request: Request,
    next: Next,
) -> Response {
    let claims = match bearer_token(request.headers()) {
        Ok(token) => tokens.validate_access(token),
        Err(err) => return Responder::for_request(&request).error(err),
    };

    let context = match claims {
        Ok(claims) => AuthContext::from(claims),
        Err(reason) => {
            debug!(%reason, uri = %request.uri(), "Rejected bearer token");
            return Responder::for_request(&request)
                .error(AppError::unauthorized("Invalid or expired token"));
        }
    };

    debug!(user_id = context.user_id, tenant_id = %context.tenant_id, "Authenticated request");
    request.extensions_mut().insert(context);

    next.run(request).await
}

/// Extract the authorization context placed by [`authenticate`]
impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<AuthContext>().cloned().ok_or_else(|| {
            Responder::from_extensions(&parts.extensions)
                .error(AppError::unauthorized("Authorization required"))
        })
    }
}
