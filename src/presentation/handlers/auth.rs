use axum::{
    extract::{rejection::JsonRejection, State},
    response::{Json, Response},
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info};

use crate::domain::entities::AuthContext;
use crate::domain::repositories::AccountDirectory;
use crate::infrastructure::jwt::{JwtService, Subject, TokenPair};
use crate::presentation::middleware::AppError;
use crate::presentation::response::Responder;

/// State shared by the public token endpoints
#[derive(Clone)]
pub struct AuthState {
    pub tokens: Arc<JwtService>,
    pub directory: Arc<dyn AccountDirectory>,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    #[serde(default)]
    pub refresh_token: String,
}

/// Exchange a refresh token for a new token pair
///
/// Email and role are read from the directory, never from the refresh token.
pub async fn refresh(
    State(state): State<AuthState>,
    responder: Responder,
    payload: Result<Json<RefreshRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return responder.error(rejection.into()),
    };

    if request.refresh_token.is_empty() {
        return responder.error(AppError::validation(json!({
            "refresh_token": "is required"
        })));
    }

    responder.result(exchange_refresh_token(&state, &request.refresh_token).await)
}

async fn exchange_refresh_token(state: &AuthState, token: &str) -> Result<TokenPair, AppError> {
    let claims = state.tokens.validate_refresh(token).map_err(|reason| {
        debug!(%reason, "Refresh token rejected");
        AppError::unauthorized("Invalid refresh token")
    })?;

    let membership = state
        .directory
        .find_membership(claims.user_id, &claims.tenant_id)
        .await
        .map_err(|e| AppError::internal_with_source("Failed to load user role", e))?
        .ok_or_else(|| AppError::unauthorized("User not found"))?;

    if !membership.active {
        return Err(AppError::unauthorized("User account is inactive"));
    }

    let subject = Subject::new(membership.user_id, membership.tenant_id)
        .with_email(membership.email)
        .with_role(membership.role);
    let pair = state.tokens.issue_pair(&subject)?;

    info!(user_id = subject.user_id, tenant_id = %subject.tenant_id, "Issued refreshed token pair");
    Ok(pair)
}

/// Authorization context of the caller
pub async fn me(context: AuthContext, responder: Responder) -> Response {
    responder.success(context)
}

/// Stateless logout; clients discard their tokens
pub async fn logout(context: AuthContext, responder: Responder) -> Response {
    info!(user_id = context.user_id, tenant_id = %context.tenant_id, "User logged out");
    responder.success(json!({ "message": "Logged out successfully" }))
}
