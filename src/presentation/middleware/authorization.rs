use axum::{extract::Request, middleware::Next, response::Response};
use std::future::Future;
use std::pin::Pin;
use tracing::warn;

use super::error::AppError;
use crate::domain::entities::AuthContext;
use crate::domain::value_objects::RoleSet;
use crate::presentation::response::Responder;

/// Tenant isolation: the authenticated principal must belong to a tenant
pub async fn require_tenant(request: Request, next: Next) -> Response {
    let has_tenant =
        request.extensions().get::<AuthContext>().and_then(AuthContext::tenant).is_some();

    if !has_tenant {
        return Responder::for_request(&request)
            .error(AppError::forbidden("Tenant context is required"));
    }

    next.run(request).await
}

/// Role-based authorization middleware
///
/// The returned closure is meant for `axum::middleware::from_fn`.
pub fn require_roles(
    allowed: RoleSet,
) -> impl Fn(Request, Next) -> Pin<Box<dyn Future<Output = Response> + Send>> + Clone {
    move |request: Request, next: Next| {
        Box::pin(async move {
            let Some(context) = request.extensions().get::<AuthContext>() else {
                return Responder::for_request(&request)
                    .error(AppError::forbidden("Role information not found"));
            };

            let Some(role) = context.role else {
                return Responder::for_request(&request)
                    .error(AppError::forbidden("Role information not found"));
            };

            if !context.has_any_role(allowed) {
                warn!(
                    user_id = context.user_id,
                    tenant_id = %context.tenant_id,
                    role = %role,
                    allowed = ?allowed,
                    "Role not permitted for route"
                );
                return Responder::for_request(&request)
                    .error(AppError::forbidden("Insufficient permissions"));
            }

            next.run(request).await
        })
    }
}
