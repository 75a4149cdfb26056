use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::debug;

use crate::infrastructure::config::CorsConfig;

/// Cross-origin stage driven by the configured allow-lists
///
/// Preflight `OPTIONS` requests end here with 204 whether or not the origin is
/// allowed; only allowed origins receive `Access-Control-*` headers. Every
/// response carries `Vary: Origin` since the echoed origin differs per caller.
pub async fn apply_cors(
    State(cors): State<Arc<CorsConfig>>,
    request: Request,
    next: Next,
) -> Response {
    let allowed_origin = request
        .headers()
        .get(header::ORIGIN)
        .filter(|origin| origin.to_str().is_ok_and(|value| cors.is_origin_allowed(value)))
        .cloned();

    let mut response = if request.method() == Method::OPTIONS {
        debug!(uri = %request.uri(), "Answering CORS preflight");
        StatusCode::NO_CONTENT.into_response()
    } else {
        next.run(request).await
    };

    response.headers_mut().append(header::VARY, HeaderValue::from_static("origin"));
    if let Some(origin) = allowed_origin {
        write_cors_headers(response.headers_mut(), origin, &cors);
    }

    response
}

fn write_cors_headers(headers: &mut HeaderMap, origin: HeaderValue, cors: &CorsConfig) {
    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, origin);
    if let Ok(methods) = HeaderValue::from_str(&cors.allowed_methods.join(", ")) {
        headers.insert(header::ACCESS_CONTROL_ALLOW_METHODS, methods);
    }
    if let Ok(allowed_headers) = HeaderValue::from_str(&cors.allowed_headers.join(", ")) {
        headers.insert(header::ACCESS_CONTROL_ALLOW_HEADERS, allowed_headers);
    }
    headers.insert(header::ACCESS_CONTROL_ALLOW_CREDENTIALS, HeaderValue::from_static("true"));
    headers.insert(header::ACCESS_CONTROL_MAX_AGE, HeaderValue::from_static("86400"));
}
