//! Uniform response envelope
//!
//! Every outcome leaves the service in the same JSON shape:
//! `{success, data?, error?, meta?, request_id, timestamp}`. Handlers and
//! middleware emit through a [`Responder`], whose emitters consume it, so a
//! request produces exactly one envelope.

use axum::{
    extract::{FromRequestParts, Request},
    http::{header::CONTENT_TYPE, request::Parts, Extensions, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::convert::Infallible;
use tracing::error;

use crate::presentation::middleware::error::{AppError, ErrorCode};
use crate::presentation::middleware::request_id::RequestId;

/// Wire shape of every response body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
    pub request_id: String,
    pub timestamp: String,
}

/// Error section of a failed envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorInfo {
    pub code: ErrorCode,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

/// Pagination metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meta {
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u64,
    pub total_count: u64,
}

impl Meta {
    pub fn new(page: u32, page_size: u32, total_count: u64) -> Self {
        let total_pages =
            if page_size == 0 { 0 } else { total_count.div_ceil(u64::from(page_size)) };

        Self { page, page_size, total_pages, total_count }
    }
}

impl From<&AppError> for ErrorInfo {
    fn from(err: &AppError) -> Self {
        Self { code: err.code(), message: err.to_string(), details: err.details().cloned() }
    }
}

impl<T> ApiResponse<T> {
    fn succeeded(data: T, meta: Option<Meta>, request_id: &RequestId) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            meta,
            request_id: request_id.to_string(),
            timestamp: now_rfc3339(),
        }
    }

    fn failed(error: ErrorInfo, request_id: &RequestId) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error),
            meta: None,
            request_id: request_id.to_string(),
            timestamp: now_rfc3339(),
        }
    }
}

/// UTC timestamp with second precision and a `Z` suffix
fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Envelope emitter bound to one request's correlation id
#[derive(Debug, Clone)]
pub struct Responder {
    request_id: RequestId,
}

impl Responder {
    pub fn new(request_id: RequestId) -> Self {
        Self { request_id }
    }

    /// Responder for the id stored by the request-id stage, or a fresh id when absent
    pub fn from_extensions(extensions: &Extensions) -> Self {
        let request_id = RequestId::from_extensions(extensions).unwrap_or_else(RequestId::generate);
        Self::new(request_id)
    }

    pub fn for_request(request: &Request) -> Self {
        Self::from_extensions(request.extensions())
    }

    pub fn request_id(&self) -> &RequestId {
        &self.request_id
    }

    pub fn success<T: Serialize>(self, data: T) -> Response {
        let envelope = ApiResponse::succeeded(data, None, &self.request_id);
        self.emit(StatusCode::OK, &envelope)
    }

    pub fn success_with_meta<T: Serialize>(self, data: T, meta: Meta) -> Response {
        let envelope = ApiResponse::succeeded(data, Some(meta), &self.request_id);
        self.emit(StatusCode::OK, &envelope)
    }

    pub fn created<T: Serialize>(self, data: T) -> Response {
        let envelope = ApiResponse::succeeded(data, None, &self.request_id);
        self.emit(StatusCode::CREATED, &envelope)
    }

    /// 204 with an empty body; only the correlation header is set
    pub fn no_content(self) -> Response {
        let mut response = StatusCode::NO_CONTENT.into_response();
        self.request_id.apply(response.headers_mut());
        response
    }

    /// Failed envelope with the status fixed by the error's classification
    pub fn error(self, err: AppError) -> Response {
        err.log(&self.request_id.as_str());
        let envelope = ApiResponse::<()>::failed(ErrorInfo::from(&err), &self.request_id);
        self.emit(err.status_code(), &envelope)
    }

    pub fn result<T: Serialize>(self, result: Result<T, AppError>) -> Response {
        match result {
            Ok(data) => self.success(data),
            Err(err) => self.error(err),
        }
    }

    fn emit<T: Serialize>(self, status: StatusCode, envelope: &ApiResponse<T>) -> Response {
        let (status, body) = match serde_json::to_vec(envelope) {
            Ok(body) => (status, body),
            Err(e) => {
                error!(
                    request_id = %self.request_id,
                    error = %e,
                    "Failed to serialize response payload"
                );
                let fallback = ApiResponse::<()>::failed(
                    ErrorInfo::from(&AppError::internal("Internal server error")),
                    &self.request_id,
                );
                (StatusCode::INTERNAL_SERVER_ERROR, serde_json::to_vec(&fallback).unwrap_or_default())
            }
        };

        let mut response =
            (status, [(CONTENT_TYPE, HeaderValue::from_static("application/json"))], body)
                .into_response();
        self.request_id.apply(response.headers_mut());
        response
    }
}

impl<S> FromRequestParts<S> for Responder
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_extensions(&parts.extensions))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;
    use serde::ser::Error as _;
    use serde_json::json;

    fn responder() -> Responder {
        Responder::new(RequestId::from(HeaderValue::from_static("req-123")))
    }

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    struct Unserializable;

    impl Serialize for Unserializable {
        fn serialize<S: serde::Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
            Err(S::Error::custom("refusing to serialize"))
        }
    }

    #[test]
    fn test_meta_total_pages() {
        assert_eq!(Meta::new(1, 10, 0).total_pages, 0);
        assert_eq!(Meta::new(1, 10, 10).total_pages, 1);
        assert_eq!(Meta::new(1, 10, 11).total_pages, 2);
        assert_eq!(Meta::new(3, 25, 101).total_pages, 5);
        assert_eq!(Meta::new(1, 0, 50).total_pages, 0);
    }

    #[tokio::test]
    async fn test_success_envelope() {
        let response = responder().success(json!({"name": "acme"}));

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers().get("x-request-id").unwrap(), "req-123");
        assert_eq!(response.headers().get("content-type").unwrap(), "application/json");

        let body = body_json(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["name"], "acme");
        assert_eq!(body["request_id"], "req-123");
        assert!(body.get("error").is_none());
        assert!(body.get("meta").is_none());
    }

    #[tokio::test]
    async fn test_timestamp_format() {
        let body = body_json(responder().success(1)).await;
        let timestamp = body["timestamp"].as_str().unwrap();

        assert!(timestamp.ends_with('Z'));
        assert!(!timestamp.contains('.'));
        assert!(chrono::DateTime::parse_from_rfc3339(timestamp).is_ok());
    }

    #[tokio::test]
    async fn test_success_with_meta() {
        let response = responder().success_with_meta(vec![1, 2, 3], Meta::new(2, 3, 8));
        let body = body_json(response).await;

        assert_eq!(body["meta"], json!({"page": 2, "page_size": 3, "total_pages": 3, "total_count": 8}));
    }

    #[tokio::test]
    async fn test_created() {
        let response = responder().created(json!({"id": 42}));
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(body_json(response).await["data"]["id"], 42);
    }

    #[tokio::test]
    async fn test_no_content_has_empty_body() {
        let response = responder().no_content();

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(response.headers().get("x-request-id").unwrap(), "req-123");
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(bytes.is_empty());
    }

    #[tokio::test]
    async fn test_not_found_envelope() {
        let response = responder().error(AppError::not_found("tenant"));

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
        assert_eq!(body["error"]["message"], "tenant not found");
        assert!(body["error"].get("details").is_none());
        assert!(body.get("data").is_none());
        assert_eq!(body["request_id"], "req-123");
    }

    #[tokio::test]
    async fn test_validation_envelope_carries_details() {
        let response = responder().error(AppError::validation(json!({"page_size": "must be positive"})));

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(body["error"]["message"], "Validation failed");
        assert_eq!(body["error"]["details"]["page_size"], "must be positive");
    }

    #[tokio::test]
    async fn test_internal_error_hides_cause() {
        let cause = std::io::Error::other("password authentication failed for user postgres");
        let response = responder().error(AppError::internal_with_source("Failed to load user", cause));

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let rendered = body_json(response).await.to_string();
        assert!(rendered.contains("Failed to load user"));
        assert!(!rendered.contains("postgres"));
    }

    #[tokio::test]
    async fn test_result_dispatch() {
        let ok: Result<u32, AppError> = Ok(7);
        assert_eq!(responder().result(ok).status(), StatusCode::OK);

        let err: Result<u32, AppError> = Err(AppError::conflict("Extension already assigned"));
        let response = responder().result(err);
        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(body_json(response).await["error"]["code"], "CONFLICT");
    }

    #[tokio::test]
    async fn test_unserializable_payload_becomes_internal_error() {
        let response = responder().success(Unserializable);

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.headers().get("x-request-id").unwrap(), "req-123");
        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["code"], "INTERNAL_ERROR");
        assert_eq!(body["request_id"], "req-123");
    }

    #[test]
    fn test_from_extensions_falls_back_to_fresh_id() {
        let request = Request::builder().body(axum::body::Body::empty()).unwrap();
        let responder = Responder::for_request(&request);
        assert!(uuid::Uuid::parse_str(&responder.request_id().as_str()).is_ok());
    }

    #[test]
    fn test_from_extensions_uses_stored_id() {
        let mut request = Request::builder().body(axum::body::Body::empty()).unwrap();
        request
            .extensions_mut()
            .insert(tower_http::request_id::RequestId::new(HeaderValue::from_static("stored-1")));

        assert_eq!(Responder::for_request(&request).request_id().to_string(), "stored-1");
    }

    #[test]
    fn test_envelope_deserializes() {
        let raw = json!({
            "success": false,
            "error": {"code": "FORBIDDEN", "message": "Insufficient permissions"},
            "request_id": "abc",
            "timestamp": "2024-01-01T00:00:00Z"
        });
        let envelope: ApiResponse<Value> = serde_json::from_value(raw).unwrap();

        assert!(!envelope.success);
        assert_eq!(envelope.error.unwrap().code, ErrorCode::Forbidden);
    }
}
