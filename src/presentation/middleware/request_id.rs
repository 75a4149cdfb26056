use axum::{
    body::Body,
    extract::Request,
    http::{self, Extensions, HeaderMap, HeaderValue},
};
use std::borrow::Cow;
use std::fmt;
use tower_http::request_id::{
    self as tower_request_id, MakeRequestId, PropagateRequestIdLayer, SetRequestIdLayer,
};
use tracing::Span;
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Correlation id of one request
///
/// Holds the raw header value, so an inbound id is echoed byte for byte even
/// when it is not valid UTF-8. The string form is lossy.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestId(HeaderValue);

impl RequestId {
    /// Create a fresh UUID v4 request id
    pub fn generate() -> Self {
        let value = HeaderValue::try_from(Uuid::new_v4().to_string())
            .unwrap_or_else(|_| HeaderValue::from_static("unknown"));
        Self(value)
    }

    /// Inbound id, if the header is present and non-empty
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        headers.get(REQUEST_ID_HEADER).filter(|value| !value.is_empty()).cloned().map(Self::from)
    }

    /// Id stored on the request by the request-id stage
    pub fn from_extensions(extensions: &Extensions) -> Option<Self> {
        extensions
            .get::<tower_request_id::RequestId>()
            .map(|id| Self::from(id.header_value().clone()))
            .filter(|id| !id.0.is_empty())
    }

    /// Resolve the id and write it back into the request header
    ///
    /// A missing or empty header is replaced with a generated id; later stages
    /// reading the same request observe that id.
    pub fn ensure(request: &mut Request) -> Self {
        if let Some(existing) = Self::from_headers(request.headers()) {
            return existing;
        }

        let generated = Self::generate();
        request.headers_mut().insert(REQUEST_ID_HEADER, generated.0.clone());
        generated
    }

    pub fn as_str(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(self.0.as_bytes())
    }

    pub fn header_value(&self) -> &HeaderValue {
        &self.0
    }

    /// Set the `X-Request-ID` header on outgoing headers
    pub fn apply(&self, headers: &mut HeaderMap) {
        headers.insert(REQUEST_ID_HEADER, self.0.clone());
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_str())
    }
}

impl From<HeaderValue> for RequestId {
    fn from(value: HeaderValue) -> Self {
        Self(value)
    }
}

impl From<RequestId> for tower_request_id::RequestId {
    fn from(id: RequestId) -> Self {
        Self::new(id.0)
    }
}

/// UUID v4 generator for requests arriving without a usable id
#[derive(Clone, Copy, Debug, Default)]
pub struct GenerateRequestId;

impl MakeRequestId for GenerateRequestId {
    fn make_request_id<B>(&mut self, _request: &http::Request<B>) -> Option<tower_request_id::RequestId> {
        Some(RequestId::generate().into())
    }
}

/// Stores the inbound or generated id as a request extension
pub fn set_request_id_layer() -> SetRequestIdLayer<GenerateRequestId> {
    SetRequestIdLayer::x_request_id(GenerateRequestId)
}

/// Mirrors the request's id onto responses that do not already carry one
pub fn propagate_request_id_layer() -> PropagateRequestIdLayer {
    PropagateRequestIdLayer::x_request_id()
}

/// Span factory for `TraceLayer`, tagging every request span with its correlation id
pub fn make_request_span(request: &Request<Body>) -> Span {
    let request_id = RequestId::from_extensions(request.extensions());
    let request_id = request_id.as_ref().map_or(Cow::Borrowed(""), RequestId::as_str);

    tracing::info_span!(
        "http_request",
        method = %request.method(),
        uri = %request.uri(),
        request_id = %request_id,
    )
}
