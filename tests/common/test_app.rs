use axum::{
    body::Body,
    http::{HeaderMap, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

pub struct TestApp {
    pub router: Router,
}

impl TestApp {
    pub fn new(router: Router) -> Self {
        Self { router }
    }

    pub async fn get(&self, path: &str) -> TestResponse {
        let request = Request::builder().uri(path).method("GET").body(Body::empty()).unwrap();
        self.send(request).await
    }

    pub async fn get_with_token(&self, path: &str, token: &str) -> TestResponse {
        let request = Request::builder()
            .uri(path)
            .method("GET")
            .header("authorization", format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    pub async fn post_json(&self, path: &str, body: &Value) -> TestResponse {
        let request = Request::builder()
            .uri(path)
            .method("POST")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        TestResponse::new(response).await
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    async fn new(response: axum::response::Response) -> Self {
        let status = response.status();
        let headers = response.headers().clone();
        let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = String::from_utf8(body_bytes.to_vec()).unwrap();

        Self { status, headers, body }
    }

    pub fn assert_status(&self, expected: StatusCode) {
        assert_eq!(self.status, expected, "Response body: {}", self.body);
    }

    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).unwrap()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    pub fn request_id(&self) -> &str {
        self.header("x-request-id").expect("x-request-id header missing")
    }

    /// Assert a failed envelope with `code` and `message`, correlated with the header id
    pub fn assert_error(&self, status: StatusCode, code: &str, message: &str) {
        self.assert_status(status);
        let body = self.json();
        assert_eq!(body["success"], false, "Response body: {}", self.body);
        assert_eq!(body["error"]["code"], code, "Response body: {}", self.body);
        assert_eq!(body["error"]["message"], message, "Response body: {}", self.body);
        assert_eq!(body["request_id"], self.request_id());
    }
}
