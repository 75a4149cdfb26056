use axum::{extract::Request, middleware::Next, response::Response};
use futures_util::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use tracing::error;

use super::error::AppError;
use super::request_id::RequestId;
use crate::presentation::response::Responder;

/// Outermost stage: turns a panic anywhere below into one `INTERNAL_ERROR` envelope
///
/// The correlation id is settled before the chain runs, so the envelope
/// carries the same id the request-id stage stores for inner stages.
pub async fn recover_panics(mut request: Request, next: Next) -> Response {
    let request_id = RequestId::ensure(&mut request);
    let method = request.method().clone();
    let uri = request.uri().clone();

    match AssertUnwindSafe(next.run(request)).catch_unwind().await {
        Ok(response) => response,
        Err(payload) => {
            error!(
                request_id = %request_id,
                method = %method,
                uri = %uri,
                panic = %panic_message(payload.as_ref()),
                "Request handler panicked"
            );
            Responder::new(request_id).error(AppError::internal("Internal server error"))
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "non-string panic payload"
    }
}
