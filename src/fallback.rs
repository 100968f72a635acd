//! Last-resort error boundary.
//!
//! # Responsibilities
//! - Run the whole pipeline (auth, routing, takes) for one request
//! - Catch returned errors and panics alike
//! - Log one diagnostic entry and answer a generic error page
//!
//! # Design Decisions
//! - Rendering the error page cannot fail; it is a plain string response
//! - 4xx outcomes log at warn, everything else at error
//! - Request metrics are recorded here, after the final status is known

use std::any::Any;
use std::error::Error;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::{IntoResponse, Response};
use futures_util::FutureExt;

use crate::error::DispatchError;
use crate::http::response::{escape, page};
use crate::http::X_REQUEST_ID;
use crate::observability::metrics;
use crate::routing::Take;

/// Wraps a take so that every request ends in a response.
pub struct Fallback {
    inner: Arc<dyn Take>,
}

impl Fallback {
    pub fn new(inner: Arc<dyn Take>) -> Self {
        Self { inner }
    }

    pub async fn handle(&self, req: Request<Body>) -> Response {
        let start_time = Instant::now();
        let method = req.method().to_string();
        let path = req.uri().path().to_string();
        let request_id = req
            .headers()
            .get(X_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("unknown")
            .to_string();

        let outcome = AssertUnwindSafe(self.inner.act(req)).catch_unwind().await;
        let response = match outcome {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                let status = e.status();
                let detail = diagnostic(&e);
                if status.is_client_error() {
                    tracing::warn!(request_id = %request_id, method = %method, path = %path, status = %status, error = %detail, "Request failed");
                } else {
                    tracing::error!(request_id = %request_id, method = %method, path = %path, status = %status, error = %detail, "Request failed");
                }
                metrics::record_fallback(kind(&e));
                render(status, &detail)
            }
            Err(panic) => {
                let detail = format!("panic: {}", panic_message(panic.as_ref()));
                tracing::error!(request_id = %request_id, method = %method, path = %path, error = %detail, "Request panicked");
                metrics::record_fallback("panic");
                render(StatusCode::INTERNAL_SERVER_ERROR, &detail)
            }
        };

        metrics::record_request(&method, response.status().as_u16(), start_time);
        response
    }
}

/// Error message followed by its source chain, one cause per line.
pub fn diagnostic(error: &DispatchError) -> String {
    let mut text = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        text.push_str("\ncaused by: ");
        text.push_str(&cause.to_string());
        source = cause.source();
    }
    text
}

fn kind(error: &DispatchError) -> &'static str {
    match error {
        DispatchError::NotFound(_) => "not_found",
        DispatchError::BadRequest(_) => "bad_request",
        DispatchError::PayloadTooLarge(_) => "payload_too_large",
        DispatchError::Storage(_) => "storage",
        DispatchError::Token(_) => "token",
        DispatchError::Handler(_) => "handler",
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(s) = panic.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s
    } else {
        "unknown panic payload"
    }
}

fn render(status: StatusCode, detail: &str) -> Response {
    let body = format!(
        "<h1>oops, something went wrong!</h1>\n<pre>{}</pre>",
        escape(detail)
    );
    (status, page("Error", &body)).into_response()
}
