//! Failures that escape a take and reach the fallback.

use axum::http::StatusCode;
use thiserror::Error;

use crate::codec::CodecError;
use crate::docs::BaseError;

#[derive(Debug, Error)]
pub enum DispatchError {
    /// No rule matched the request.
    #[error("no route for {0}")]
    NotFound(String),

    /// The request itself is unusable (unreadable body, bad document name).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The request body is over the configured limit.
    #[error("request body exceeds {0} bytes")]
    PayloadTooLarge(usize),

    #[error("storage failure")]
    Storage(#[from] BaseError),

    #[error("cannot encode identity token")]
    Token(#[from] CodecError),

    /// Anything else raised by a take.
    #[error("{0}")]
    Handler(String),
}

impl DispatchError {
    /// Status the fallback answers with.
    pub fn status(&self) -> StatusCode {
        match self {
            DispatchError::NotFound(_) => StatusCode::NOT_FOUND,
            DispatchError::BadRequest(_) => StatusCode::BAD_REQUEST,
            DispatchError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            DispatchError::Storage(BaseError::NotFound(_)) => StatusCode::NOT_FOUND,
            DispatchError::Storage(BaseError::InvalidName(_)) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
