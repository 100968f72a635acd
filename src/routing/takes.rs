//! Reusable takes composed by the application rule list.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::header::{CONTENT_TYPE, LOCATION};
use axum::http::{HeaderValue, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use tower::ServiceExt;
use tower_http::services::ServeDir;

use crate::auth::identity_of;
use crate::error::DispatchError;
use crate::routing::Take;

/// Answers `303 See Other` to a fixed location.
#[derive(Debug, Clone)]
pub struct Redirect {
    location: String,
}

impl Redirect {
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
        }
    }
}

impl Default for Redirect {
    fn default() -> Self {
        Self::new("/")
    }
}

#[async_trait]
impl Take for Redirect {
    async fn act(&self, _req: Request<Body>) -> Result<Response, DispatchError> {
        let location = HeaderValue::from_str(&self.location)
            .map_err(|e| DispatchError::Handler(format!("bad redirect location: {}", e)))?;
        Ok((StatusCode::SEE_OTHER, [(LOCATION, location)]).into_response())
    }
}

/// Fixed plain text body.
#[derive(Debug, Clone)]
pub struct Text {
    body: &'static str,
}

impl Text {
    pub fn new(body: &'static str) -> Self {
        Self { body }
    }
}

#[async_trait]
impl Take for Text {
    async fn act(&self, _req: Request<Body>) -> Result<Response, DispatchError> {
        Ok(self.body.into_response())
    }
}

/// Overrides the `Content-Type` of whatever `inner` answers.
pub struct WithType {
    inner: Arc<dyn Take>,
    content_type: HeaderValue,
}

impl WithType {
    pub fn new(inner: Arc<dyn Take>, content_type: &'static str) -> Self {
        Self {
            inner,
            content_type: HeaderValue::from_static(content_type),
        }
    }
}

#[async_trait]
impl Take for WithType {
    async fn act(&self, req: Request<Body>) -> Result<Response, DispatchError> {
        let mut response = self.inner.act(req).await?;
        if response.status().is_success() {
            response
                .headers_mut()
                .insert(CONTENT_TYPE, self.content_type.clone());
        }
        Ok(response)
    }
}

/// Rejects anonymous callers with a redirect before `inner` is reached.
pub struct Secure {
    inner: Arc<dyn Take>,
    login: Redirect,
}

impl Secure {
    pub fn new(inner: Arc<dyn Take>) -> Self {
        Self {
            inner,
            login: Redirect::default(),
        }
    }
}

#[async_trait]
impl Take for Secure {
    async fn act(&self, req: Request<Body>) -> Result<Response, DispatchError> {
        if identity_of(&req).is_none() {
            tracing::debug!(path = %req.uri().path(), "Anonymous request to protected path");
            return self.login.act(req).await;
        }
        self.inner.act(req).await
    }
}

/// Files under a directory, addressed by the full request path.
#[derive(Debug, Clone)]
pub struct Files {
    root: PathBuf,
}

impl Files {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl Take for Files {
    async fn act(&self, req: Request<Body>) -> Result<Response, DispatchError> {
        let path = req.uri().path().to_string();
        let response = match ServeDir::new(&self.root).oneshot(req).await {
            Ok(response) => response,
            Err(never) => match never {},
        };
        if response.status() == StatusCode::NOT_FOUND {
            return Err(DispatchError::NotFound(path));
        }
        Ok(response.map(Body::new))
    }
}
