//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::request::Parts;
use axum::http::{header, Request, Response};
use tempfile::TempDir;

use deskgate::app;
use deskgate::auth::{Exchange, ExchangeError, Identity};
use deskgate::codec::token_codec;
use deskgate::config::AppConfig;
use deskgate::docs::{Base, MemoryBase};
use deskgate::http::HttpServer;

pub const KEY: &str = "integration-key";

/// Exchange that accepts the code `good` as the given identity.
pub struct FakeExchange {
    pub identity: Identity,
}

#[async_trait]
impl Exchange for FakeExchange {
    async fn exchange(&self, req: &Parts) -> Result<Identity, ExchangeError> {
        match req.uri.query() {
            Some(query) if query.contains("code=good") => Ok(self.identity.clone()),
            Some(query) if query.contains("code=") => Err(ExchangeError::Rejected("bad code".into())),
            _ => Err(ExchangeError::MissingCode),
        }
    }
}

pub struct TestApp {
    pub router: axum::Router,
    pub config: AppConfig,
    // Keeps the asset directory alive for the test.
    _assets: TempDir,
}

pub fn config(assets: &TempDir) -> AppConfig {
    let mut config = AppConfig::default();
    config.auth.security_key = KEY.into();
    config.auth.facebook_id = "1234".into();
    config.auth.facebook_secret = "secret".into();
    config.assets.root = assets.path().to_string_lossy().into_owned();
    config
}

pub fn assets() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("css")).unwrap();
    std::fs::create_dir_all(dir.path().join("xsl")).unwrap();
    std::fs::write(dir.path().join("css/main.css"), "body { margin: 0 }").unwrap();
    std::fs::write(dir.path().join("xsl/layout.xsl"), "<xsl:stylesheet/>").unwrap();
    dir
}

pub fn test_app_with(edit: impl FnOnce(&mut AppConfig)) -> TestApp {
    test_app_on(Arc::new(MemoryBase::new()), edit)
}

/// Application over a caller-supplied document base.
pub fn test_app_on(base: Arc<dyn Base>, edit: impl FnOnce(&mut AppConfig)) -> TestApp {
    let assets = assets();
    let mut config = config(&assets);
    edit(&mut config);

    let exchange = Arc::new(FakeExchange {
        identity: Identity::new("urn:facebook:42").with_property("name", "Ada"),
    });
    let application = app::build(&config, base, exchange).unwrap();
    let router = HttpServer::new(&config, Arc::new(application)).router();
    TestApp {
        router,
        config,
        _assets: assets,
    }
}

pub fn test_app() -> TestApp {
    test_app_with(|_| {})
}

/// Cookie header value carrying `identity`, as the server would issue it.
pub fn cookie_for(identity: &Identity) -> String {
    let token = token_codec(KEY).encode(identity).unwrap();
    format!("PsCookie={}", String::from_utf8(token).unwrap())
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn get_as(uri: &str, identity: &Identity) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::COOKIE, cookie_for(identity))
        .body(Body::empty())
        .unwrap()
}

pub async fn text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub fn set_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get(header::SET_COOKIE)
        .map(|v| v.to_str().unwrap().to_string())
}
