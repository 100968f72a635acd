//! Document front door library.
//!
//! Resolves who is calling (bypass, OAuth login, logout or identity cookie),
//! routes the request through an ordered rule table and turns every failure
//! into a diagnostic page.

pub mod app;
pub mod auth;
pub mod codec;
pub mod config;
pub mod docs;
pub mod error;
pub mod fallback;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;

pub use config::schema::AppConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
