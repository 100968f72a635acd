//! Explicit logout.

use async_trait::async_trait;
use axum::http::request::Parts;

use crate::auth::{IdentityProvider, Resolution};

/// Flag value selecting [`LogoutProvider`].
pub const LOGOUT_FLAG: &str = "PsLogout";

/// Always anonymous, and tells the cookie provider to expire the cookie.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogoutProvider;

#[async_trait]
impl IdentityProvider for LogoutProvider {
    fn name(&self) -> &'static str {
        "logout"
    }

    async fn enter(&self, _req: &Parts) -> Option<Resolution> {
        Some(Resolution::logged_out(self.name()))
    }
}
