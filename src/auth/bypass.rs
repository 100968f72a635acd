//! Fixed identity for non-production deployments.

use async_trait::async_trait;
use axum::http::request::Parts;

use crate::auth::{Identity, IdentityProvider, Resolution};

/// Resolves every request to one identity while active; inert otherwise.
///
/// The identity does not come from the cookie, so it is handed out as a
/// fresh resolution and the cookie is refreshed with it.
#[derive(Debug, Clone)]
pub struct BypassProvider {
    active: bool,
    identity: Identity,
}

impl BypassProvider {
    pub fn new(active: bool, identity: Identity) -> Self {
        if active {
            tracing::warn!(urn = %identity.urn(), "Authentication bypass is active");
        }
        Self { active, identity }
    }
}

#[async_trait]
impl IdentityProvider for BypassProvider {
    fn name(&self) -> &'static str {
        "bypass"
    }

    async fn enter(&self, _req: &Parts) -> Option<Resolution> {
        self.active
            .then(|| Resolution::fresh(self.identity.clone(), self.name()))
    }
}
