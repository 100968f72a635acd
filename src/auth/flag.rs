//! Provider selection by query flag.

use async_trait::async_trait;
use axum::http::request::Parts;
use axum::http::HeaderMap;

use crate::auth::provider::query_param;
use crate::auth::{IdentityProvider, Resolution};
use crate::codec::CodecError;

/// Query parameter naming the provider to run. Part of the public URL
/// contract; do not rename.
pub const FLAG: &str = "PsByFlag";

/// Runs the sub-provider named by the [`FLAG`] query parameter.
///
/// A recognised flag settles the request: if the sub-provider comes back
/// empty, the caller is anonymous for this request and the chain stops.
/// Unknown or missing flags let the chain move on.
pub struct FlagProvider {
    pairs: Vec<(String, Box<dyn IdentityProvider>)>,
}

impl FlagProvider {
    pub fn new() -> Self {
        Self { pairs: Vec::new() }
    }

    /// Register `provider` under `flag`.
    pub fn with(mut self, flag: impl Into<String>, provider: impl IdentityProvider + 'static) -> Self {
        self.pairs.push((flag.into(), Box::new(provider)));
        self
    }

    fn select(&self, flag: &str) -> Option<&dyn IdentityProvider> {
        self.pairs
            .iter()
            .find(|(name, _)| name == flag)
            .map(|(_, provider)| provider.as_ref())
    }
}

impl Default for FlagProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IdentityProvider for FlagProvider {
    fn name(&self) -> &'static str {
        "flag"
    }

    async fn enter(&self, req: &Parts) -> Option<Resolution> {
        let flag = query_param(req, FLAG)?;
        let Some(provider) = self.select(&flag) else {
            tracing::debug!(flag = %flag, "Unknown provider flag, ignoring");
            return None;
        };
        match provider.enter(req).await {
            Some(resolution) => Some(resolution),
            None => Some(Resolution::anonymous(provider.name())),
        }
    }

    fn exit(&self, resolution: &Resolution, headers: &mut HeaderMap) -> Result<(), CodecError> {
        for (_, provider) in &self.pairs {
            provider.exit(resolution, headers)?;
        }
        Ok(())
    }
}
