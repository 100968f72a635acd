//! Ordered provider chain.

use axum::http::request::Parts;
use axum::http::HeaderMap;

use crate::auth::{IdentityProvider, Resolution};
use crate::codec::CodecError;
use crate::observability::metrics;

/// Source recorded when no provider settles the request.
pub const ANONYMOUS: &str = "chain";

/// Asks providers in order; the first one that settles the request wins.
/// Nobody settling it means the caller is anonymous.
pub struct Chain {
    providers: Vec<Box<dyn IdentityProvider>>,
}

impl Chain {
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
        }
    }

    pub fn with(mut self, provider: impl IdentityProvider + 'static) -> Self {
        self.providers.push(Box::new(provider));
        self
    }

    /// Resolve the caller of `req`. Never fails.
    pub async fn resolve(&self, req: &Parts) -> Resolution {
        for provider in &self.providers {
            if let Some(resolution) = provider.enter(req).await {
                tracing::debug!(
                    provider = provider.name(),
                    authenticated = resolution.identity.is_some(),
                    "Identity resolved"
                );
                metrics::record_resolution(resolution.source, resolution.identity.is_some());
                return resolution;
            }
        }
        metrics::record_resolution(ANONYMOUS, false);
        Resolution::anonymous(ANONYMOUS)
    }

    /// Let every provider adjust the response headers.
    pub fn finish(&self, resolution: &Resolution, headers: &mut HeaderMap) -> Result<(), CodecError> {
        for provider in &self.providers {
            provider.exit(resolution, headers)?;
        }
        Ok(())
    }
}

impl Default for Chain {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{
        BypassProvider, CookieProvider, CookieSettings, FlagProvider, Identity, LogoutProvider,
    };
    use crate::codec::token_codec;
    use axum::http::header::{COOKIE, SET_COOKIE};
    use axum::http::Request;

    fn chain(bypass: bool) -> (Chain, String) {
        let cookie = CookieProvider::new(token_codec("key"), CookieSettings::default());
        let issued = cookie.issue(&Identity::new("urn:test:cookie")).unwrap();
        let pair = issued.split(';').next().unwrap().to_string();
        let chain = Chain::new()
            .with(BypassProvider::new(bypass, Identity::new("urn:test:1")))
            .with(FlagProvider::new().with("PsLogout", LogoutProvider))
            .with(cookie);
        (chain, pair)
    }

    fn parts(uri: &str, cookie: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri(uri);
        if let Some(c) = cookie {
            builder = builder.header(COOKIE, c);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn test_anonymous_when_nothing_resolves() {
        let (chain, _) = chain(false);
        let resolution = chain.resolve(&parts("/", None)).await;
        assert_eq!(resolution, Resolution::anonymous("chain"));
    }

    #[tokio::test]
    async fn test_cookie_resolves_last() {
        let (chain, cookie) = chain(false);
        let resolution = chain.resolve(&parts("/", Some(&cookie))).await;
        assert_eq!(resolution.identity, Some(Identity::new("urn:test:cookie")));
        assert_eq!(resolution.source, "cookie");
    }

    #[tokio::test]
    async fn test_bypass_wins_over_everything() {
        let (chain, cookie) = chain(true);
        for uri in ["/", "/?PsByFlag=PsLogout"] {
            let resolution = chain.resolve(&parts(uri, Some(&cookie))).await;
            assert_eq!(resolution.identity, Some(Identity::new("urn:test:1")));
        }
    }

    #[tokio::test]
    async fn test_logout_ignores_cookie_and_clears_it() {
        let (chain, cookie) = chain(false);
        let resolution = chain.resolve(&parts("/?PsByFlag=PsLogout", Some(&cookie))).await;
        assert_eq!(resolution.identity, None);

        let mut headers = HeaderMap::new();
        chain.finish(&resolution, &mut headers).unwrap();
        let set = headers.get(SET_COOKIE).unwrap().to_str().unwrap();
        assert!(set.starts_with("PsCookie=;"));
        assert!(set.ends_with("Max-Age=0"));
    }
}
