//! Identity provider contract.

use async_trait::async_trait;
use axum::http::request::Parts;
use axum::http::HeaderMap;

use crate::auth::Identity;
use crate::codec::CodecError;

/// What the response should do with the persistent identity cookie.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CookieDirective {
    /// Leave the client's cookie as it is.
    Keep,
    /// Re-issue the cookie for the resolved identity.
    Refresh,
    /// Expire the cookie.
    Clear,
}

/// Outcome of resolving one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Caller identity; `None` means anonymous.
    pub identity: Option<Identity>,
    /// Name of the provider that settled the request.
    pub source: &'static str,
    pub cookie: CookieDirective,
}

impl Resolution {
    /// Anonymous, nothing to change on the client.
    pub fn anonymous(source: &'static str) -> Self {
        Self {
            identity: None,
            source,
            cookie: CookieDirective::Keep,
        }
    }

    /// Identity recovered from state the client already holds.
    pub fn known(identity: Identity, source: &'static str) -> Self {
        Self {
            identity: Some(identity),
            source,
            cookie: CookieDirective::Keep,
        }
    }

    /// Identity freshly established by this request; persist it.
    pub fn fresh(identity: Identity, source: &'static str) -> Self {
        Self {
            identity: Some(identity),
            source,
            cookie: CookieDirective::Refresh,
        }
    }

    /// Anonymous, and drop whatever the client holds.
    pub fn logged_out(source: &'static str) -> Self {
        Self {
            identity: None,
            source,
            cookie: CookieDirective::Clear,
        }
    }
}

/// One strategy for finding out who is calling.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Stable provider name, used in logs and for flag selection.
    fn name(&self) -> &'static str;

    /// Try to settle the request.
    ///
    /// `None` means this provider does not apply and the next one should be
    /// asked; `Some` ends resolution, even when it carries no identity.
    async fn enter(&self, req: &Parts) -> Option<Resolution>;

    /// Adjust response headers once the request has been handled.
    fn exit(&self, _resolution: &Resolution, _headers: &mut HeaderMap) -> Result<(), CodecError> {
        Ok(())
    }
}

/// Value of a query parameter, if present.
pub(crate) fn query_param(req: &Parts, name: &str) -> Option<String> {
    let query = req.uri.query()?;
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}
