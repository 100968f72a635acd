//! Identity resolution subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request
//!     → Auth stage splits off request head
//!     → chain.rs asks providers in order:
//!         bypass.rs  (fixed identity, configuration-gated)
//!         flag.rs    (?PsByFlag=... → oauth.rs | logout.rs)
//!         cookie.rs  (token cookie → codec pipeline)
//!     → Identity attached to request extensions
//!     → wrapped take runs
//!     → chain exit: cookie.rs refreshes or expires the token cookie
//! ```
//!
//! # Design Decisions
//! - Providers are built once at startup and shared read-only
//! - Known failures (bad cookie, failed login) resolve to anonymous, never error
//! - Only a fresh login or a logout touches the cookie

pub mod bypass;
pub mod chain;
pub mod cookie;
pub mod flag;
pub mod identity;
pub mod logout;
pub mod oauth;
pub mod provider;

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::Request;
use axum::response::Response;

use crate::error::DispatchError;
use crate::routing::Take;

pub use bypass::BypassProvider;
pub use chain::Chain;
pub use cookie::{CookieProvider, CookieSettings};
pub use flag::{FlagProvider, FLAG};
pub use identity::{identity_of, Identity};
pub use logout::{LogoutProvider, LOGOUT_FLAG};
pub use oauth::{Exchange, ExchangeError, FacebookExchange, OAuthProvider, FACEBOOK_FLAG};
pub use provider::{CookieDirective, IdentityProvider, Resolution};

/// Resolves the caller before `inner` runs and applies the cookie outcome to
/// its response.
pub struct Auth {
    inner: Arc<dyn Take>,
    chain: Arc<Chain>,
}

impl Auth {
    pub fn new(inner: Arc<dyn Take>, chain: Arc<Chain>) -> Self {
        Self { inner, chain }
    }
}

#[async_trait]
impl Take for Auth {
    async fn act(&self, req: Request<Body>) -> Result<Response, DispatchError> {
        let (mut parts, body) = req.into_parts();
        let resolution = self.chain.resolve(&parts).await;

        parts.extensions.remove::<Identity>();
        if let Some(identity) = &resolution.identity {
            parts.extensions.insert(identity.clone());
        }

        let mut response = self.inner.act(Request::from_parts(parts, body)).await?;
        self.chain.finish(&resolution, response.headers_mut())?;
        Ok(response)
    }
}
