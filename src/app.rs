//! Application assembly.
//!
//! # Data Flow
//! ```text
//! request
//!     → Fallback (catches errors and panics)
//!     → Auth (identity chain, cookie on the way out)
//!     → Router, first match wins:
//!         ?PsByFlag=...   → 303 to "/"
//!         /xsl/*          → assets, text/xsl
//!         /css/*          → assets, text/css
//!         /robots.txt     → empty text
//!         /               → documents list | landing page
//!         /doc/*          → document (secure)
//!         anything else   → 404
//! ```
//!
//! # Design Decisions
//! - The login return URL carries the flag, so after the chain has consumed
//!   it the redirect rule strips it from the address bar
//! - The document base and the OAuth exchange are injected so tests can run
//!   the whole stack in process

use std::sync::Arc;
use std::time::Duration;

use axum::response::Response;
use thiserror::Error;
use url::Url;

use crate::auth::{
    Auth, BypassProvider, Chain, CookieProvider, CookieSettings, Exchange, FacebookExchange,
    FlagProvider, Identity, LogoutProvider, OAuthProvider, FACEBOOK_FLAG, FLAG, LOGOUT_FLAG,
};
use crate::codec::token_codec;
use crate::config::AppConfig;
use crate::docs::{Base, DocTake, DocsTake, IndexTake, DOC_PREFIX};
use crate::error::DispatchError;
use crate::fallback::Fallback;
use crate::routing::matcher::{
    AnonymousMatcher, AnyMatcher, AuthenticatedMatcher, ParamMatcher, PathPrefixMatcher,
    RegexMatcher,
};
use crate::routing::takes::{Files, Redirect, Secure, Text, WithType};
use crate::routing::{take_fn, Router, Rule, Take};

/// Failure to assemble the application from its configuration.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("invalid route pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("invalid home URL: {0}")]
    Home(#[from] url::ParseError),

    #[error("cannot set up OAuth exchange: {0}")]
    Exchange(#[from] crate::auth::ExchangeError),
}

/// Build the Facebook exchange described by `config`.
pub fn facebook_exchange(config: &AppConfig) -> Result<FacebookExchange, BuildError> {
    let auth = &config.auth;
    Ok(FacebookExchange::new(
        &auth.facebook_graph,
        auth.facebook_id.clone(),
        auth.facebook_secret.clone(),
        &Url::parse(&auth.home)?,
        Duration::from_secs(auth.oauth_timeout_secs),
    )?)
}

/// Provider chain: bypass, then the flag-selected providers, then the cookie.
pub fn chain(config: &AppConfig, exchange: Arc<dyn Exchange>) -> Chain {
    let auth = &config.auth;
    let bypass = BypassProvider::new(auth.bypass_active(), Identity::new(auth.bypass_urn.clone()));
    let flag = FlagProvider::new()
        .with(FACEBOOK_FLAG, OAuthProvider::new("facebook", exchange))
        .with(LOGOUT_FLAG, LogoutProvider);
    let cookie = CookieProvider::new(
        token_codec(&auth.security_key),
        CookieSettings {
            name: auth.cookie_name.clone(),
            max_age_secs: auth.cookie_max_age_secs,
            secure: auth.cookie_secure,
        },
    );
    Chain::new().with(bypass).with(flag).with(cookie)
}

/// Ordered route table.
pub fn router(config: &AppConfig, base: Arc<dyn Base>) -> Result<Router, BuildError> {
    let home = Url::parse(&config.auth.home)?;
    let root = config.assets.root.as_str();

    let fork = Router::new()
        .rule(Rule::new(
            "documents",
            AuthenticatedMatcher,
            Arc::new(DocsTake::new(base.clone())),
        ))
        .rule(Rule::new(
            "landing",
            AnonymousMatcher,
            Arc::new(IndexTake::new(FacebookExchange::dialog_url(
                &config.auth.facebook_id,
                &home,
            ))),
        ));

    let doc: Arc<dyn Take> = Arc::new(DocTake::new(base, config.limits.max_body_bytes));

    Ok(Router::new()
        .rule(Rule::new(
            "flag-redirect",
            ParamMatcher::new(FLAG, ".+")?,
            Arc::new(Redirect::default()),
        ))
        .rule(Rule::new(
            "xsl",
            RegexMatcher::new("/xsl/.*")?,
            Arc::new(WithType::new(Arc::new(Files::new(root)), "text/xsl")),
        ))
        .rule(Rule::new(
            "css",
            RegexMatcher::new("/css/.*")?,
            Arc::new(WithType::new(Arc::new(Files::new(root)), "text/css")),
        ))
        .rule(Rule::new(
            "robots",
            RegexMatcher::new("/robots\\.txt")?,
            Arc::new(Text::new("")),
        ))
        .rule(Rule::new("root", RegexMatcher::new("/")?, Arc::new(fork)))
        .rule(Rule::new(
            "doc",
            PathPrefixMatcher::new(DOC_PREFIX),
            Arc::new(Secure::new(doc)),
        ))
        .rule(Rule::new(
            "not-found",
            AnyMatcher,
            take_fn(|req| async move {
                Err::<Response, _>(DispatchError::NotFound(req.uri().path().to_string()))
            }),
        )))
}

/// Compose the whole application: fallback around auth around the router.
pub fn build(
    config: &AppConfig,
    base: Arc<dyn Base>,
    exchange: Arc<dyn Exchange>,
) -> Result<Fallback, BuildError> {
    let router = router(config, base)?;
    let chain = Arc::new(chain(config, exchange));
    tracing::info!(
        bypass = config.auth.bypass_active(),
        assets = %config.assets.root,
        "Application assembled"
    );
    Ok(Fallback::new(Arc::new(Auth::new(Arc::new(router), chain))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;

    fn config() -> AppConfig {
        let mut config = AppConfig::default();
        config.auth.security_key = "key".into();
        config
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[test]
    fn test_rule_order() {
        let router = router(&config(), Arc::new(crate::docs::MemoryBase::new())).unwrap();
        let name = |uri: &str| router.match_request(&get(uri)).map(Rule::name);

        assert_eq!(name("/css/a.css?PsByFlag=PsLogout"), Some("flag-redirect"));
        assert_eq!(name("/xsl/layout.xsl"), Some("xsl"));
        assert_eq!(name("/css/main.css"), Some("css"));
        assert_eq!(name("/robots.txt"), Some("robots"));
        assert_eq!(name("/"), Some("root"));
        assert_eq!(name("/doc/readme"), Some("doc"));
        assert_eq!(name("/docs"), Some("not-found"));
        assert_eq!(name("/?PsByFlag="), Some("root"));
    }

    #[test]
    fn test_bad_home() {
        let mut config = config();
        config.auth.home = "::".into();
        let base = Arc::new(crate::docs::MemoryBase::new());
        assert!(matches!(router(&config, base), Err(BuildError::Home(_))));
    }
}
