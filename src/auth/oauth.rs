//! OAuth login: exchange a provider proof for an identity.
//!
//! # Responsibilities
//! - Define the exchange collaborator contract
//! - Absorb exchange failures into an anonymous resolution
//! - Facebook Graph implementation of the exchange
//!
//! # Design Decisions
//! - The exchange owns its own network timeout
//! - A successful login asks for a cookie refresh so it survives the request

use std::time::Duration;

use async_trait::async_trait;
use axum::http::request::Parts;
use serde::Deserialize;
use std::sync::Arc;
use thiserror::Error;
use url::Url;

use crate::auth::flag::FLAG;
use crate::auth::identity::NAME;
use crate::auth::provider::query_param;
use crate::auth::{Identity, IdentityProvider, Resolution};

/// Flag value selecting the Facebook login provider.
pub const FACEBOOK_FLAG: &str = "PsFacebook";

/// Errors raised by an OAuth exchange.
#[derive(Debug, Error)]
pub enum ExchangeError {
    /// The request carries no authorization code.
    #[error("authorization code missing from request")]
    MissingCode,

    /// Provider answered with an error instead of a token.
    #[error("provider rejected the exchange: {0}")]
    Rejected(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid provider URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Turns the proof carried by a request into a caller identity.
#[async_trait]
pub trait Exchange: Send + Sync {
    async fn exchange(&self, req: &Parts) -> Result<Identity, ExchangeError>;
}

/// Identity provider backed by an OAuth [`Exchange`].
pub struct OAuthProvider {
    name: &'static str,
    exchange: Arc<dyn Exchange>,
}

impl OAuthProvider {
    pub fn new(name: &'static str, exchange: Arc<dyn Exchange>) -> Self {
        Self { name, exchange }
    }
}

#[async_trait]
impl IdentityProvider for OAuthProvider {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn enter(&self, req: &Parts) -> Option<Resolution> {
        match self.exchange.exchange(req).await {
            Ok(identity) => {
                tracing::info!(provider = self.name, urn = %identity.urn(), "Login succeeded");
                Some(Resolution::fresh(identity, self.name))
            }
            Err(e) => {
                tracing::warn!(provider = self.name, error = %e, "Login failed, continuing anonymously");
                Some(Resolution::anonymous(self.name))
            }
        }
    }
}

/// Facebook Graph API code exchange.
pub struct FacebookExchange {
    client: reqwest::Client,
    graph: Url,
    app_id: String,
    app_secret: String,
    redirect_uri: String,
}

#[derive(Deserialize)]
struct AccessToken {
    access_token: Option<String>,
    error: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct Profile {
    id: String,
    name: Option<String>,
}

impl FacebookExchange {
    /// Default Graph API endpoint.
    pub const GRAPH: &'static str = "https://graph.facebook.com/";

    pub fn new(
        graph: &str,
        app_id: impl Into<String>,
        app_secret: impl Into<String>,
        home: &Url,
        timeout: Duration,
    ) -> Result<Self, ExchangeError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            graph: graph_base(graph)?,
            app_id: app_id.into(),
            app_secret: app_secret.into(),
            redirect_uri: login_redirect(home, FACEBOOK_FLAG),
        })
    }

    /// Dialog URL a browser follows to start the login.
    pub fn dialog_url(app_id: &str, home: &Url) -> String {
        let mut url = Url::parse("https://www.facebook.com/dialog/oauth")
            .unwrap_or_else(|_| home.clone());
        url.query_pairs_mut()
            .append_pair("client_id", app_id)
            .append_pair("redirect_uri", &login_redirect(home, FACEBOOK_FLAG));
        url.into()
    }

    async fn token(&self, code: &str) -> Result<String, ExchangeError> {
        let mut url = self.graph.join("oauth/access_token")?;
        url.query_pairs_mut()
            .append_pair("client_id", &self.app_id)
            .append_pair("redirect_uri", &self.redirect_uri)
            .append_pair("client_secret", &self.app_secret)
            .append_pair("code", code);

        let token: AccessToken = self.client.get(url).send().await?.json().await?;
        match (token.access_token, token.error) {
            (Some(token), None) => Ok(token),
            (_, Some(error)) => Err(ExchangeError::Rejected(error.to_string())),
            (None, None) => Err(ExchangeError::Rejected("no access token".into())),
        }
    }

    async fn profile(&self, token: &str) -> Result<Profile, ExchangeError> {
        let mut url = self.graph.join("me")?;
        url.query_pairs_mut()
            .append_pair("access_token", token)
            .append_pair("fields", "id,name");
        let profile = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(profile)
    }
}

#[async_trait]
impl Exchange for FacebookExchange {
    async fn exchange(&self, req: &Parts) -> Result<Identity, ExchangeError> {
        let code = query_param(req, "code").ok_or(ExchangeError::MissingCode)?;
        let token = self.token(&code).await?;
        let profile = self.profile(&token).await?;

        let mut identity = Identity::new(format!("urn:facebook:{}", profile.id));
        if let Some(name) = profile.name {
            identity = identity.with_property(NAME, name);
        }
        Ok(identity)
    }
}

/// Graph base URL with a trailing slash, so relative joins keep a version
/// segment such as `/v2.5`.
fn graph_base(raw: &str) -> Result<Url, url::ParseError> {
    let mut url = Url::parse(raw)?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// `home` with the flag selecting `provider`, used as the OAuth redirect URI.
pub fn login_redirect(home: &Url, provider: &str) -> String {
    let mut url = home.clone();
    url.set_query(None);
    url.query_pairs_mut().append_pair(FLAG, provider);
    url.into()
}
