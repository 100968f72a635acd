//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, cookie lifetime > 0)
//! - Check that addresses and URLs parse
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::AppConfig;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid bind address: {0}")]
    BindAddress(String),

    #[error("invalid metrics address: {0}")]
    MetricsAddress(String),

    #[error("auth.security_key must not be empty")]
    EmptySecurityKey,

    #[error("auth.bypass_urn must not be empty")]
    EmptyBypassUrn,

    #[error("auth.cookie_name must be a plain token: {0:?}")]
    CookieName(String),

    #[error("auth.cookie_max_age_secs must be positive")]
    ZeroCookieAge,

    #[error("invalid URL in {field}: {value}")]
    Url { field: &'static str, value: String },

    #[error("auth.facebook_secret is required when bypass is off")]
    MissingOAuthSecret,

    #[error("timeouts.request_secs must be positive")]
    ZeroRequestTimeout,

    #[error("auth.oauth_timeout_secs must be positive")]
    ZeroOAuthTimeout,
}

pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }

    let obs = &config.observability;
    if obs.metrics_enabled && obs.metrics_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::MetricsAddress(obs.metrics_address.clone()));
    }

    let auth = &config.auth;
    if auth.security_key.is_empty() {
        errors.push(ValidationError::EmptySecurityKey);
    }
    if auth.bypass_active() && auth.bypass_urn.is_empty() {
        errors.push(ValidationError::EmptyBypassUrn);
    }
    if !is_token(&auth.cookie_name) {
        errors.push(ValidationError::CookieName(auth.cookie_name.clone()));
    }
    if auth.cookie_max_age_secs == 0 {
        errors.push(ValidationError::ZeroCookieAge);
    }
    for (field, value) in [("auth.home", &auth.home), ("auth.facebook_graph", &auth.facebook_graph)] {
        if Url::parse(value).is_err() {
            errors.push(ValidationError::Url {
                field,
                value: value.clone(),
            });
        }
    }
    if !auth.bypass_active() && auth.facebook_secret.is_empty() {
        errors.push(ValidationError::MissingOAuthSecret);
    }
    if auth.oauth_timeout_secs == 0 {
        errors.push(ValidationError::ZeroOAuthTimeout);
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroRequestTimeout);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn is_token(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> AppConfig {
        let mut config = AppConfig::default();
        config.auth.security_key = "key".into();
        config
    }

    #[test]
    fn test_defaults_with_key_are_valid() {
        assert_eq!(validate_config(&valid()), Ok(()));
    }

    #[test]
    fn test_collects_every_error() {
        let mut config = AppConfig::default();
        config.listener.bind_address = "nowhere".into();
        config.auth.cookie_name = "bad name;".into();
        config.timeouts.request_secs = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors.contains(&ValidationError::EmptySecurityKey));
        assert!(errors.contains(&ValidationError::ZeroRequestTimeout));
    }

    #[test]
    fn test_oauth_needs_secret() {
        let mut config = valid();
        config.auth.facebook_id = "1234".into();
        assert_eq!(
            validate_config(&config),
            Err(vec![ValidationError::MissingOAuthSecret])
        );
        config.auth.facebook_secret = "shh".into();
        assert_eq!(validate_config(&config), Ok(()));
    }

    #[test]
    fn test_bad_home_url() {
        let mut config = valid();
        config.auth.home = "not a url".into();
        let errors = validate_config(&config).unwrap_err();
        assert!(matches!(errors[0], ValidationError::Url { field: "auth.home", .. }));
    }
}
