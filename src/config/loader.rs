//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::AppConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable overriding `auth.security_key`.
pub const ENV_SECURITY_KEY: &str = "DESKGATE_SECURITY_KEY";
/// Environment variable overriding `auth.facebook_id`.
pub const ENV_FACEBOOK_ID: &str = "DESKGATE_FACEBOOK_ID";
/// Environment variable overriding `auth.facebook_secret`.
pub const ENV_FACEBOOK_SECRET: &str = "DESKGATE_FACEBOOK_SECRET";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load, apply environment overrides and validate configuration.
///
/// Without a path the defaults are used.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut config = match path {
        Some(path) => parse_config(&fs::read_to_string(path)?)?,
        None => AppConfig::default(),
    };
    apply_env(&mut config, |key| std::env::var(key).ok());

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

pub fn parse_config(content: &str) -> Result<AppConfig, ConfigError> {
    Ok(toml::from_str(content)?)
}

/// Overlay secrets from the environment; empty values are ignored.
pub fn apply_env(config: &mut AppConfig, lookup: impl Fn(&str) -> Option<String>) {
    let targets = [
        (ENV_SECURITY_KEY, &mut config.auth.security_key),
        (ENV_FACEBOOK_ID, &mut config.auth.facebook_id),
        (ENV_FACEBOOK_SECRET, &mut config.auth.facebook_secret),
    ];
    for (key, field) in targets {
        if let Some(value) = lookup(key).filter(|v| !v.is_empty()) {
            tracing::debug!(variable = key, "Configuration overridden from environment");
            *field = value;
        }
    }
}
