//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the front door.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Identity resolution and cookie settings.
    pub auth: AuthConfig,

    /// Static asset locations.
    pub assets: AssetsConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Request size limits.
    pub limits: LimitsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Identity resolution configuration.
#[derive(Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Force the fixed bypass identity for every request.
    pub bypass: bool,

    /// URN of the bypass identity.
    pub bypass_urn: String,

    /// Facebook application id.
    pub facebook_id: String,

    /// Facebook application secret.
    pub facebook_secret: String,

    /// Facebook Graph API base URL.
    pub facebook_graph: String,

    /// Key masking the identity cookie. Changing it logs everybody out.
    pub security_key: String,

    /// Public base URL of the site, used for OAuth redirect URIs.
    pub home: String,

    /// Name of the identity cookie.
    pub cookie_name: String,

    /// Lifetime of the identity cookie in seconds.
    pub cookie_max_age_secs: u64,

    /// Add the `Secure` attribute to the identity cookie.
    pub cookie_secure: bool,

    /// Timeout for the OAuth exchange in seconds.
    pub oauth_timeout_secs: u64,
}

impl AuthConfig {
    /// Bypass is on when asked for, or when the OAuth client id was never
    /// filled in (a build placeholder).
    pub fn bypass_active(&self) -> bool {
        self.bypass
            || self.facebook_id.starts_with("XXXX")
            || self.facebook_id.starts_with("${")
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            bypass: false,
            bypass_urn: "urn:test:1".to_string(),
            facebook_id: "XXXX".to_string(),
            facebook_secret: String::new(),
            facebook_graph: "https://graph.facebook.com/".to_string(),
            security_key: String::new(),
            home: "http://localhost:8080/".to_string(),
            cookie_name: "PsCookie".to_string(),
            cookie_max_age_secs: 30 * 24 * 60 * 60,
            cookie_secure: false,
            oauth_timeout_secs: 10,
        }
    }
}

// Secrets stay out of debug output.
impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("bypass", &self.bypass)
            .field("bypass_urn", &self.bypass_urn)
            .field("facebook_id", &self.facebook_id)
            .field("facebook_graph", &self.facebook_graph)
            .field("home", &self.home)
            .field("cookie_name", &self.cookie_name)
            .field("cookie_max_age_secs", &self.cookie_max_age_secs)
            .field("cookie_secure", &self.cookie_secure)
            .field("oauth_timeout_secs", &self.oauth_timeout_secs)
            .finish_non_exhaustive()
    }
}

/// Static asset configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AssetsConfig {
    /// Directory holding `css/` and `xsl/`.
    pub root: String,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            root: "./assets".to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Request size limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum document body in bytes.
    pub max_body_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: 10 * 1024 * 1024,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
