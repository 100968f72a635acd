//! Route matching logic.
//!
//! # Responsibilities
//! - Match the request path against an anchored regex or a prefix
//! - Match a query parameter value
//! - Match on whether the auth stage attached an identity
//!
//! # Design Decisions
//! - Path regexes must match the whole path, not a substring
//! - Path matching is case-sensitive
//! - Matchers only read the request; they never consume the body

use axum::body::Body;
use axum::http::Request;
use regex::Regex;

use crate::auth::identity_of;

/// Trait for matching requests against conditions.
pub trait Matcher: Send + Sync + std::fmt::Debug {
    /// Returns true if the request matches this condition.
    fn matches(&self, req: &Request<Body>) -> bool;
}

/// Matches the whole request path against a regex.
#[derive(Debug, Clone)]
pub struct RegexMatcher {
    pattern: Regex,
}

impl RegexMatcher {
    /// Compile `pattern`, anchored at both ends.
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(&format!("^(?:{})$", pattern))?,
        })
    }
}

impl Matcher for RegexMatcher {
    fn matches(&self, req: &Request<Body>) -> bool {
        self.pattern.is_match(req.uri().path())
    }
}

/// Matches the request path prefix.
#[derive(Debug, Clone)]
pub struct PathPrefixMatcher {
    prefix: String,
}

impl PathPrefixMatcher {
    /// Create a new path prefix matcher.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl Matcher for PathPrefixMatcher {
    fn matches(&self, req: &Request<Body>) -> bool {
        req.uri().path().starts_with(&self.prefix)
    }
}

/// Matches when a query parameter is present and one of its values fully
/// matches the pattern.
#[derive(Debug, Clone)]
pub struct ParamMatcher {
    name: String,
    pattern: Regex,
}

impl ParamMatcher {
    pub fn new(name: impl Into<String>, pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            name: name.into(),
            pattern: Regex::new(&format!("^(?:{})$", pattern))?,
        })
    }
}

impl Matcher for ParamMatcher {
    fn matches(&self, req: &Request<Body>) -> bool {
        let Some(query) = req.uri().query() else {
            return false;
        };
        url::form_urlencoded::parse(query.as_bytes())
            .any(|(key, value)| key == self.name.as_str() && self.pattern.is_match(&value))
    }
}

/// Matches requests carrying a resolved identity.
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthenticatedMatcher;

impl Matcher for AuthenticatedMatcher {
    fn matches(&self, req: &Request<Body>) -> bool {
        identity_of(req).is_some()
    }
}

/// Matches requests without a resolved identity.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnonymousMatcher;

impl Matcher for AnonymousMatcher {
    fn matches(&self, req: &Request<Body>) -> bool {
        identity_of(req).is_none()
    }
}

/// Matches everything. Used for catch-all rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnyMatcher;

impl Matcher for AnyMatcher {
    fn matches(&self, _req: &Request<Body>) -> bool {
        true
    }
}
