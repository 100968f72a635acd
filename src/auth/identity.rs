//! Resolved caller identity.

use std::collections::BTreeMap;

use axum::body::Body;
use axum::http::Request;

/// Property key holding the display name.
pub const NAME: &str = "name";

/// A resolved caller: a URN plus free-form properties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    urn: String,
    properties: BTreeMap<String, String>,
}

impl Identity {
    pub fn new(urn: impl Into<String>) -> Self {
        Self {
            urn: urn.into(),
            properties: BTreeMap::new(),
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn urn(&self) -> &str {
        &self.urn
    }

    /// Display name, when the provider supplied one.
    pub fn name(&self) -> Option<&str> {
        self.properties.get(NAME).map(String::as_str)
    }

    pub fn properties(&self) -> impl Iterator<Item = (&str, &str)> {
        self.properties
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Identity attached to the request by the auth stage, if any.
pub fn identity_of(req: &Request<Body>) -> Option<&Identity> {
    req.extensions().get::<Identity>()
}
