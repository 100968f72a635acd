//! Identity persisted in a cookie.

use async_trait::async_trait;
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderValue};

use crate::auth::{CookieDirective, Identity, IdentityProvider, Resolution};
use crate::codec::{CodecError, TokenCodec};

/// Default cookie name. Changing it logs everybody out.
pub const DEFAULT_COOKIE: &str = "PsCookie";

/// Cookie attributes applied when the token is (re)issued.
#[derive(Debug, Clone)]
pub struct CookieSettings {
    pub name: String,
    pub max_age_secs: u64,
    pub secure: bool,
}

impl Default for CookieSettings {
    fn default() -> Self {
        Self {
            name: DEFAULT_COOKIE.to_string(),
            max_age_secs: 30 * 24 * 60 * 60,
            secure: false,
        }
    }
}

/// Reads the identity from the token cookie and writes it back on refresh.
pub struct CookieProvider {
    codec: TokenCodec,
    settings: CookieSettings,
}

impl CookieProvider {
    pub fn new(codec: TokenCodec, settings: CookieSettings) -> Self {
        Self { codec, settings }
    }

    /// `Set-Cookie` value carrying `identity`.
    pub fn issue(&self, identity: &Identity) -> Result<String, CodecError> {
        let token = String::from_utf8_lossy(&self.codec.encode(identity)?).into_owned();
        Ok(self.format(&token, self.settings.max_age_secs))
    }

    /// `Set-Cookie` value expiring the cookie.
    pub fn expire(&self) -> String {
        self.format("", 0)
    }

    fn format(&self, value: &str, max_age: u64) -> String {
        let secure_flag = if self.settings.secure { " Secure;" } else { "" };
        format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax;{} Max-Age={}",
            self.settings.name, value, secure_flag, max_age
        )
    }
}

#[async_trait]
impl IdentityProvider for CookieProvider {
    fn name(&self) -> &'static str {
        "cookie"
    }

    async fn enter(&self, req: &Parts) -> Option<Resolution> {
        let token = read_cookie(&req.headers, &self.settings.name)?;
        let identity = self.codec.decode(token.as_bytes())?;
        Some(Resolution::known(identity, self.name()))
    }

    fn exit(&self, resolution: &Resolution, headers: &mut HeaderMap) -> Result<(), CodecError> {
        let cookie = match (resolution.cookie, &resolution.identity) {
            (CookieDirective::Refresh, Some(identity)) => self.issue(identity)?,
            (CookieDirective::Refresh, None) | (CookieDirective::Clear, _) => self.expire(),
            (CookieDirective::Keep, _) => return Ok(()),
        };
        // Name is validated at startup and the token is hex, so this only
        // fails on a misconfigured name.
        match HeaderValue::from_str(&cookie) {
            Ok(value) => {
                headers.append(SET_COOKIE, value);
            }
            Err(e) => tracing::error!(error = %e, "Identity cookie is not a valid header value"),
        }
        Ok(())
    }
}

/// Value of the named cookie across all `Cookie` headers. Empty values count
/// as absent.
pub fn read_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .flat_map(|h| h.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::token_codec;
    use axum::http::Request;

    fn provider() -> CookieProvider {
        CookieProvider::new(token_codec("key"), CookieSettings::default())
    }

    fn parts(cookie: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/");
        if let Some(c) = cookie {
            builder = builder.header(COOKIE, c);
        }
        builder.body(()).unwrap().into_parts().0
    }

    fn token_from(set_cookie: &str) -> String {
        let pair = set_cookie.split(';').next().unwrap();
        pair.split_once('=').unwrap().1.to_string()
    }

    #[tokio::test]
    async fn test_reads_issued_cookie() {
        let p = provider();
        let identity = Identity::new("urn:test:5").with_property("name", "Maude");
        let token = token_from(&p.issue(&identity).unwrap());
        let req = parts(Some(&format!("other=1; PsCookie={}", token)));
        let resolution = p.enter(&req).await.unwrap();
        assert_eq!(resolution, Resolution::known(identity, "cookie"));
    }

    #[tokio::test]
    async fn test_missing_or_garbage_cookie_skips() {
        let p = provider();
        assert!(p.enter(&parts(None)).await.is_none());
        assert!(p.enter(&parts(Some("PsCookie="))).await.is_none());
        assert!(p.enter(&parts(Some("PsCookie=deadbeef"))).await.is_none());
        assert!(p.enter(&parts(Some("PsCookie=%%%"))).await.is_none());
    }

    #[test]
    fn test_exit_directives() {
        let p = provider();
        let identity = Identity::new("urn:test:5");

        let mut headers = HeaderMap::new();
        p.exit(&Resolution::known(identity.clone(), "cookie"), &mut headers).unwrap();
        assert!(headers.get(SET_COOKIE).is_none());

        p.exit(&Resolution::fresh(identity, "PsFacebook"), &mut headers).unwrap();
        let value = headers.get(SET_COOKIE).unwrap().to_str().unwrap();
        assert!(value.starts_with("PsCookie="));
        assert!(value.contains("HttpOnly"));
        assert!(value.ends_with("Max-Age=2592000"));

        let mut headers = HeaderMap::new();
        p.exit(&Resolution::logged_out("logout"), &mut headers).unwrap();
        assert_eq!(
            headers.get(SET_COOKIE).unwrap(),
            "PsCookie=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0"
        );
    }

    #[test]
    fn test_secure_flag() {
        let p = CookieProvider::new(
            token_codec("key"),
            CookieSettings {
                secure: true,
                ..CookieSettings::default()
            },
        );
        assert_eq!(p.expire(), "PsCookie=; Path=/; HttpOnly; SameSite=Lax; Secure; Max-Age=0");
    }

    #[test]
    fn test_read_cookie_multiple_headers() {
        let mut headers = HeaderMap::new();
        headers.append(COOKIE, HeaderValue::from_static("a=1"));
        headers.append(COOKIE, HeaderValue::from_static("b=2; PsCookie=abc"));
        assert_eq!(read_cookie(&headers, "PsCookie"), Some("abc"));
        assert_eq!(read_cookie(&headers, "c"), None);
    }
}
