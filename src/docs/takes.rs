//! Takes backed by the document base.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use axum::http::{HeaderMap, Method, Request, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::auth::{identity_of, FLAG, LOGOUT_FLAG};
use crate::docs::Base;
use crate::error::DispatchError;
use crate::http::response::{escape, page};
use crate::routing::Take;

/// Path prefix of document routes.
pub const DOC_PREFIX: &str = "/doc/";

fn urn_of(req: &Request<Body>) -> Result<String, DispatchError> {
    identity_of(req)
        .map(|identity| identity.urn().to_string())
        .ok_or_else(|| DispatchError::Handler("document route reached without identity".into()))
}

/// Landing page for anonymous visitors.
pub struct IndexTake {
    login_url: String,
}

impl IndexTake {
    pub fn new(login_url: impl Into<String>) -> Self {
        Self {
            login_url: login_url.into(),
        }
    }
}

#[async_trait]
impl Take for IndexTake {
    async fn act(&self, _req: Request<Body>) -> Result<Response, DispatchError> {
        let body = format!(
            "<h1>deskgate</h1>\n<p><a href=\"{}\">Log in with Facebook</a></p>",
            escape(&self.login_url)
        );
        Ok(page("deskgate", &body).into_response())
    }
}

/// Document listing for the logged-in caller.
pub struct DocsTake {
    base: Arc<dyn Base>,
}

impl DocsTake {
    pub fn new(base: Arc<dyn Base>) -> Self {
        Self { base }
    }
}

#[async_trait]
impl Take for DocsTake {
    async fn act(&self, req: Request<Body>) -> Result<Response, DispatchError> {
        let identity = identity_of(&req)
            .cloned()
            .ok_or_else(|| DispatchError::Handler("listing reached without identity".into()))?;
        let docs = self.base.user(identity.urn()).await?.docs().await?;

        let mut body = format!(
            "<h1>{}</h1>\n<p><a href=\"/?{}={}\">Log out</a></p>\n<ul>\n",
            escape(identity.name().unwrap_or(identity.urn())),
            FLAG,
            LOGOUT_FLAG
        );
        for name in &docs {
            body.push_str(&format!(
                "<li><a href=\"{}{}\">{}</a></li>\n",
                DOC_PREFIX,
                urlencoding::encode(name),
                escape(name)
            ));
        }
        body.push_str("</ul>");
        Ok(page("Documents", &body).into_response())
    }
}

/// Read, write and delete one document of the logged-in caller.
///
/// Reads the whole request body before touching storage.
pub struct DocTake {
    base: Arc<dyn Base>,
    max_body_bytes: usize,
}

impl DocTake {
    pub fn new(base: Arc<dyn Base>, max_body_bytes: usize) -> Self {
        Self {
            base,
            max_body_bytes,
        }
    }
}

#[async_trait]
impl Take for DocTake {
    async fn act(&self, req: Request<Body>) -> Result<Response, DispatchError> {
        let urn = urn_of(&req)?;
        let raw = req
            .uri()
            .path()
            .strip_prefix(DOC_PREFIX)
            .ok_or_else(|| DispatchError::NotFound(req.uri().path().to_string()))?;
        let name = urlencoding::decode(raw)
            .map_err(|e| DispatchError::BadRequest(format!("document name: {}", e)))?
            .into_owned();
        let method = req.method().clone();

        enforce_body_limit(req.headers(), self.max_body_bytes)?;
        let limit = self.max_body_bytes;
        let content = axum::body::to_bytes(req.into_body(), limit)
            .await
            .map_err(|e| {
                if e.to_string().contains("length limit") {
                    DispatchError::PayloadTooLarge(limit)
                } else {
                    DispatchError::BadRequest(format!("request body: {}", e))
                }
            })?;

        let user = self.base.user(&urn).await?;
        match method {
            Method::GET | Method::HEAD => {
                let doc = user.read(&name).await?;
                Ok(([(CONTENT_TYPE, "application/octet-stream")], doc).into_response())
            }
            Method::PUT | Method::POST => {
                tracing::info!(urn = %urn, doc = %name, size = content.len(), "Document written");
                user.write(&name, content).await?;
                Ok(StatusCode::NO_CONTENT.into_response())
            }
            Method::DELETE => {
                user.delete(&name).await?;
                tracing::info!(urn = %urn, doc = %name, "Document deleted");
                Ok(StatusCode::NO_CONTENT.into_response())
            }
            _ => Ok(StatusCode::METHOD_NOT_ALLOWED.into_response()),
        }
    }
}

/// Reject a declared body larger than `max_body_bytes` before reading it.
fn enforce_body_limit(headers: &HeaderMap, max_body_bytes: usize) -> Result<(), DispatchError> {
    let Some(value) = headers.get(CONTENT_LENGTH) else {
        return Ok(());
    };
    let length = value
        .to_str()
        .ok()
        .and_then(|raw| raw.parse::<usize>().ok())
        .ok_or_else(|| DispatchError::BadRequest("invalid content-length".into()))?;
    if length > max_body_bytes {
        return Err(DispatchError::PayloadTooLarge(max_body_bytes));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Identity;
    use crate::docs::MemoryBase;

    fn request(method: Method, uri: &str, body: &'static str) -> Request<Body> {
        let mut req = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::from(body))
            .unwrap();
        req.extensions_mut()
            .insert(Identity::new("urn:test:1").with_property("name", "Bunny"));
        req
    }

    async fn text(res: Response) -> String {
        let bytes = axum::body::to_bytes(res.into_body(), 64 * 1024).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_write_read_list_delete() {
        let base: Arc<dyn Base> = Arc::new(MemoryBase::new());
        let doc = DocTake::new(base.clone(), 1024);
        let docs = DocsTake::new(base);

        let res = doc.act(request(Method::PUT, "/doc/my%20notes.txt", "hi")).await.unwrap();
        assert_eq!(res.status(), StatusCode::NO_CONTENT);

        let res = doc.act(request(Method::GET, "/doc/my%20notes.txt", "")).await.unwrap();
        assert_eq!(text(res).await, "hi");

        let listing = text(docs.act(request(Method::GET, "/", "")).await.unwrap()).await;
        assert!(listing.contains("<h1>Bunny</h1>"));
        assert!(listing.contains("href=\"/doc/my%20notes.txt\">my notes.txt</a>"));
        assert!(listing.contains("/?PsByFlag=PsLogout"));

        let res = doc.act(request(Method::DELETE, "/doc/my%20notes.txt", "")).await.unwrap();
        assert_eq!(res.status(), StatusCode::NO_CONTENT);
        let err = doc.act(request(Method::GET, "/doc/my%20notes.txt", "")).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_body_limit() {
        let doc = DocTake::new(Arc::new(MemoryBase::new()), 4);
        let err = doc
            .act(request(Method::PUT, "/doc/big.txt", "too large"))
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::PayloadTooLarge(4)));
        assert_eq!(err.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_declared_length_checked_before_reading() {
        let doc = DocTake::new(Arc::new(MemoryBase::new()), 4);

        let mut req = request(Method::PUT, "/doc/big.txt", "");
        req.headers_mut().insert(CONTENT_LENGTH, "1000".parse().unwrap());
        let err = doc.act(req).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::PAYLOAD_TOO_LARGE);

        let mut req = request(Method::PUT, "/doc/big.txt", "");
        req.headers_mut().insert(CONTENT_LENGTH, "lots".parse().unwrap());
        let err = doc.act(req).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_index_links_login() {
        let index = IndexTake::new("https://login.example/?a=1&b=2");
        let html = text(index.act(request(Method::GET, "/", "")).await.unwrap()).await;
        assert!(html.contains("href=\"https://login.example/?a=1&amp;b=2\""));
    }
}
