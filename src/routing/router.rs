//! Route lookup and dispatch.
//!
//! # Responsibilities
//! - Store rules in declaration order
//! - Hand the request to the first rule whose matcher accepts it
//! - Report an explicit no-match
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(n) scan, first match wins, no backtracking into later rules
//! - A router is itself a take, so rules can fork into sub-routers

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::Request;
use axum::response::Response;

use crate::error::DispatchError;
use crate::routing::matcher::Matcher;

/// Something that turns a request into a response.
#[async_trait]
pub trait Take: Send + Sync {
    async fn act(&self, req: Request<Body>) -> Result<Response, DispatchError>;
}

struct FnTake<F>(F);

#[async_trait]
impl<F, Fut> Take for FnTake<F>
where
    F: Fn(Request<Body>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Response, DispatchError>> + Send + 'static,
{
    async fn act(&self, req: Request<Body>) -> Result<Response, DispatchError> {
        (self.0)(req).await
    }
}

/// Wrap an async closure as a take. The closure runs per request, so it can
/// build the real handler from the request it receives.
pub fn take_fn<F, Fut>(f: F) -> Arc<dyn Take>
where
    F: Fn(Request<Body>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Response, DispatchError>> + Send + 'static,
{
    Arc::new(FnTake(f))
}

/// A matcher paired with the take it selects.
pub struct Rule {
    name: &'static str,
    matcher: Box<dyn Matcher>,
    take: Arc<dyn Take>,
}

impl Rule {
    pub fn new(name: &'static str, matcher: impl Matcher + 'static, take: Arc<dyn Take>) -> Self {
        Self {
            name,
            matcher: Box::new(matcher),
            take,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

/// Ordered first-match router.
#[derive(Default)]
pub struct Router {
    rules: Vec<Rule>,
}

impl Router {
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Append a rule. Rules are tried in the order they are added.
    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Rule that would handle `req`.
    pub fn match_request(&self, req: &Request<Body>) -> Option<&Rule> {
        self.rules.iter().find(|rule| rule.matcher.matches(req))
    }

    pub async fn dispatch(&self, req: Request<Body>) -> Result<Response, DispatchError> {
        let Some(rule) = self.match_request(&req) else {
            tracing::debug!(path = %req.uri().path(), "No rule matched");
            return Err(DispatchError::NotFound(req.uri().path().to_string()));
        };
        tracing::trace!(rule = rule.name, path = %req.uri().path(), "Rule matched");
        rule.take.act(req).await
    }
}

#[async_trait]
impl Take for Router {
    async fn act(&self, req: Request<Body>) -> Result<Response, DispatchError> {
        self.dispatch(req).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Identity;
    use crate::routing::matcher::{AnonymousMatcher, AnyMatcher, AuthenticatedMatcher, RegexMatcher};
    use axum::response::IntoResponse;

    fn text(body: &'static str) -> Arc<dyn Take> {
        take_fn(move |_req| async move { Ok(body.into_response()) })
    }

    fn regex(p: &str) -> RegexMatcher {
        RegexMatcher::new(p).unwrap()
    }

    fn router() -> Router {
        Router::new()
            .rule(Rule::new("robots", regex("/robots.txt"), text("R1")))
            .rule(Rule::new("css", regex("/css/.*"), text("R2")))
            .rule(Rule::new(
                "root",
                regex("/"),
                Arc::new(
                    Router::new()
                        .rule(Rule::new("authenticated", AuthenticatedMatcher, text("R3-auth")))
                        .rule(Rule::new("anonymous", AnonymousMatcher, text("R3-anon"))),
                ),
            ))
            .rule(Rule::new("doc", regex("/doc/.*"), text("R4")))
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn body(res: Response) -> String {
        let bytes = axum::body::to_bytes(res.into_body(), 1024).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn test_first_match_only() {
        let router = router();
        let rule = router.match_request(&get("/doc/reports/a.txt")).unwrap();
        assert_eq!(rule.name(), "doc");
        assert_eq!(router.match_request(&get("/robots.txt")).unwrap().name(), "robots");
    }

    #[tokio::test]
    async fn test_nested_fork_on_identity() {
        let router = router();
        assert_eq!(body(router.dispatch(get("/")).await.unwrap()).await, "R3-anon");

        let mut req = get("/");
        req.extensions_mut().insert(Identity::new("urn:test:1"));
        assert_eq!(body(router.dispatch(req).await.unwrap()).await, "R3-auth");
    }

    #[tokio::test]
    async fn test_declaration_order_is_load_bearing() {
        let router = Router::new()
            .rule(Rule::new("catch-all", AnyMatcher, text("any")))
            .rule(Rule::new("robots", regex("/robots.txt"), text("robots")));
        assert_eq!(body(router.dispatch(get("/robots.txt")).await.unwrap()).await, "any");
    }

    #[tokio::test]
    async fn test_no_match_is_not_found() {
        let err = router().dispatch(get("/nowhere")).await.unwrap_err();
        assert!(matches!(err, DispatchError::NotFound(ref p) if p == "/nowhere"));
    }
}
