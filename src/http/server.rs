//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router that feeds every request to the fallback-wrapped app
//! - Wire up middleware (tracing, timeout, request ID)
//! - Serve on a listener until shutdown is signalled

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::Response,
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultOnFailure, TraceLayer};
use tracing::Level;

use crate::config::AppConfig;
use crate::fallback::Fallback;
use crate::http::request::RequestIdLayer;

/// HTTP server for the document front door.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server around the composed application.
    pub fn new(config: &AppConfig, app: Arc<Fallback>) -> Self {
        let router = Self::build_router(config, app);
        Self { router }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &AppConfig, app: Arc<Fallback>) -> Router {
        Router::new()
            .route("/{*path}", any(app_handler))
            .route("/", any(app_handler))
            .with_state(app)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(
                // The fallback already logs every failure it renders.
                TraceLayer::new_for_http().on_failure(DefaultOnFailure::new().level(Level::DEBUG)),
            )
            .layer(RequestIdLayer)
    }

    /// The Axum router, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Every path lands here; the app does its own routing.
async fn app_handler(State(app): State<Arc<Fallback>>, request: Request<Body>) -> Response {
    app.handle(request).await
}
