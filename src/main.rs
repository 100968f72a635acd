//! Document front door.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────▶ http server (request id, timeout, trace)
//!                     │
//!                     ▼
//!                 fallback ── error / panic ──▶ diagnostic page
//!                     │
//!                     ▼
//!                 auth chain: bypass → flag (oauth | logout) → cookie
//!                     │
//!                     ▼
//!                 router: flag redirect, assets, robots, / fork, /doc, 404
//!                     │
//!                     ▼
//!                 document base
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use deskgate::app;
use deskgate::config::load_config;
use deskgate::docs::MemoryBase;
use deskgate::http::HttpServer;
use deskgate::lifecycle::{signals, Shutdown};
use deskgate::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "deskgate")]
#[command(about = "Authenticating front door for a personal document store", long_about = None)]
struct Cli {
    /// TOML configuration file; defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Validate the configuration and exit.
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    if cli.check {
        println!("configuration OK");
        return Ok(());
    }

    logging::init(&config.observability)?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "deskgate starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        bypass = config.auth.bypass_active(),
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let exchange = Arc::new(app::facebook_exchange(&config)?);
    let application = app::build(&config, Arc::new(MemoryBase::new()), exchange)?;

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let receiver = shutdown.subscribe();
    tokio::spawn(signals::shutdown_on_signal(shutdown));

    let server = HttpServer::new(&config, Arc::new(application));
    server.run(listener, receiver).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
