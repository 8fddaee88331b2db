//! login-guard
//!
//! An HTTP login endpoint that throttles and temporarily bans callers who keep
//! failing authentication.
//!
//! # Architecture Overview
//!
//! ```text
//!     POST /login
//!     ─────────────▶ ┌─────────┐   banned?   ┌──────────────────┐
//!                    │  http   │────────────▶│   login_guard    │
//!                    │ server  │             └────────┬─────────┘
//!                    └─────────┘                      │
//!                         ▲                           ▼
//!     302 / 429           │               ┌──────────────────────┐
//!     ◀───────────────────┘               │   attempt_tracker    │
//!                                         │ per-IP window + ban  │
//!                                         └──────────────────────┘
//!
//!     Cross-cutting: config (+ hot reload), observability, lifecycle, admin
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use login_guard::config::{load_config, watcher::ConfigWatcher, GuardConfig};
use login_guard::http::HttpServer;
use login_guard::lifecycle::{signals::shutdown_signal, Shutdown};
use login_guard::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "login-guard")]
#[command(about = "Login endpoint with per-IP failed-attempt throttling", long_about = None)]
struct Args {
    /// Path to a TOML config file; watched for changes when given.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => GuardConfig::default(),
    };

    logging::init(&config.observability.log_level);

    tracing::info!("login-guard v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        max_attempts = config.limiter.max_attempts,
        window_secs = config.limiter.window_secs,
        ban_duration_secs = config.limiter.ban_duration_secs,
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

    // Keep the watcher alive for the life of the process.
    let (_watcher, config_updates) = match &args.config {
        Some(path) => {
            let (watcher, updates) = ConfigWatcher::new(path, config.clone());
            (Some(watcher.run()?), updates)
        }
        None => {
            let (_, updates) = mpsc::unbounded_channel::<GuardConfig>();
            (None, updates)
        }
    };

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            shutdown_signal().await;
            shutdown.trigger();
        }
    });

    let server = HttpServer::new(config);
    server.run(listener, config_updates, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
