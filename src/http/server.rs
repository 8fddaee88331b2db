//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the login, health and admin handlers
//! - Wire up middleware (tracing, request ID, timeout)
//! - Start background tasks (stale entry eviction, config reload)
//! - Serve until the shutdown signal fires

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    routing::{get, post},
    Router,
};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::admin::{setup_admin_router, AdminState};
use crate::config::{GuardConfig, LoginConfig};
use crate::http::login::login_handler;
use crate::http::request::X_REQUEST_ID;
use crate::security::{
    AttemptTracker, CredentialVerifier, EvictionTask, LimiterSettings, LoginGuard,
    StaticCredentials,
};

/// Error type for serving.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub guard: Arc<LoginGuard>,
    pub verifier: Arc<dyn CredentialVerifier>,
    pub login: LoginConfig,
}

/// HTTP server fronting the login challenge.
pub struct HttpServer {
    router: Router,
    config: GuardConfig,
    tracker: Arc<AttemptTracker>,
}

impl HttpServer {
    /// Create a server that checks credentials against `config.credentials`.
    pub fn new(config: GuardConfig) -> Self {
        let verifier = Arc::new(StaticCredentials::from(&config.credentials));
        Self::with_verifier(config, verifier)
    }

    /// Create a server with a custom credential check.
    pub fn with_verifier(config: GuardConfig, verifier: Arc<dyn CredentialVerifier>) -> Self {
        let tracker = Arc::new(AttemptTracker::new(LimiterSettings::from(&config.limiter)));
        let state = AppState {
            guard: Arc::new(LoginGuard::new(tracker.clone())),
            verifier,
            login: config.login.clone(),
        };

        let router = Self::build_router(&config, state, tracker.clone());
        Self {
            router,
            config,
            tracker,
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &GuardConfig, state: AppState, tracker: Arc<AttemptTracker>) -> Router {
        let mut router = Router::new()
            .route("/login", post(login_handler))
            .route("/health", get(health))
            .with_state(state);

        if config.admin.enabled {
            router = router.merge(setup_admin_router(AdminState {
                tracker,
                api_key: Arc::from(config.admin.api_key.as_str()),
            }));
        }

        router.layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
                .layer(TimeoutLayer::new(Duration::from_secs(
                    config.listener.request_timeout_secs,
                ))),
        )
    }

    /// Run the server, accepting connections on the given listener.
    ///
    /// Limiter thresholds from `config_updates` are applied to the live tracker.
    pub async fn run(
        self,
        listener: TcpListener,
        config_updates: mpsc::UnboundedReceiver<GuardConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), ServerError> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            max_attempts = self.config.limiter.max_attempts,
            window_secs = self.config.limiter.window_secs,
            ban_duration_secs = self.config.limiter.ban_duration_secs,
            "HTTP server starting"
        );

        let eviction = EvictionTask::new(
            self.tracker.clone(),
            Duration::from_secs(self.config.limiter.eviction_interval_secs),
        );
        tokio::spawn(eviction.run(shutdown.resubscribe()));

        tokio::spawn(apply_config_updates(
            self.tracker.clone(),
            config_updates,
            shutdown.resubscribe(),
        ));

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("HTTP server draining");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GuardConfig {
        &self.config
    }

    /// The tracker shared by every request this server handles.
    pub fn tracker(&self) -> Arc<AttemptTracker> {
        self.tracker.clone()
    }
}

async fn health() -> &'static str {
    "ok"
}

async fn apply_config_updates(
    tracker: Arc<AttemptTracker>,
    mut updates: mpsc::UnboundedReceiver<GuardConfig>,
    mut shutdown: broadcast::Receiver<()>,
) {
    loop {
        tokio::select! {
            update = updates.recv() => match update {
                Some(config) => tracker.update_settings(LimiterSettings::from(&config.limiter)),
                None => break,
            },
            _ = shutdown.recv() => break,
        }
    }
    tracing::debug!("Config update task stopped");
}
