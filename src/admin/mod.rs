//! Read-only admin API.
//!
//! Exposes service status and limiter statistics behind a bearer key. Clearing
//! limiter state is intentionally not offered here.

pub mod auth;
pub mod handlers;

use std::sync::Arc;

use axum::{middleware, routing::get, Router};

use self::auth::admin_auth_middleware;
use self::handlers::*;
use crate::security::AttemptTracker;

/// State shared by the admin handlers.
#[derive(Clone)]
pub struct AdminState {
    pub tracker: Arc<AttemptTracker>,
    pub api_key: Arc<str>,
}

pub fn setup_admin_router(state: AdminState) -> Router {
    Router::new()
        .route("/admin/status", get(get_status))
        .route("/admin/limiter", get(get_limiter))
        .layer(middleware::from_fn_with_state(state.clone(), admin_auth_middleware))
        .with_state(state)
}
