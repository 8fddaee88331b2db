use std::time::Instant;

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::admin::AdminState;

#[derive(Debug, Serialize, Deserialize)]
pub struct SystemStatus {
    pub version: String,
    pub status: String,
}

/// Snapshot of the login limiter.
#[derive(Debug, Serialize, Deserialize)]
pub struct LimiterStatus {
    pub tracked_keys: usize,
    pub banned_keys: usize,
    pub max_attempts: u32,
    pub window_secs: u64,
    pub ban_duration_secs: u64,
}

pub async fn get_status() -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION").to_string(),
        status: "operational".to_string(),
    })
}

pub async fn get_limiter(State(state): State<AdminState>) -> Json<LimiterStatus> {
    let stats = state.tracker.stats_at(Instant::now());
    let settings = state.tracker.settings();

    Json(LimiterStatus {
        tracked_keys: stats.tracked_keys,
        banned_keys: stats.banned_keys,
        max_attempts: settings.max_attempts,
        window_secs: settings.window.as_secs(),
        ban_duration_secs: settings.ban_duration.as_secs(),
    })
}
