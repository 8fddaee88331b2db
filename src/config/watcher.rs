//! Hot reload of the config file.
//!
//! Only `[limiter]` thresholds take effect on a running server. A reload that
//! touches any other section is still forwarded, with a warning naming the
//! sections that need a restart.

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::load_config;
use crate::config::schema::GuardConfig;

/// Watches one config file and forwards validated changes.
pub struct ConfigWatcher {
    path: PathBuf,
    current: GuardConfig,
    update_tx: mpsc::UnboundedSender<GuardConfig>,
}

impl ConfigWatcher {
    /// `current` is the config the server started with; reloads equal to it
    /// are dropped.
    pub fn new(path: &Path, current: GuardConfig) -> (Self, mpsc::UnboundedReceiver<GuardConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();
        let watcher = Self {
            path: path.to_path_buf(),
            current,
            update_tx,
        };
        (watcher, update_rx)
    }

    /// Start watching. Dropping the returned handle stops it.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let Self {
            path,
            mut current,
            update_tx,
        } = self;
        let watched = path.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) if event.kind.is_modify() || event.kind.is_create() => {
                    let next = match load_config(&path) {
                        Ok(next) => next,
                        Err(e) => {
                            tracing::error!(path = ?path, error = %e, "Rejected config reload");
                            return;
                        }
                    };
                    if next == current {
                        tracing::debug!(path = ?path, "Config file touched, contents unchanged");
                        return;
                    }

                    let stale = restart_required(&current, &next);
                    if !stale.is_empty() {
                        tracing::warn!(sections = ?stale, "Config sections changed that only apply after restart");
                    }
                    tracing::info!(
                        max_attempts = next.limiter.max_attempts,
                        window_secs = next.limiter.window_secs,
                        ban_duration_secs = next.limiter.ban_duration_secs,
                        "Config reloaded"
                    );

                    if update_tx.send(next.clone()).is_err() {
                        tracing::debug!("Config receiver dropped, ignoring reload");
                    }
                    current = next;
                }
                Ok(_) => {}
                Err(e) => tracing::error!(error = ?e, "Watch error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&watched, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?watched, "Config watcher started");
        Ok(watcher)
    }
}

/// Sections that differ between `current` and `next` but are only read at startup.
fn restart_required(current: &GuardConfig, next: &GuardConfig) -> Vec<&'static str> {
    let mut sections = Vec::new();
    if current.listener != next.listener {
        sections.push("listener");
    }
    if current.login != next.login {
        sections.push("login");
    }
    if current.credentials != next.credentials {
        sections.push("credentials");
    }
    if current.observability != next.observability {
        sections.push("observability");
    }
    if current.admin != next.admin {
        sections.push("admin");
    }
    // Everything except the eviction interval applies live.
    if current.limiter.eviction_interval_secs != next.limiter.eviction_interval_secs {
        sections.push("limiter.eviction_interval_secs");
    }
    sections
}
