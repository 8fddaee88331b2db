//! Background sweeping of stale tracker entries.
//!
//! Entries are created on first failure and otherwise never removed, so a
//! stream of distinct source addresses would grow the map without bound. The
//! sweeper drops entries with no open window and no active ban.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time;

use crate::observability::metrics;
use crate::security::attempt_tracker::AttemptTracker;

pub struct EvictionTask {
    tracker: Arc<AttemptTracker>,
    interval: Duration,
}

impl EvictionTask {
    pub fn new(tracker: Arc<AttemptTracker>, interval: Duration) -> Self {
        Self { tracker, interval }
    }

    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        if self.interval.is_zero() {
            tracing::info!("Stale entry eviction disabled");
            return;
        }

        tracing::info!(interval_secs = self.interval.as_secs(), "Eviction task starting");

        let mut ticker = time::interval(self.interval);
        // The first tick completes immediately; nothing is stale yet.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.sweep();
                }
                _ = shutdown.recv() => {
                    tracing::info!("Eviction task received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }

    fn sweep(&self) {
        let removed = self.tracker.evict_stale();
        let remaining = self.tracker.tracked_keys();
        if removed > 0 {
            tracing::debug!(removed, remaining, "Evicted stale login entries");
            metrics::record_evicted(removed);
        }
        metrics::record_tracked_keys(remaining);
    }
}
