//! Per-key failed-login bookkeeping.
//!
//! # Responsibilities
//! - Count failed attempts per caller key inside a fixed-origin window
//! - Ban a key for `ban_duration` (at most `MAX_BAN_DURATION`) once `max_attempts` is reached
//! - Answer ban queries without side effects
//! - Sweep entries that no longer carry any state
//!
//! # State Machine
//! ```text
//! Clean ──failure──▶ Counting(1) ──failure──▶ ... ──max_attempts──▶ Banned
//!   ▲                    │                                            │
//!   └────success─────────┘                                            │
//!   └──────────────────────────── ban expires ────────────────────────┘
//! ```
//! Ban expiry is implicit: once `banned_until` has passed the key reads as
//! Clean, and the next failure starts a new window at `Counting(1)`.
//!
//! # Design Decisions
//! - The window restarts from the first failure of a streak; it does not slide
//! - Entries live in a sharded `DashMap`; each mutation runs under the shard lock
//! - Thresholds are swapped with `ArcSwap` and loaded once per decision
//! - Every time-dependent operation has an `*_at` form taking an explicit `Instant`

use std::sync::Arc;
use std::time::{Duration, Instant};

use arc_swap::ArcSwap;
use dashmap::DashMap;

use crate::config::LimiterConfig;

/// Longest ban the tracker will apply; longer settings are clamped to it.
pub const MAX_BAN_DURATION: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

/// Thresholds applied to every decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LimiterSettings {
    /// Failures inside one window that trigger a ban. Zero behaves like one.
    pub max_attempts: u32,
    /// Length of a counting window.
    pub window: Duration,
    /// Length of a ban.
    pub ban_duration: Duration,
}

impl Default for LimiterSettings {
    fn default() -> Self {
        Self::from(&LimiterConfig::default())
    }
}

impl From<&LimiterConfig> for LimiterSettings {
    fn from(config: &LimiterConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            window: Duration::from_secs(config.window_secs),
            ban_duration: Duration::from_secs(config.ban_duration_secs),
        }
    }
}

/// Failures counted since `started_at`.
#[derive(Debug, Clone, Copy)]
struct CountingWindow {
    started_at: Instant,
    attempts: u32,
}

impl CountingWindow {
    fn is_open(&self, now: Instant, window: Duration) -> bool {
        now.saturating_duration_since(self.started_at) <= window
    }
}

/// State kept for one caller key.
#[derive(Debug, Default)]
struct AttemptState {
    window: Option<CountingWindow>,
    banned_until: Option<Instant>,
}

impl AttemptState {
    fn is_banned(&self, now: Instant) -> bool {
        self.banned_until.is_some_and(|until| until > now)
    }

    fn remaining_ban(&self, now: Instant) -> Duration {
        match self.banned_until {
            Some(until) if until > now => Duration::from_secs((until - now).as_secs()),
            _ => Duration::ZERO,
        }
    }

    fn is_clean(&self, now: Instant, window: Duration) -> bool {
        !self.is_banned(now) && !self.window.is_some_and(|w| w.is_open(now, window))
    }
}

/// What a recorded failure did to the key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureOutcome {
    /// Counted inside the current window; the key is not banned.
    Counted { attempts: u32 },
    /// This failure reached the threshold and started a ban.
    Banned { until: Instant },
    /// The key was already banned; nothing changed.
    AlreadyBanned,
}

/// Point-in-time summary of the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackerStats {
    pub tracked_keys: usize,
    pub banned_keys: usize,
}

/// Concurrent failed-attempt tracker keyed by caller identity.
#[derive(Debug)]
pub struct AttemptTracker {
    entries: DashMap<String, AttemptState>,
    settings: ArcSwap<LimiterSettings>,
}

impl Default for AttemptTracker {
    fn default() -> Self {
        Self::new(LimiterSettings::default())
    }
}

impl AttemptTracker {
    /// Create an empty tracker.
    pub fn new(settings: LimiterSettings) -> Self {
        Self {
            entries: DashMap::new(),
            settings: ArcSwap::from_pointee(settings),
        }
    }

    /// Current thresholds.
    pub fn settings(&self) -> LimiterSettings {
        **self.settings.load()
    }

    /// Replace the thresholds. Decisions already in flight keep their snapshot.
    pub fn update_settings(&self, settings: LimiterSettings) {
        let previous = self.settings.swap(Arc::new(settings));
        if *previous != settings {
            tracing::info!(
                max_attempts = settings.max_attempts,
                window_secs = settings.window.as_secs(),
                ban_duration_secs = settings.ban_duration.as_secs(),
                "Limiter settings updated"
            );
        }
    }

    pub fn is_banned(&self, key: &str) -> bool {
        self.is_banned_at(key, Instant::now())
    }

    /// True iff `key` has a ban ending strictly after `now`.
    pub fn is_banned_at(&self, key: &str, now: Instant) -> bool {
        self.entries
            .get(key)
            .is_some_and(|state| state.is_banned(now))
    }

    pub fn remaining_ban_duration(&self, key: &str) -> Duration {
        self.remaining_ban_duration_at(key, Instant::now())
    }

    /// Time left on the ban, truncated to whole seconds; zero when not banned.
    pub fn remaining_ban_duration_at(&self, key: &str, now: Instant) -> Duration {
        self.entries
            .get(key)
            .map_or(Duration::ZERO, |state| state.remaining_ban(now))
    }

    /// Whole seconds left on the ban.
    pub fn remaining_ban_secs(&self, key: &str) -> u64 {
        self.remaining_ban_duration(key).as_secs()
    }

    /// Failures counted in the key's open window.
    pub fn attempts_at(&self, key: &str, now: Instant) -> u32 {
        let window = self.settings().window;
        self.entries
            .get(key)
            .and_then(|state| state.window)
            .filter(|w| w.is_open(now, window))
            .map_or(0, |w| w.attempts)
    }

    pub fn record_failure(&self, key: &str) -> FailureOutcome {
        self.record_failure_at(key, Instant::now())
    }

    /// Count one failed attempt for `key`, banning it when the threshold is hit.
    ///
    /// The whole read-modify-write runs while holding the entry's shard lock,
    /// so concurrent failures for one key apply one after another.
    pub fn record_failure_at(&self, key: &str, now: Instant) -> FailureOutcome {
        let settings = self.settings.load();
        let mut entry = self.entries.entry(key.to_owned()).or_default();
        let state = entry.value_mut();

        if state.is_banned(now) {
            return FailureOutcome::AlreadyBanned;
        }

        let window = match state.window {
            Some(w) if w.is_open(now, settings.window) => w,
            _ => CountingWindow {
                started_at: now,
                attempts: 0,
            },
        };
        let attempts = window.attempts.saturating_add(1);

        if attempts >= settings.max_attempts {
            let until = ban_deadline(now, settings.ban_duration);
            state.banned_until = Some(until);
            state.window = None;
            FailureOutcome::Banned { until }
        } else {
            state.window = Some(CountingWindow { attempts, ..window });
            FailureOutcome::Counted { attempts }
        }
    }

    /// Clear the failure count for `key`. An active ban is left in place.
    pub fn record_success(&self, key: &str) {
        if let Some(mut state) = self.entries.get_mut(key) {
            state.window = None;
        }
    }

    /// Drop every entry.
    ///
    /// Administrative escape hatch; not reachable from the HTTP surface.
    pub fn reset_all(&self) {
        self.entries.clear();
    }

    pub fn evict_stale(&self) -> usize {
        self.evict_stale_at(Instant::now())
    }

    /// Remove entries with neither an open window nor an active ban.
    ///
    /// Returns how many entries were removed.
    pub fn evict_stale_at(&self, now: Instant) -> usize {
        let window = self.settings().window;
        let mut removed = 0;
        self.entries.retain(|_, state| {
            let keep = !state.is_clean(now, window);
            if !keep {
                removed += 1;
            }
            keep
        });
        removed
    }

    /// Number of keys currently stored.
    pub fn tracked_keys(&self) -> usize {
        self.entries.len()
    }

    pub fn stats_at(&self, now: Instant) -> TrackerStats {
        let mut stats = TrackerStats {
            tracked_keys: 0,
            banned_keys: 0,
        };
        for entry in self.entries.iter() {
            stats.tracked_keys += 1;
            if entry.value().is_banned(now) {
                stats.banned_keys += 1;
            }
        }
        stats
    }
}

/// `now + ban_duration`, clamped so that no setting can overflow `Instant`.
fn ban_deadline(now: Instant, ban_duration: Duration) -> Instant {
    now.checked_add(ban_duration.min(MAX_BAN_DURATION))
        .or_else(|| now.checked_add(MAX_BAN_DURATION / 100))
        .unwrap_or(now)
}
