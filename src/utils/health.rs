//! Per-monitor health bookkeeping

use chrono::{DateTime, Utc};
use dashmap::{DashMap, DashSet};
use serde::Serialize;
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone, Copy)]
struct HealthStamp {
    at: Instant,
    wall: DateTime<Utc>,
}

/// Health of a single monitor, as reported to operators
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitorHealth {
    pub name: String,
    pub last_update: Option<DateTime<Utc>>,
    pub seconds_since_update: Option<u64>,
    pub stale: bool,
}

/// Last successful update time per monitor.
///
/// Monitors are registered when launched; a registered monitor that has never
/// touched counts as stale. No alerting happens here.
#[derive(Debug, Default)]
pub struct HealthTracker {
    registered: DashSet<String>,
    last_touch: DashMap<String, HealthStamp>,
}

impl HealthTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, name: &str) {
        self.registered.insert(name.to_string());
    }

    /// Mark a successful cycle for `name`
    pub fn touch(&self, name: &str) {
        self.last_touch.insert(
            name.to_string(),
            HealthStamp {
                at: Instant::now(),
                wall: Utc::now(),
            },
        );
    }

    pub fn last_update(&self, name: &str) -> Option<Instant> {
        self.last_touch.get(name).map(|s| s.at)
    }

    fn is_stale(&self, name: &str, max_delay: Duration, now: Instant) -> bool {
        match self.last_touch.get(name) {
            Some(stamp) => now.saturating_duration_since(stamp.at) > max_delay,
            None => true,
        }
    }

    /// Monitors whose last touch is older than `max_delay`, or that never touched
    pub fn stale(&self, max_delay: Duration) -> Vec<String> {
        let now = Instant::now();
        let mut names: Vec<String> = self.names();
        names.retain(|name| self.is_stale(name, max_delay, now));
        names
    }

    /// Status of every known monitor
    pub fn report(&self, max_delay: Duration) -> Vec<MonitorHealth> {
        let now = Instant::now();
        self.names()
            .into_iter()
            .map(|name| {
                let stamp = self.last_touch.get(&name).map(|s| *s);
                MonitorHealth {
                    stale: self.is_stale(&name, max_delay, now),
                    last_update: stamp.map(|s| s.wall),
                    seconds_since_update: stamp.map(|s| now.saturating_duration_since(s.at).as_secs()),
                    name,
                }
            })
            .collect()
    }

    fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.registered.iter().map(|n| n.key().clone()).collect();
        for entry in self.last_touch.iter() {
            if !self.registered.contains(entry.key()) {
                names.push(entry.key().clone());
            }
        }
        names.sort();
        names
    }
}
