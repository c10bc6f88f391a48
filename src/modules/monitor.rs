//! Monitor plumbing shared by every signal detector
//!
//! A monitor is polled in a loop by [`run_monitor`]:
//! `SCHEDULED -> FETCHING -> EVALUATING -> (ALERTING) -> HEALTHY_SLEEP -> SCHEDULED`.
//! Gateway failures skip the cycle without touching health. Any other error ends
//! the loop and is handed to the supervisor.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::{BaselineMode, ConfigStore, MonitorConfig};
use crate::error::{GatewayError, MonitorError};
use crate::utils::gateway::shorten_address;
use crate::utils::{AlertEvent, AlertService, DataGateway, HealthTracker, HistoryStore, MetricsService, SignalType};

/// Services handed to every monitor
#[derive(Clone)]
pub struct MonitorContext {
    pub config: Arc<ConfigStore>,
    pub gateway: Arc<DataGateway>,
    pub history: Arc<HistoryStore>,
    pub health: Arc<HealthTracker>,
    pub alerts: Arc<AlertService>,
    pub metrics: Arc<MetricsService>,
}

impl MonitorContext {
    /// Log, count and dispatch an alert
    pub async fn emit(&self, event: AlertEvent) {
        crate::log_alert!(
            "ALERT",
            "[{}] {}: {}",
            event.monitor_name,
            shorten_address(&event.target, 4),
            event.formatted_message
        );
        self.metrics.record_alert(&event.monitor_name);
        self.alerts.dispatch(&event).await;
    }
}

/// Summary of one completed cycle
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CycleReport {
    pub evaluated: usize,
    pub failed: usize,
    pub alerts: usize,
}

/// A periodically polled signal detector
#[async_trait]
pub trait Monitor: Send + Sync {
    fn name(&self) -> &str;

    /// Sleep between cycles, read from the current config every cycle
    fn interval(&self, config: &MonitorConfig) -> Duration;

    /// One fetch + evaluate pass over all targets
    async fn cycle(&self, ctx: &MonitorContext, config: &MonitorConfig) -> Result<CycleReport, MonitorError>;
}

/// Per-target accounting for a cycle.
///
/// A cycle counts as failed only when every target's fetch failed; a partially
/// successful cycle still proves the monitor is getting fresh data.
#[derive(Debug, Default)]
pub(crate) struct CycleTally {
    report: CycleReport,
    last_error: Option<GatewayError>,
}

impl CycleTally {
    pub(crate) fn evaluated(&mut self, alerts: usize) {
        self.report.evaluated += 1;
        self.report.alerts += alerts;
    }

    pub(crate) fn failed(&mut self, monitor: &str, target: &str, error: GatewayError) {
        debug!(
            target: "MONITOR",
            "{}: fetch for {} failed: {}",
            monitor,
            shorten_address(target, 4),
            error
        );
        self.report.failed += 1;
        self.last_error = Some(error);
    }

    pub(crate) fn finish(self) -> Result<CycleReport, MonitorError> {
        match self.last_error {
            Some(e) if self.report.evaluated == 0 => Err(MonitorError::Gateway(e)),
            _ => Ok(self.report),
        }
    }
}

/// Run a monitor until `cancel` fires or a non-gateway error escapes a cycle
pub async fn run_monitor(
    monitor: Arc<dyn Monitor>,
    ctx: MonitorContext,
    cancel: CancellationToken,
) -> Result<(), MonitorError> {
    let name = monitor.name().to_string();
    info!(target: "MONITOR", "▶️ {} monitor running", name);

    loop {
        if cancel.is_cancelled() {
            break;
        }

        let config = ctx.config.get();
        match monitor.cycle(&ctx, &config).await {
            Ok(report) => {
                ctx.health.touch(&name);
                ctx.metrics.record_cycle(&name, "ok");
                debug!(
                    target: "MONITOR",
                    "{} cycle done: {} evaluated, {} failed, {} alert(s)",
                    name,
                    report.evaluated,
                    report.failed,
                    report.alerts
                );
            }
            Err(e) if e.is_skippable() => {
                ctx.metrics.record_cycle(&name, "fetch_failed");
                warn!(target: "MONITOR", "{} cycle skipped: {}", name, e);
            }
            Err(e) => {
                ctx.metrics.record_cycle(&name, "failed");
                return Err(e);
            }
        }

        let interval = monitor.interval(&ctx.config.get());
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(interval) => {}
        }
    }

    info!(target: "MONITOR", "⏹️ {} monitor stopped", name);
    Ok(())
}

// ============================================
// BASELINE TRACKING
// ============================================

/// Last known value of a metric for one target
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObservationSnapshot {
    /// First usable value seen for this target
    pub baseline: f64,
    /// Value from the most recent successful poll
    pub last: f64,
    pub observed_at: DateTime<Utc>,
}

/// Comparison of a new value against its reference
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub reference: f64,
    pub change_percent: f64,
}

/// Snapshots for one monitor, keyed by target
#[derive(Debug, Default)]
pub struct BaselineTracker {
    snapshots: DashMap<String, ObservationSnapshot>,
}

impl BaselineTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` for `target` and compare it against the reference chosen by `mode`.
    ///
    /// Returns `None` on the first observation, and when the reference cannot
    /// be used (zero, negative, non-finite). In the latter case the baseline is
    /// re-armed with `value`.
    pub fn observe(&self, target: &str, value: f64, mode: BaselineMode) -> Option<Observation> {
        let now = Utc::now();
        match self.snapshots.entry(target.to_string()) {
            Entry::Vacant(slot) => {
                slot.insert(ObservationSnapshot {
                    baseline: value,
                    last: value,
                    observed_at: now,
                });
                None
            }
            Entry::Occupied(mut slot) => {
                let snapshot = slot.get_mut();
                let reference = match mode {
                    BaselineMode::Fixed => snapshot.baseline,
                    BaselineMode::Rolling => snapshot.last,
                };
                let change = percent_change(reference, value);

                snapshot.last = value;
                snapshot.observed_at = now;
                if change.is_none() {
                    snapshot.baseline = value;
                }

                change.map(|change_percent| Observation {
                    reference,
                    change_percent,
                })
            }
        }
    }

    pub fn get(&self, target: &str) -> Option<ObservationSnapshot> {
        self.snapshots.get(target).map(|s| *s)
    }
}

/// Total supply per target, fetched on first use and then reused
#[derive(Debug, Default)]
pub struct SupplyCache {
    supplies: DashMap<String, f64>,
}

impl SupplyCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get_or_fetch(&self, gateway: &DataGateway, target: &str) -> Result<f64, GatewayError> {
        if let Some(supply) = self.supplies.get(target).map(|s| *s) {
            return Ok(supply);
        }
        let supply = gateway.token_supply(target).await?;
        debug!(target: "MONITOR", "Supply for {}: {}", shorten_address(target, 4), supply);
        self.supplies.insert(target.to_string(), supply);
        Ok(supply)
    }
}

/// Signed percent change from `reference` to `current`
pub fn percent_change(reference: f64, current: f64) -> Option<f64> {
    if !(reference > 0.0) || !reference.is_finite() || !current.is_finite() {
        return None;
    }
    Some((current - reference) * 100.0 / reference)
}

/// Thresholds are exclusive: a move of exactly `threshold` percent does not alert
pub fn breaches(change_percent: f64, threshold: f64) -> bool {
    change_percent.abs() > threshold
}

/// Shared evaluate step of the price, liquidity and market-cap monitors.
/// Returns the number of alerts emitted (0 or 1).
#[allow(clippy::too_many_arguments)]
pub(crate) async fn check_drift(
    ctx: &MonitorContext,
    tracker: &BaselineTracker,
    mode: BaselineMode,
    threshold: f64,
    monitor: &str,
    signal: SignalType,
    target: &str,
    value: f64,
    describe: impl FnOnce(&Observation) -> String,
) -> usize {
    let observation = match tracker.observe(target, value, mode) {
        Some(o) => o,
        None => return 0,
    };

    if !breaches(observation.change_percent, threshold) {
        return 0;
    }

    let message = describe(&observation);
    let event = AlertEvent::new(monitor, target, signal, value, message)
        .with_change(observation.reference, observation.change_percent);
    ctx.emit(event).await;
    1
}
