//! Prometheus metrics service for WhaleWatch

use prometheus::{
    Counter, CounterVec, Encoder, Gauge, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder,
};
use std::time::{Duration, Instant};
use tracing::info;

/// Metrics service for Prometheus
#[derive(Clone)]
pub struct MetricsService {
    registry: Registry,
    start_time: Instant,

    // Monitors
    pub alerts_emitted: CounterVec,
    pub monitor_cycles: CounterVec,
    pub monitor_restarts: CounterVec,

    // Gateway
    pub gateway_requests: CounterVec,
    pub gateway_latency: HistogramVec,
    pub gateway_retries: Counter,

    // Supervisor sweep
    pub stale_monitors: Gauge,
    pub history_wallets: Gauge,
    pub history_evicted: Counter,

    pub uptime: Gauge,
}

impl MetricsService {
    /// Create a new metrics service
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new();

        let alerts_emitted = CounterVec::new(
            Opts::new("whalewatch_alerts_emitted_total", "Alerts emitted by monitors"),
            &["monitor"],
        )?;
        let monitor_cycles = CounterVec::new(
            Opts::new("whalewatch_monitor_cycles_total", "Completed monitor cycles"),
            &["monitor", "outcome"],
        )?;
        let monitor_restarts = CounterVec::new(
            Opts::new("whalewatch_monitor_restarts_total", "Monitor task restarts after failure"),
            &["monitor"],
        )?;

        let gateway_requests = CounterVec::new(
            Opts::new("whalewatch_gateway_requests_total", "Provider requests"),
            &["endpoint", "outcome"],
        )?;
        let gateway_latency = HistogramVec::new(
            HistogramOpts::new("whalewatch_gateway_latency_seconds", "Provider request latency")
                .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
            &["endpoint"],
        )?;
        let gateway_retries = Counter::new("whalewatch_gateway_retries_total", "Provider request retries")?;

        let stale_monitors = Gauge::new("whalewatch_stale_monitors", "Monitors without a recent successful cycle")?;
        let history_wallets = Gauge::new("whalewatch_history_wallets", "Wallets in the history store")?;
        let history_evicted = Counter::new("whalewatch_history_evicted_total", "Wallets evicted from history")?;

        let uptime = Gauge::new("whalewatch_uptime_seconds", "Application uptime")?;

        registry.register(Box::new(alerts_emitted.clone()))?;
        registry.register(Box::new(monitor_cycles.clone()))?;
        registry.register(Box::new(monitor_restarts.clone()))?;
        registry.register(Box::new(gateway_requests.clone()))?;
        registry.register(Box::new(gateway_latency.clone()))?;
        registry.register(Box::new(gateway_retries.clone()))?;
        registry.register(Box::new(stale_monitors.clone()))?;
        registry.register(Box::new(history_wallets.clone()))?;
        registry.register(Box::new(history_evicted.clone()))?;
        registry.register(Box::new(uptime.clone()))?;

        info!(target: "METRICS", "Prometheus metrics initialized");

        Ok(Self {
            registry,
            start_time: Instant::now(),
            alerts_emitted,
            monitor_cycles,
            monitor_restarts,
            gateway_requests,
            gateway_latency,
            gateway_retries,
            stale_monitors,
            history_wallets,
            history_evicted,
            uptime,
        })
    }

    pub fn record_alert(&self, monitor: &str) {
        self.alerts_emitted.with_label_values(&[monitor]).inc();
    }

    pub fn record_cycle(&self, monitor: &str, outcome: &str) {
        self.monitor_cycles.with_label_values(&[monitor, outcome]).inc();
    }

    pub fn record_restart(&self, monitor: &str) {
        self.monitor_restarts.with_label_values(&[monitor]).inc();
    }

    pub fn record_gateway_request(&self, endpoint: &str, outcome: &str, latency: Duration) {
        self.gateway_requests
            .with_label_values(&[endpoint, outcome])
            .inc();
        self.gateway_latency
            .with_label_values(&[endpoint])
            .observe(latency.as_secs_f64());
    }

    pub fn uptime_secs(&self) -> f64 {
        self.start_time.elapsed().as_secs_f64()
    }

    /// Get metrics as Prometheus text format
    pub fn get_metrics(&self) -> prometheus::Result<String> {
        self.uptime.set(self.uptime_secs());

        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}
