//! Shared fixtures for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use whalewatch::config::{ConfigStore, MonitorConfig};
use whalewatch::error::{GatewayError, MonitorError};
use whalewatch::modules::{CycleReport, Monitor, MonitorContext};
use whalewatch::utils::gateway::GatewayRequest;
use whalewatch::utils::{
    AlertService, DataGateway, HealthTracker, HistoryStore, MetricsService, RetryPolicy, Transport,
};

/// Provider that is never reachable
pub struct OfflineTransport;

#[async_trait]
impl Transport for OfflineTransport {
    async fn send(&self, request: &GatewayRequest) -> Result<Value, GatewayError> {
        Err(GatewayError::Permanent(format!("offline: {}", request.endpoint.as_str())))
    }
}

pub fn context() -> MonitorContext {
    MonitorContext {
        config: Arc::new(ConfigStore::new(MonitorConfig::default())),
        gateway: Arc::new(DataGateway::new(Arc::new(OfflineTransport), RetryPolicy::default())),
        history: Arc::new(HistoryStore::new()),
        health: Arc::new(HealthTracker::new()),
        alerts: Arc::new(AlertService::local()),
        metrics: Arc::new(MetricsService::new().unwrap()),
    }
}

/// What a scripted monitor does on its n-th cycle (1-based, counted across restarts)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Ok,
    FetchFails,
    Crash,
    Panic,
}

/// Monitor whose behaviour per cycle is fixed up front
pub struct ScriptedMonitor {
    name: &'static str,
    interval: Duration,
    script: fn(usize) -> Step,
    cycles: AtomicUsize,
}

impl ScriptedMonitor {
    pub fn new(name: &'static str, interval: Duration, script: fn(usize) -> Step) -> Arc<Self> {
        Arc::new(Self {
            name,
            interval,
            script,
            cycles: AtomicUsize::new(0),
        })
    }

    pub fn cycles(&self) -> usize {
        self.cycles.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Monitor for ScriptedMonitor {
    fn name(&self) -> &str {
        self.name
    }

    fn interval(&self, _config: &MonitorConfig) -> Duration {
        self.interval
    }

    async fn cycle(&self, _ctx: &MonitorContext, _config: &MonitorConfig) -> Result<CycleReport, MonitorError> {
        let n = self.cycles.fetch_add(1, Ordering::SeqCst) + 1;
        match (self.script)(n) {
            Step::Ok => Ok(CycleReport::default()),
            Step::FetchFails => Err(MonitorError::Gateway(GatewayError::Transient("provider down".into()))),
            Step::Crash => Err(MonitorError::Evaluation(format!("cycle {} hit bad data", n))),
            Step::Panic => panic!("cycle {} blew up", n),
        }
    }
}
