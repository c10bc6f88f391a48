//! Supervisor - launches monitors, restarts crashed ones, runs the health sweep

use parking_lot::Mutex;
use std::any::Any;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::modules::{run_monitor, Monitor, MonitorContext};

/// Wait before relaunching a crashed monitor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RestartPolicy {
    pub cooldown: Duration,
}

impl Default for RestartPolicy {
    fn default() -> Self {
        Self {
            cooldown: Duration::from_secs(60),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SupervisorSettings {
    pub restart: RestartPolicy,
    pub health_check_interval: Duration,
}

impl SupervisorSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            restart: RestartPolicy {
                cooldown: config.restart_cooldown,
            },
            health_check_interval: config.health_check_interval,
        }
    }
}

impl Default for SupervisorSettings {
    fn default() -> Self {
        Self {
            restart: RestartPolicy::default(),
            health_check_interval: Duration::from_secs(60),
        }
    }
}

/// Result of one health sweep
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub stale: Vec<String>,
    pub evicted: usize,
}

/// Owns every monitor task.
///
/// Each monitor runs inside its own spawned task; a crash (error or panic) is
/// logged and the monitor relaunched after the cooldown, forever. Monitor
/// state lives in the monitor object, so it survives restarts.
pub struct Supervisor {
    ctx: MonitorContext,
    settings: SupervisorSettings,
    cancel: CancellationToken,
    handles: Mutex<Vec<JoinHandle<()>>>,
    is_running: AtomicBool,
}

impl Supervisor {
    pub fn new(ctx: MonitorContext, settings: SupervisorSettings) -> Self {
        Self {
            ctx,
            settings,
            cancel: CancellationToken::new(),
            handles: Mutex::new(Vec::new()),
            is_running: AtomicBool::new(false),
        }
    }

    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Launch every monitor plus the periodic health sweep
    pub fn start(&self, monitors: Vec<Arc<dyn Monitor>>) {
        if self.is_running.swap(true, Ordering::SeqCst) {
            warn!(target: "SUPERVISOR", "Already running");
            return;
        }

        info!(target: "SUPERVISOR", "🚀 Launching {} monitors", monitors.len());

        let mut handles = self.handles.lock();
        for monitor in monitors {
            self.ctx.health.register(monitor.name());
            handles.push(tokio::spawn(supervise(
                monitor,
                self.ctx.clone(),
                self.settings.restart,
                self.cancel.clone(),
            )));
        }

        handles.push(tokio::spawn(sweep_loop(
            self.ctx.clone(),
            self.settings.health_check_interval,
            self.cancel.clone(),
        )));
    }

    /// Run one health sweep now
    pub fn sweep(&self) -> SweepReport {
        sweep(&self.ctx)
    }

    /// Cancel every task and wait for them to finish
    pub async fn shutdown(&self) {
        info!(target: "SUPERVISOR", "🛑 Stopping monitors...");
        self.cancel.cancel();

        let handles = std::mem::take(&mut *self.handles.lock());
        for handle in handles {
            if let Err(e) = handle.await {
                warn!(target: "SUPERVISOR", "Task ended abnormally during shutdown: {}", e);
            }
        }

        self.is_running.store(false, Ordering::SeqCst);
        info!(target: "SUPERVISOR", "All monitors stopped");
    }
}

async fn supervise(
    monitor: Arc<dyn Monitor>,
    ctx: MonitorContext,
    policy: RestartPolicy,
    cancel: CancellationToken,
) {
    let name = monitor.name().to_string();

    loop {
        let task = tokio::spawn(run_monitor(Arc::clone(&monitor), ctx.clone(), cancel.clone()));

        let failure = match task.await {
            Ok(Ok(())) => return,
            Ok(Err(e)) => e.to_string(),
            Err(e) if e.is_panic() => format!("panicked: {}", panic_message(e.into_panic())),
            Err(e) => e.to_string(),
        };

        if cancel.is_cancelled() {
            return;
        }

        error!(
            target: "SUPERVISOR",
            "💥 {} monitor crashed: {}. Restarting in {}s",
            name,
            failure,
            policy.cooldown.as_secs()
        );
        ctx.metrics.record_restart(&name);

        tokio::select! {
            _ = cancel.cancelled() => return,
            _ = tokio::time::sleep(policy.cooldown) => {}
        }

        info!(target: "SUPERVISOR", "🔄 Restarting {} monitor", name);
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

async fn sweep_loop(ctx: MonitorContext, every: Duration, cancel: CancellationToken) {
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(every) => {}
        }
        sweep(&ctx);
    }
}

fn sweep(ctx: &MonitorContext) -> SweepReport {
    let config = ctx.config.get();

    let stale = ctx.health.stale(config.stale_after());
    ctx.metrics.stale_monitors.set(stale.len() as f64);
    if !stale.is_empty() {
        warn!(
            target: "SUPERVISOR",
            "⚠️ No update in over {} minutes from: {}",
            config.stale_after_minutes,
            stale.join(", ")
        );
    }

    let evicted = ctx.history.evict(config.history_max_age_hours);
    if evicted > 0 {
        info!(target: "SUPERVISOR", "🧹 Evicted {} wallets from history", evicted);
        ctx.metrics.history_evicted.inc_by(evicted as f64);
    }
    ctx.metrics.history_wallets.set(ctx.history.len() as f64);

    SweepReport { stale, evicted }
}
