//! Supervisor tests: restart on crash, failure isolation, health sweep, shutdown

mod common;

use chrono::{Duration as ChronoDuration, Utc};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

use common::{context, ScriptedMonitor, Step};
use whalewatch::modules::Monitor;
use whalewatch::supervisor::{RestartPolicy, Supervisor, SupervisorSettings};
use whalewatch::utils::history::HistoryTransaction;

fn settings(cooldown_secs: u64) -> SupervisorSettings {
    SupervisorSettings {
        restart: RestartPolicy {
            cooldown: Duration::from_secs(cooldown_secs),
        },
        health_check_interval: Duration::from_secs(3600),
    }
}

fn old_wallet(ctx: &whalewatch::modules::MonitorContext, wallet: &str) {
    let seen_at = Utc::now() - ChronoDuration::hours(30);
    ctx.history.record_at(
        wallet,
        HistoryTransaction {
            timestamp: seen_at,
            amount: 1.0,
            signature: format!("{}-sig", wallet),
        },
        seen_at,
    );
}

fn restarts(ctx: &whalewatch::modules::MonitorContext, name: &str) -> f64 {
    ctx.metrics.monitor_restarts.with_label_values(&[name]).get()
}

#[tokio::test(start_paused = true)]
async fn test_crashed_monitor_restarts_after_cooldown() {
    let ctx = context();
    let flaky = ScriptedMonitor::new("flaky", Duration::from_secs(1), |n| {
        if n == 2 {
            Step::Crash
        } else {
            Step::Ok
        }
    });
    let supervisor = Supervisor::new(ctx.clone(), settings(60));
    supervisor.start(vec![flaky.clone() as Arc<dyn Monitor>]);

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(flaky.cycles(), 2);
    let before_crash = ctx.health.last_update("flaky").unwrap();
    assert_eq!(restarts(&ctx, "flaky"), 1.0);

    // Still cooling down
    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(flaky.cycles(), 2);
    assert_eq!(ctx.health.last_update("flaky"), Some(before_crash));

    tokio::time::sleep(Duration::from_secs(31)).await;
    assert!(flaky.cycles() >= 3);
    assert!(ctx.health.last_update("flaky").unwrap() > before_crash);
    assert_eq!(restarts(&ctx, "flaky"), 1.0);

    supervisor.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_panicking_monitor_is_restarted() {
    let ctx = context();
    let panicky = ScriptedMonitor::new("panicky", Duration::from_secs(5), |n| {
        if n == 1 {
            Step::Panic
        } else {
            Step::Ok
        }
    });
    let supervisor = Supervisor::new(ctx.clone(), settings(10));
    supervisor.start(vec![panicky.clone() as Arc<dyn Monitor>]);

    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(panicky.cycles(), 1);
    assert!(ctx.health.last_update("panicky").is_none());
    assert_eq!(restarts(&ctx, "panicky"), 1.0);

    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(panicky.cycles(), 2);
    assert!(ctx.health.last_update("panicky").is_some());

    supervisor.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_crash_does_not_affect_other_monitors() {
    let ctx = context();
    let broken = ScriptedMonitor::new("broken", Duration::from_secs(1), |_| Step::Crash);
    let steady = ScriptedMonitor::new("steady", Duration::from_secs(1), |_| Step::Ok);
    let supervisor = Supervisor::new(ctx.clone(), settings(60));
    supervisor.start(vec![
        broken.clone() as Arc<dyn Monitor>,
        steady.clone() as Arc<dyn Monitor>,
    ]);

    tokio::time::sleep(Duration::from_millis(10_500)).await;
    assert_eq!(broken.cycles(), 1);
    assert_eq!(steady.cycles(), 11);
    assert!(ctx.health.last_update("steady").is_some());

    supervisor.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_fetch_failures_never_restart() {
    let ctx = context();
    let offline = ScriptedMonitor::new("offline", Duration::from_secs(1), |_| Step::FetchFails);
    let supervisor = Supervisor::new(ctx.clone(), settings(60));
    supervisor.start(vec![offline.clone() as Arc<dyn Monitor>]);

    tokio::time::sleep(Duration::from_millis(5_500)).await;
    assert_eq!(offline.cycles(), 6);
    assert_eq!(restarts(&ctx, "offline"), 0.0);
    assert!(ctx.health.last_update("offline").is_none());

    supervisor.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_sweep_flags_stale_monitors_and_evicts_history() {
    let ctx = context();
    let healthy = ScriptedMonitor::new("healthy", Duration::from_secs(60), |_| Step::Ok);
    let offline = ScriptedMonitor::new("offline", Duration::from_secs(60), |_| Step::FetchFails);
    let supervisor = Supervisor::new(ctx.clone(), settings(60));
    supervisor.start(vec![
        healthy.clone() as Arc<dyn Monitor>,
        offline.clone() as Arc<dyn Monitor>,
    ]);

    ctx.history.record_at(
        "OldWallet",
        HistoryTransaction {
            timestamp: Utc::now() - ChronoDuration::hours(30),
            amount: 1.0,
            signature: "old".into(),
        },
        Utc::now() - ChronoDuration::hours(30),
    );
    ctx.history.record(
        "NewWallet",
        HistoryTransaction {
            timestamp: Utc::now(),
            amount: 1.0,
            signature: "new".into(),
        },
    );

    tokio::time::sleep(Duration::from_secs(1)).await;
    let report = supervisor.sweep();

    assert_eq!(report.stale, vec!["offline".to_string()]);
    assert_eq!(report.evicted, 1);
    assert!(ctx.history.get("OldWallet").is_none());
    assert!(ctx.history.get("NewWallet").is_some());
    assert_eq!(ctx.metrics.stale_monitors.get(), 1.0);
    assert_eq!(ctx.metrics.history_wallets.get(), 1.0);

    supervisor.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_periodic_sweep_runs_without_being_called() {
    let ctx = context();
    let healthy = ScriptedMonitor::new("healthy", Duration::from_secs(30), |_| Step::Ok);
    let offline = ScriptedMonitor::new("offline", Duration::from_secs(30), |_| Step::FetchFails);
    let supervisor = Supervisor::new(
        ctx.clone(),
        SupervisorSettings {
            restart: RestartPolicy::default(),
            health_check_interval: Duration::from_secs(60),
        },
    );
    supervisor.start(vec![
        healthy.clone() as Arc<dyn Monitor>,
        offline.clone() as Arc<dyn Monitor>,
    ]);
    old_wallet(&ctx, "OldWallet");

    tokio::time::sleep(Duration::from_secs(59)).await;
    assert!(ctx.history.get("OldWallet").is_some());

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert!(ctx.history.get("OldWallet").is_none());
    assert_eq!(ctx.metrics.stale_monitors.get(), 1.0);
    assert_eq!(ctx.metrics.history_evicted.get(), 1.0);

    supervisor.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_sweep_survives_out_of_range_history_age() {
    let ctx = context();
    let supervisor = Supervisor::new(
        ctx.clone(),
        SupervisorSettings {
            restart: RestartPolicy::default(),
            health_check_interval: Duration::from_secs(10),
        },
    );
    supervisor.start(Vec::new());

    ctx.config.update(json!({ "history_max_age_hours": 1e12 })).unwrap();
    old_wallet(&ctx, "KeptWallet");
    tokio::time::sleep(Duration::from_secs(11)).await;
    assert!(ctx.history.get("KeptWallet").is_some());

    ctx.config.update(json!({ "history_max_age_hours": -1e12 })).unwrap();
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert!(ctx.history.is_empty());

    ctx.config.update(json!({ "history_max_age_hours": 24.0 })).unwrap();
    old_wallet(&ctx, "OldWallet");
    ctx.metrics.stale_monitors.set(-1.0);
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert!(ctx.history.get("OldWallet").is_none());
    assert_eq!(ctx.metrics.stale_monitors.get(), 0.0);

    supervisor.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_stops_every_monitor() {
    let ctx = context();
    let steady = ScriptedMonitor::new("steady", Duration::from_secs(1), |_| Step::Ok);
    let crashing = ScriptedMonitor::new("crashing", Duration::from_secs(1), |_| Step::Crash);
    let supervisor = Supervisor::new(ctx.clone(), settings(60));
    supervisor.start(vec![
        steady.clone() as Arc<dyn Monitor>,
        crashing.clone() as Arc<dyn Monitor>,
    ]);

    tokio::time::sleep(Duration::from_millis(2_500)).await;
    supervisor.shutdown().await;
    let steady_cycles = steady.cycles();
    let crashing_cycles = crashing.cycles();

    tokio::time::sleep(Duration::from_secs(120)).await;
    assert_eq!(steady.cycles(), steady_cycles);
    assert_eq!(crashing.cycles(), crashing_cycles);
}
