//! WhaleWatch - on-chain token anomaly monitor
//!
//! Watches a set of target tokens for:
//! - Price, liquidity and market cap swings
//! - Whale concentration and large transfers
//! - New launches by the tokens' creators
//!
//! This is a **monitoring-only** tool - no wallet or trading functionality.

use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info};

use whalewatch::api::{ApiServer, AppState};
use whalewatch::config::{Config, ConfigStore};
use whalewatch::modules::{default_monitors, MonitorContext};
use whalewatch::supervisor::{Supervisor, SupervisorSettings};
use whalewatch::utils::{
    init_logger, AlertService, DataGateway, HealthTracker, HistoryStore, HttpTransport, MetricsService,
    RetryPolicy,
};

const BANNER: &str = r#"
    ╔═══════════════════════════════════════════════════════╗
    ║                                                       ║
    ║   🐋  W H A L E W A T C H                             ║
    ║   Token anomaly monitor (read-only)                   ║
    ║   📈 Price | 💧 Liquidity | 📊 Market Cap             ║
    ║   🐋 Whales | 🚨 Large Tx | 🆕 Creator Launches       ║
    ║                                                       ║
    ╚═══════════════════════════════════════════════════════╝
"#;

/// WhaleWatch application
pub struct WhaleWatch {
    config: Config,
    ctx: MonitorContext,
    supervisor: Supervisor,
}

impl WhaleWatch {
    /// Create a new WhaleWatch instance
    pub fn new() -> Result<Self> {
        let config = Config::from_env().context("loading configuration")?;

        // Initialize services
        let metrics = Arc::new(MetricsService::new().context("registering metrics")?);
        let transport = Arc::new(HttpTransport::new(&config).context("building HTTP client")?);
        let gateway = DataGateway::new(
            transport,
            RetryPolicy {
                max_retries: config.gateway_max_retries,
                initial_delay: config.gateway_initial_delay,
            },
        )
        .with_metrics(Arc::clone(&metrics));

        let ctx = MonitorContext {
            config: Arc::new(ConfigStore::new(config.monitor_defaults())),
            gateway: Arc::new(gateway),
            history: Arc::new(HistoryStore::new()),
            health: Arc::new(HealthTracker::new()),
            alerts: Arc::new(AlertService::new(&config).context("building alert client")?),
            metrics,
        };

        let supervisor = Supervisor::new(ctx.clone(), SupervisorSettings::from_config(&config));

        Ok(Self { config, ctx, supervisor })
    }

    /// Start monitors, then serve the operator API until shutdown
    pub async fn start(&self) -> Result<()> {
        println!("{}", BANNER);

        info!(
            target: "WHALEWATCH",
            "Watching {} token(s), {} configured creator(s)",
            self.config.target_tokens.len(),
            self.config.creator_addresses.len()
        );

        self.supervisor.start(default_monitors(
            &self.config.target_tokens,
            &self.config.creator_addresses,
        ));

        info!(target: "WHALEWATCH", "✅ All monitors launched");

        let api = ApiServer::new(
            self.config.api_port,
            AppState {
                config: Arc::clone(&self.ctx.config),
                health: Arc::clone(&self.ctx.health),
                history: Arc::clone(&self.ctx.history),
                alerts: Arc::clone(&self.ctx.alerts),
                metrics: Arc::clone(&self.ctx.metrics),
            },
        );
        api.start(self.supervisor.cancel_token()).await
    }

    /// Graceful shutdown
    pub async fn shutdown(&self) {
        info!(target: "WHALEWATCH", "Shutting down...");
        self.supervisor.shutdown().await;
        info!(target: "WHALEWATCH", "✅ Shutdown complete");
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(target: "WHALEWATCH", "Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(target: "WHALEWATCH", "Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logger();

    let whalewatch = match WhaleWatch::new() {
        Ok(app) => app,
        Err(e) => {
            error!(target: "WHALEWATCH", "Failed to initialize: {:#}", e);
            return Err(e);
        }
    };

    let result = tokio::select! {
        result = whalewatch.start() => result,
        _ = shutdown_signal() => Ok(()),
    };

    if let Err(e) = &result {
        error!(target: "WHALEWATCH", "Fatal error: {:#}", e);
    }

    whalewatch.shutdown().await;
    result
}
