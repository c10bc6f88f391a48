//! Price Monitor - Alerts on large USD price moves

use async_trait::async_trait;
use std::time::Duration;

use super::monitor::{check_drift, BaselineTracker, CycleReport, CycleTally, Monitor, MonitorContext, ObservationSnapshot};
use crate::config::MonitorConfig;
use crate::error::MonitorError;
use crate::utils::SignalType;

/// Tracks the USD price of each target against its baseline
pub struct PriceMonitor {
    targets: Vec<String>,
    baselines: BaselineTracker,
}

impl PriceMonitor {
    pub const NAME: &'static str = "price";

    pub fn new(targets: Vec<String>) -> Self {
        Self {
            targets,
            baselines: BaselineTracker::new(),
        }
    }

    pub fn snapshot(&self, target: &str) -> Option<ObservationSnapshot> {
        self.baselines.get(target)
    }
}

#[async_trait]
impl Monitor for PriceMonitor {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn interval(&self, config: &MonitorConfig) -> Duration {
        Duration::from_secs(config.check_interval.price)
    }

    async fn cycle(&self, ctx: &MonitorContext, config: &MonitorConfig) -> Result<CycleReport, MonitorError> {
        let mut tally = CycleTally::default();

        for target in &self.targets {
            let market = match ctx.gateway.market_snapshot(target).await {
                Ok(m) => m,
                Err(e) => {
                    tally.failed(Self::NAME, target, e);
                    continue;
                }
            };

            let price = market.price;
            let alerts = check_drift(
                ctx,
                &self.baselines,
                config.baseline_mode,
                config.price_change_threshold,
                Self::NAME,
                SignalType::Price,
                target,
                price,
                |obs| {
                    format!(
                        "Price Alert: {:.2}% change! Current price: ${:.8} (was ${:.8})",
                        obs.change_percent, price, obs.reference
                    )
                },
            )
            .await;
            tally.evaluated(alerts);
        }

        tally.finish()
    }
}
