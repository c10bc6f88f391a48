//! Liquidity Monitor - Watches pool liquidity for pulls and sudden inflows

use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

use super::monitor::{check_drift, BaselineTracker, CycleReport, CycleTally, Monitor, MonitorContext, ObservationSnapshot};
use crate::config::MonitorConfig;
use crate::error::MonitorError;
use crate::utils::SignalType;

pub struct LiquidityMonitor {
    targets: Vec<String>,
    baselines: BaselineTracker,
}

impl LiquidityMonitor {
    pub const NAME: &'static str = "liquidity";

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
impl Monitor for LiquidityMonitor {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn interval(&self, config: &MonitorConfig) -> Duration {
        Duration::from_secs(config.check_interval.liquidity)
    }

    async fn cycle(&self, ctx: &MonitorContext, config: &MonitorConfig) -> Result<CycleReport, MonitorError> {
        let mut tally = CycleTally::default();

        for target in &self.targets {
            let liquidity = match ctx.gateway.market_snapshot(target).await {
                Ok(m) => m.liquidity_usd,
                Err(e) => {
                    tally.failed(Self::NAME, target, e);
                    continue;
                }
            };
            debug!(target: "LIQUIDITY_MONITOR", "{} liquidity ${:.2}", target, liquidity);

            let alerts = check_drift(
                ctx,
                &self.baselines,
                config.baseline_mode,
                config.liquidity_change_threshold,
                Self::NAME,
                SignalType::Liquidity,
                target,
                liquidity,
                |obs| {
                    let direction = if obs.change_percent < 0.0 { "removed" } else { "added" };
                    format!(
                        "Liquidity Alert: {:.2}% change ({} ${:.2})! Current liquidity: ${:.2}",
                        obs.change_percent,
                        direction,
                        (liquidity - obs.reference).abs(),
                        liquidity
                    )
                },
            )
            .await;
            tally.evaluated(alerts);
        }

        tally.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::monitor::testing::context;
    use crate::utils::gateway::testing::{pairs_json, ScriptedTransport};
    use crate::utils::gateway::Endpoint;

    #[tokio::test]
    async fn test_liquidity_pull_alerts() {
        let transport = ScriptedTransport::new();
        let ctx = context(transport.clone(), MonitorConfig::default());
        let monitor = LiquidityMonitor::new(vec!["MINT".into()]);
        let config = ctx.config.get();

        transport.push(Endpoint::TokenPairs, "MINT", Ok(pairs_json(1.0, 10_000.0, 0.0)));
        assert_eq!(monitor.cycle(&ctx, &config).await.unwrap().alerts, 0);

        transport.push(Endpoint::TokenPairs, "MINT", Ok(pairs_json(1.0, 9_600.0, 0.0)));
        assert_eq!(monitor.cycle(&ctx, &config).await.unwrap().alerts, 0);

        transport.push(Endpoint::TokenPairs, "MINT", Ok(pairs_json(1.0, 4_000.0, 0.0)));
        assert_eq!(monitor.cycle(&ctx, &config).await.unwrap().alerts, 1);

        let alert = &ctx.alerts.get_recent_alerts(1)[0];
        assert_eq!(alert.signal_type, SignalType::Liquidity);
        assert_eq!(alert.observed_value, 4_000.0);
        assert!(alert.formatted_message.contains("removed $6000.00"));
    }

    #[tokio::test]
    async fn test_unlisted_pool_rearms_baseline() {
        let transport = ScriptedTransport::new();
        let ctx = context(transport.clone(), MonitorConfig::default());
        let monitor = LiquidityMonitor::new(vec!["MINT".into()]);
        let config = ctx.config.get();

        transport.push(Endpoint::TokenPairs, "MINT", Ok(pairs_json(1.0, 0.0, 0.0)));
        monitor.cycle(&ctx, &config).await.unwrap();
        transport.push(Endpoint::TokenPairs, "MINT", Ok(pairs_json(1.0, 5_000.0, 0.0)));

        assert_eq!(monitor.cycle(&ctx, &config).await.unwrap().alerts, 0);
        assert_eq!(monitor.snapshot("MINT").unwrap().baseline, 5_000.0);
    }
}
