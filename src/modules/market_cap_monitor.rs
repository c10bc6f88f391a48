//! Market Cap Monitor - Price times total supply

use async_trait::async_trait;
use std::time::Duration;

use super::monitor::{
    check_drift, BaselineTracker, CycleReport, CycleTally, Monitor, MonitorContext, ObservationSnapshot, SupplyCache,
};
use crate::config::MonitorConfig;
use crate::error::{GatewayError, MonitorError};
use crate::utils::SignalType;

/// Market cap tracker.
///
/// Supply is read once per target and reused, so the drift is driven by price
/// moves against a fixed supply.
pub struct MarketCapMonitor {
    targets: Vec<String>,
    supplies: SupplyCache,
    baselines: BaselineTracker,
}

impl MarketCapMonitor {
    pub const NAME: &'static str = "market_cap";

    pub fn new(targets: Vec<String>) -> Self {
        Self {
            targets,
            supplies: SupplyCache::new(),
            baselines: BaselineTracker::new(),
        }
    }

    pub fn snapshot(&self, target: &str) -> Option<ObservationSnapshot> {
        self.baselines.get(target)
    }

    async fn market_cap(&self, ctx: &MonitorContext, target: &str) -> Result<f64, GatewayError> {
        let supply = self.supplies.get_or_fetch(&ctx.gateway, target).await?;
        let market = ctx.gateway.market_snapshot(target).await?;
        Ok(market.price * supply)
    }
}

#[async_trait]
impl Monitor for MarketCapMonitor {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn interval(&self, config: &MonitorConfig) -> Duration {
        Duration::from_secs(config.check_interval.market_cap)
    }

    async fn cycle(&self, ctx: &MonitorContext, config: &MonitorConfig) -> Result<CycleReport, MonitorError> {
        let mut tally = CycleTally::default();

        for target in &self.targets {
            let market_cap = match self.market_cap(ctx, target).await {
                Ok(mc) => mc,
                Err(e) => {
                    tally.failed(Self::NAME, target, e);
                    continue;
                }
            };

            let alerts = check_drift(
                ctx,
                &self.baselines,
                config.baseline_mode,
                config.market_cap_change_threshold,
                Self::NAME,
                SignalType::MarketCap,
                target,
                market_cap,
                |obs| {
                    format!(
                        "Market Cap Alert: {:.2}% change! Current market cap: ${:.2} (was ${:.2})",
                        obs.change_percent, market_cap, obs.reference
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
    use crate::utils::gateway::testing::{pairs_json, supply_json, ScriptedTransport};
    use crate::utils::gateway::Endpoint;

    #[tokio::test]
    async fn test_market_cap_uses_cached_supply() {
        let transport = ScriptedTransport::new();
        let ctx = context(transport.clone(), MonitorConfig::default());
        let monitor = MarketCapMonitor::new(vec!["MINT".into()]);
        let config = ctx.config.get();

        transport.push(Endpoint::TokenSupply, "MINT", Ok(supply_json(1_000_000.0)));
        transport.push(Endpoint::TokenPairs, "MINT", Ok(pairs_json(0.5, 1.0, 1.0)));
        assert_eq!(monitor.cycle(&ctx, &config).await.unwrap().alerts, 0);
        assert_eq!(monitor.snapshot("MINT").unwrap().baseline, 500_000.0);

        transport.push(Endpoint::TokenPairs, "MINT", Ok(pairs_json(0.25, 1.0, 1.0)));
        assert_eq!(monitor.cycle(&ctx, &config).await.unwrap().alerts, 1);

        assert_eq!(transport.calls_to(Endpoint::TokenSupply).len(), 1);
        let alert = &ctx.alerts.get_recent_alerts(1)[0];
        assert_eq!(alert.signal_type, SignalType::MarketCap);
        assert_eq!(alert.observed_value, 250_000.0);
        assert_eq!(alert.percent_change, Some(-50.0));
    }

    #[tokio::test]
    async fn test_supply_failure_is_retried_next_cycle() {
        let transport = ScriptedTransport::new();
        let ctx = context(transport.clone(), MonitorConfig::default());
        let monitor = MarketCapMonitor::new(vec!["MINT".into()]);
        let config = ctx.config.get();

        assert!(monitor.cycle(&ctx, &config).await.is_err());

        transport.push(Endpoint::TokenSupply, "MINT", Ok(supply_json(10.0)));
        transport.push(Endpoint::TokenPairs, "MINT", Ok(pairs_json(2.0, 1.0, 1.0)));
        assert!(monitor.cycle(&ctx, &config).await.is_ok());
        assert_eq!(monitor.snapshot("MINT").unwrap().last, 20.0);
    }
}
