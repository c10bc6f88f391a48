//! Whale Watcher - Flags holders with an outsized share of supply

use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, info};

use super::monitor::{CycleReport, CycleTally, Monitor, MonitorContext, SupplyCache};
use crate::config::MonitorConfig;
use crate::error::{GatewayError, MonitorError};
use crate::utils::gateway::{shorten_address, Holder};
use crate::utils::{AlertEvent, SignalType};

/// Scans the largest holders of each target every cycle.
///
/// A holder above `whale_threshold` of supply is reported on every scan; there
/// is no per-holder dedupe.
pub struct WhaleWatcher {
    targets: Vec<String>,
    supplies: SupplyCache,
}

impl WhaleWatcher {
    pub const NAME: &'static str = "whale";

    pub fn new(targets: Vec<String>) -> Self {
        Self {
            targets,
            supplies: SupplyCache::new(),
        }
    }

    async fn scan(&self, ctx: &MonitorContext, config: &MonitorConfig, target: &str) -> Result<usize, GatewayError> {
        let supply = self.supplies.get_or_fetch(&ctx.gateway, target).await?;
        let holders = ctx.gateway.top_holders(target, config.top_holders_limit).await?;

        if supply <= 0.0 || !supply.is_finite() {
            debug!(target: "WHALE_WATCHER", "Unusable supply {} for {}", supply, target);
            return Ok(0);
        }

        let whales: Vec<(&Holder, f64)> = holders
            .iter()
            .map(|h| (h, h.amount / supply))
            .filter(|(_, share)| *share > config.whale_threshold)
            .collect();

        for (holder, share) in &whales {
            let message = format!(
                "Whale Alert: {} holds {:.2}% of supply ({:.2} tokens)!",
                shorten_address(&holder.address, 4),
                share * 100.0,
                holder.amount
            );
            ctx.emit(AlertEvent::new(
                Self::NAME,
                target,
                SignalType::WhaleConcentration,
                *share,
                message,
            ))
            .await;
        }

        if !whales.is_empty() {
            info!(
                target: "WHALE_WATCHER",
                "🐋 {} whale(s) among top {} holders of {}",
                whales.len(),
                holders.len(),
                shorten_address(target, 4)
            );
        }

        Ok(whales.len())
    }
}

#[async_trait]
impl Monitor for WhaleWatcher {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn interval(&self, config: &MonitorConfig) -> Duration {
        Duration::from_secs(config.check_interval.whale)
    }

    async fn cycle(&self, ctx: &MonitorContext, config: &MonitorConfig) -> Result<CycleReport, MonitorError> {
        let mut tally = CycleTally::default();

        for target in &self.targets {
            match self.scan(ctx, config, target).await {
                Ok(alerts) => tally.evaluated(alerts),
                Err(e) => tally.failed(Self::NAME, target, e),
            }
        }

        tally.finish()
    }
}
