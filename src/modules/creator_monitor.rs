//! Creator Monitor - Detects new tokens launched by watched creators

use async_trait::async_trait;
use dashmap::{DashMap, DashSet};
use std::time::Duration;
use tracing::{info, warn};

use super::monitor::{CycleReport, CycleTally, Monitor, MonitorContext};
use crate::config::MonitorConfig;
use crate::error::{GatewayError, MonitorError};
use crate::utils::gateway::{shorten_address, top_holder_concentration};
use crate::utils::{AlertEvent, SignalType};

const CONCENTRATION_HOLDERS: usize = 10;

/// What we could learn about a freshly discovered token
#[derive(Debug, Clone, PartialEq)]
pub struct TokenDiscovery {
    pub id: String,
    pub creator: String,
    pub name: Option<String>,
    pub symbol: Option<String>,
    pub price: Option<f64>,
    pub liquidity_usd: Option<f64>,
    pub volume_24h: Option<f64>,
    /// Percent of supply held by the ten largest holders
    pub top_holder_concentration: Option<f64>,
    pub mint_authority: Option<String>,
    pub freeze_authority: Option<String>,
}

impl TokenDiscovery {
    fn message(&self) -> String {
        let usd = |v: Option<f64>| v.map(|v| format!("${:.2}", v)).unwrap_or_else(|| "n/a".to_string());
        let authority = |a: &Option<String>| {
            a.as_deref()
                .map(|a| shorten_address(a, 4))
                .unwrap_or_else(|| "renounced".to_string())
        };

        format!(
            "New token from creator {}: {} ({})\nMint: {}\nPrice: {}\nLiquidity: {}\n24h Volume: {}\nTop {} holders: {}\nMint authority: {}\nFreeze authority: {}",
            shorten_address(&self.creator, 4),
            self.name.as_deref().unwrap_or("Unknown"),
            self.symbol.as_deref().unwrap_or("?"),
            self.id,
            self.price.map(|p| format!("${:.8}", p)).unwrap_or_else(|| "not listed".to_string()),
            usd(self.liquidity_usd),
            usd(self.volume_24h),
            CONCENTRATION_HOLDERS,
            self.top_holder_concentration
                .map(|c| format!("{:.2}%", c))
                .unwrap_or_else(|| "n/a".to_string()),
            authority(&self.mint_authority),
            authority(&self.freeze_authority),
        )
    }
}

/// Watches creators for tokens not seen before.
///
/// Creators come from configuration, or else from the mint authority of each
/// target. A token is marked seen only once its discovery alert went out.
pub struct CreatorMonitor {
    targets: Vec<String>,
    configured: Vec<String>,
    resolved: DashMap<String, Option<String>>,
    seen: DashSet<String>,
}

impl CreatorMonitor {
    pub const NAME: &'static str = "creator";

    pub fn new(targets: Vec<String>, creators: Vec<String>) -> Self {
        Self {
            targets,
            configured: creators,
            resolved: DashMap::new(),
            seen: DashSet::new(),
        }
    }

    pub fn is_seen(&self, token: &str) -> bool {
        self.seen.contains(token)
    }

    async fn creators(&self, ctx: &MonitorContext, tally: &mut CycleTally) -> Vec<String> {
        if !self.configured.is_empty() {
            return self.configured.clone();
        }

        let mut creators = Vec::new();
        for target in &self.targets {
            let cached = self.resolved.get(target).map(|c| c.value().clone());
            let authority = match cached {
                Some(cached) => cached,
                None => match ctx.gateway.mint_info(target).await {
                    Ok(info) => {
                        match &info.mint_authority {
                            Some(a) => info!(target: "CREATOR_MONITOR", "Creator of {} is {}", target, a),
                            None => info!(target: "CREATOR_MONITOR", "{} has no mint authority, nothing to watch", target),
                        }
                        self.resolved.insert(target.clone(), info.mint_authority.clone());
                        info.mint_authority
                    }
                    Err(e) => {
                        tally.failed(Self::NAME, target, e);
                        continue;
                    }
                },
            };

            if let Some(creator) = authority {
                if !creators.contains(&creator) {
                    creators.push(creator);
                }
            }
        }
        creators
    }

    async fn discover(&self, ctx: &MonitorContext, creator: &str, id: &str) -> Result<TokenDiscovery, GatewayError> {
        let market = optional(ctx.gateway.market_snapshot(id).await)?;
        let supply = optional(ctx.gateway.token_supply(id).await)?;
        let holders = optional(ctx.gateway.top_holders(id, CONCENTRATION_HOLDERS).await)?;
        let mint = optional(ctx.gateway.mint_info(id).await)?;

        let top_holder_concentration = match (&holders, supply) {
            (Some(holders), Some(supply)) => top_holder_concentration(holders, supply, CONCENTRATION_HOLDERS),
            _ => None,
        };
        let (mint_authority, freeze_authority) = mint
            .map(|m| (m.mint_authority, m.freeze_authority))
            .unwrap_or((None, None));

        Ok(TokenDiscovery {
            id: id.to_string(),
            creator: creator.to_string(),
            name: market.as_ref().and_then(|m| m.name.clone()),
            symbol: market.as_ref().and_then(|m| m.symbol.clone()),
            price: market.as_ref().map(|m| m.price),
            liquidity_usd: market.as_ref().map(|m| m.liquidity_usd),
            volume_24h: market.as_ref().map(|m| m.volume_24h),
            top_holder_concentration,
            mint_authority,
            freeze_authority,
        })
    }

    async fn scan_creator(&self, ctx: &MonitorContext, creator: &str) -> Result<usize, GatewayError> {
        let tokens = ctx.gateway.creator_tokens(creator).await?;
        let mut alerts = 0;

        for id in tokens {
            if self.seen.contains(&id) || self.targets.contains(&id) {
                continue;
            }

            let discovery = match self.discover(ctx, creator, &id).await {
                Ok(d) => d,
                Err(e) => {
                    warn!(target: "CREATOR_MONITOR", "Could not inspect new token {}: {}", id, e);
                    continue;
                }
            };

            ctx.emit(AlertEvent::new(
                Self::NAME,
                &id,
                SignalType::CreatorToken,
                discovery.price.unwrap_or(0.0),
                discovery.message(),
            ))
            .await;
            self.seen.insert(id);
            alerts += 1;
        }

        Ok(alerts)
    }
}

/// Permanent failures leave a field empty; retryable ones abort the discovery
fn optional<T>(result: Result<T, GatewayError>) -> Result<Option<T>, GatewayError> {
    match result {
        Ok(v) => Ok(Some(v)),
        Err(e) if e.is_retryable() => Err(e),
        Err(_) => Ok(None),
    }
}

#[async_trait]
impl Monitor for CreatorMonitor {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn interval(&self, config: &MonitorConfig) -> Duration {
        Duration::from_secs(config.check_interval.creator)
    }

    async fn cycle(&self, ctx: &MonitorContext, _config: &MonitorConfig) -> Result<CycleReport, MonitorError> {
        let mut tally = CycleTally::default();

        for creator in self.creators(ctx, &mut tally).await {
            match self.scan_creator(ctx, &creator).await {
                Ok(alerts) => tally.evaluated(alerts),
                Err(e) => tally.failed(Self::NAME, &creator, e),
            }
        }

        tally.finish()
    }
}
