//! Transaction Monitor - Large transfers and repeat receivers

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::time::Duration;

use super::monitor::{CycleReport, CycleTally, Monitor, MonitorContext, SupplyCache};
use crate::config::MonitorConfig;
use crate::error::{GatewayError, MonitorError};
use crate::utils::gateway::shorten_address;
use crate::utils::history::HistoryTransaction;
use crate::utils::{AlertEvent, SignalType};

/// Signatures remembered for alert dedupe
const MAX_SEEN_SIGNATURES: usize = 10_000;

/// Scans recent transfers of each target.
///
/// Every newly seen transfer is recorded in the shared history store. Transfers
/// larger than `whale_threshold` of supply alert once per signature, even after
/// the receiving wallet was evicted from history; the alert carries how often
/// the receiving wallet has been seen.
pub struct TransactionMonitor {
    targets: Vec<String>,
    supplies: SupplyCache,
    alerted: DashMap<String, DateTime<Utc>>,
}

impl TransactionMonitor {
    pub const NAME: &'static str = "transactions";

    pub fn new(targets: Vec<String>) -> Self {
        Self {
            targets,
            supplies: SupplyCache::new(),
            alerted: DashMap::new(),
        }
    }

    /// True the first time `signature` is marked
    fn mark_alerted(&self, signature: &str) -> bool {
        if self.alerted.insert(signature.to_string(), Utc::now()).is_some() {
            return false;
        }

        // Keep only the most recent signatures
        if self.alerted.len() > MAX_SEEN_SIGNATURES {
            let oldest = self
                .alerted
                .iter()
                .min_by_key(|e| *e.value())
                .map(|e| e.key().clone());
            if let Some(oldest) = oldest {
                self.alerted.remove(&oldest);
            }
        }
        true
    }

    async fn scan(&self, ctx: &MonitorContext, config: &MonitorConfig, target: &str) -> Result<usize, GatewayError> {
        let supply = self.supplies.get_or_fetch(&ctx.gateway, target).await?;
        let mut transfers = ctx
            .gateway
            .recent_transactions(target, config.transaction_scan_limit)
            .await?;
        transfers.sort_by_key(|t| t.timestamp);

        let large_amount = config.whale_threshold * supply;
        let mut alerts = 0;

        for transfer in transfers {
            let outcome = ctx.history.record(
                &transfer.wallet,
                HistoryTransaction {
                    timestamp: transfer.timestamp,
                    amount: transfer.amount,
                    signature: transfer.signature.clone(),
                },
            );
            if !outcome.is_new || transfer.amount <= large_amount || !self.mark_alerted(&transfer.signature) {
                continue;
            }

            let share = if supply > 0.0 { transfer.amount / supply * 100.0 } else { 0.0 };
            let repeat = if outcome.transaction_count > 1 { " Repeat receiver!" } else { "" };
            let message = format!(
                "Large Transaction: {:.2} tokens ({:.2}% of supply) to {}. Wallet seen {} time(s).{} Tx: {}",
                transfer.amount,
                share,
                shorten_address(&transfer.wallet, 4),
                outcome.transaction_count,
                repeat,
                transfer.signature
            );
            ctx.emit(AlertEvent::new(
                Self::NAME,
                target,
                SignalType::LargeTransaction,
                transfer.amount,
                message,
            ))
            .await;
            alerts += 1;
        }

        Ok(alerts)
    }
}

#[async_trait]
impl Monitor for TransactionMonitor {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn interval(&self, config: &MonitorConfig) -> Duration {
        Duration::from_secs(config.check_interval.transactions)
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
