//! WhaleWatch signal monitors

pub mod creator_monitor;
pub mod liquidity_monitor;
pub mod market_cap_monitor;
pub mod monitor;
pub mod price_monitor;
pub mod transaction_monitor;
pub mod whale_watcher;

use std::sync::Arc;

pub use creator_monitor::CreatorMonitor;
pub use liquidity_monitor::LiquidityMonitor;
pub use market_cap_monitor::MarketCapMonitor;
pub use monitor::{run_monitor, CycleReport, Monitor, MonitorContext};
pub use price_monitor::PriceMonitor;
pub use transaction_monitor::TransactionMonitor;
pub use whale_watcher::WhaleWatcher;

/// The full monitor set for the given targets
pub fn default_monitors(targets: &[String], creators: &[String]) -> Vec<Arc<dyn Monitor>> {
    vec![
        Arc::new(PriceMonitor::new(targets.to_vec())),
        Arc::new(LiquidityMonitor::new(targets.to_vec())),
        Arc::new(MarketCapMonitor::new(targets.to_vec())),
        Arc::new(WhaleWatcher::new(targets.to_vec())),
        Arc::new(TransactionMonitor::new(targets.to_vec())),
        Arc::new(CreatorMonitor::new(targets.to_vec(), creators.to_vec())),
    ]
}
