//! Configuration module for WhaleWatch
//!
//! Two layers live here:
//! - [`Config`]: process environment (endpoints, credentials, targets). Read once
//!   at startup and never changed afterwards.
//! - [`MonitorConfig`]: thresholds and polling intervals. Held by a [`ConfigStore`]
//!   and replaceable at runtime through a partial JSON update.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::env;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::error::ConfigError;

/// What the baseline monitors compare an observation against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BaselineMode {
    /// First value observed since the process started
    Fixed,
    /// Value observed on the previous successful cycle
    Rolling,
}

impl FromStr for BaselineMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fixed" => Ok(BaselineMode::Fixed),
            "rolling" => Ok(BaselineMode::Rolling),
            other => Err(ConfigError::Env(format!("unknown baseline mode '{}'", other))),
        }
    }
}

/// Polling interval per signal, in seconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CheckIntervals {
    pub price: u64,
    pub liquidity: u64,
    pub whale: u64,
    pub transactions: u64,
    pub market_cap: u64,
    pub creator: u64,
}

impl Default for CheckIntervals {
    fn default() -> Self {
        Self {
            price: 300,
            liquidity: 600,
            whale: 1800,
            transactions: 60,
            market_cap: 300,
            creator: 900,
        }
    }
}

/// Runtime-mutable thresholds and intervals.
///
/// Values are not range-checked. A zero interval is accepted and makes the
/// monitor poll back-to-back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MonitorConfig {
    /// Percent move of price away from its baseline that raises an alert
    pub price_change_threshold: f64,
    /// Percent move of liquidity (USD) away from its baseline
    pub liquidity_change_threshold: f64,
    /// Percent move of market cap away from its baseline
    pub market_cap_change_threshold: f64,
    /// Fraction of total supply that makes a holder or a transfer a whale
    pub whale_threshold: f64,
    pub top_holders_limit: usize,
    pub transaction_scan_limit: usize,
    /// Retention window of the wallet history store
    pub history_max_age_hours: f64,
    /// A monitor that has not completed a cycle within this window is stale
    pub stale_after_minutes: u64,
    pub baseline_mode: BaselineMode,
    pub check_interval: CheckIntervals,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            price_change_threshold: 10.0,
            liquidity_change_threshold: 5.0,
            market_cap_change_threshold: 10.0,
            whale_threshold: 0.05,
            top_holders_limit: 20,
            transaction_scan_limit: 25,
            history_max_age_hours: 24.0,
            stale_after_minutes: 10,
            baseline_mode: BaselineMode::Fixed,
            check_interval: CheckIntervals::default(),
        }
    }
}

impl MonitorConfig {
    pub fn stale_after(&self) -> Duration {
        Duration::from_secs(self.stale_after_minutes.saturating_mul(60))
    }
}

/// Shared holder of the current [`MonitorConfig`].
///
/// Readers get a whole snapshot; writers swap the whole value. No per-field locking.
#[derive(Debug)]
pub struct ConfigStore {
    current: RwLock<Arc<MonitorConfig>>,
}

impl ConfigStore {
    pub fn new(config: MonitorConfig) -> Self {
        Self {
            current: RwLock::new(Arc::new(config)),
        }
    }

    /// Current configuration snapshot
    pub fn get(&self) -> Arc<MonitorConfig> {
        Arc::clone(&*self.current.read())
    }

    /// Replace the whole configuration
    pub fn replace(&self, config: MonitorConfig) {
        *self.current.write() = Arc::new(config);
        info!(target: "CONFIG", "Monitor config replaced");
    }

    /// Merge a partial JSON object into the current configuration.
    ///
    /// All-or-nothing: if the merged value does not deserialize (wrong type,
    /// unknown key) the current configuration is left untouched.
    pub fn update(&self, partial: Value) -> Result<Arc<MonitorConfig>, ConfigError> {
        if !partial.is_object() {
            return Err(ConfigError::NotAnObject);
        }

        let mut guard = self.current.write();
        let mut merged = serde_json::to_value(guard.as_ref())?;
        merge_json(&mut merged, partial);
        let next: MonitorConfig = serde_json::from_value(merged)?;

        *guard = Arc::new(next);
        info!(target: "CONFIG", "Monitor config updated: {:?}", **guard);
        Ok(Arc::clone(&*guard))
    }
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::new(MonitorConfig::default())
    }
}

fn merge_json(base: &mut Value, patch: Value) {
    match (base, patch) {
        (Value::Object(base), Value::Object(patch)) => {
            for (key, value) in patch {
                if value.is_object() {
                    if let Some(slot) = base.get_mut(&key) {
                        if slot.is_object() {
                            merge_json(slot, value);
                            continue;
                        }
                    }
                }
                base.insert(key, value);
            }
        }
        (base, patch) => *base = patch,
    }
}

/// Process configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    // Data providers (read-only)
    pub rpc_url: String,
    pub dexscreener_url: String,

    // Telegram alerts
    pub telegram_bot_token: Option<String>,
    pub telegram_chat_id: Option<String>,

    // Watched targets
    pub target_tokens: Vec<String>,
    pub creator_addresses: Vec<String>,

    // Gateway retry policy
    pub gateway_max_retries: u32,
    pub gateway_initial_delay: Duration,
    pub gateway_timeout: Duration,

    // Supervisor
    pub restart_cooldown: Duration,
    pub health_check_interval: Duration,

    pub baseline_mode: BaselineMode,

    // Operator API
    pub api_port: u16,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let target_tokens = env_list("TARGET_TOKENS");
        if target_tokens.is_empty() {
            return Err(ConfigError::Env("TARGET_TOKENS must list at least one token".into()));
        }

        let baseline_mode = match env::var("BASELINE_MODE") {
            Ok(v) => v.parse()?,
            Err(_) => BaselineMode::Fixed,
        };

        Ok(Self {
            rpc_url: env::var("SOLANA_RPC_URL")
                .unwrap_or_else(|_| "https://api.mainnet-beta.solana.com".to_string()),
            dexscreener_url: env::var("DEXSCREENER_API_URL")
                .unwrap_or_else(|_| "https://api.dexscreener.com".to_string()),

            telegram_bot_token: env::var("TELEGRAM_BOT_TOKEN").ok(),
            telegram_chat_id: env::var("TELEGRAM_CHAT_ID").ok(),

            target_tokens,
            creator_addresses: env_list("CREATOR_ADDRESSES"),

            gateway_max_retries: env_parse("GATEWAY_MAX_RETRIES", 3),
            gateway_initial_delay: Duration::from_millis(env_parse("GATEWAY_INITIAL_DELAY_MS", 1000)),
            gateway_timeout: Duration::from_secs(env_parse("GATEWAY_TIMEOUT_SECS", 15)),

            restart_cooldown: Duration::from_secs(env_parse("RESTART_COOLDOWN_SECS", 60)),
            health_check_interval: Duration::from_secs(env_parse("HEALTH_CHECK_INTERVAL_SECS", 60)),

            baseline_mode,

            api_port: env_parse("API_PORT", 3000),
        })
    }

    /// Initial monitor configuration for this process
    pub fn monitor_defaults(&self) -> MonitorConfig {
        MonitorConfig {
            baseline_mode: self.baseline_mode,
            ..MonitorConfig::default()
        }
    }
}

fn env_parse<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn env_list(key: &str) -> Vec<String> {
    env::var(key)
        .map(|v| {
            v.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}
