//! Alert events and the dispatcher that delivers them (Telegram + in-process subscribers)

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{debug, error, info};

use crate::config::Config;

const HISTORY_CAPACITY: usize = 1000;
const TELEGRAM_API_URL: &str = "https://api.telegram.org";

/// Which signal produced an alert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalType {
    Price,
    Liquidity,
    MarketCap,
    WhaleConcentration,
    LargeTransaction,
    CreatorToken,
}

impl SignalType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalType::Price => "price",
            SignalType::Liquidity => "liquidity",
            SignalType::MarketCap => "market_cap",
            SignalType::WhaleConcentration => "whale_concentration",
            SignalType::LargeTransaction => "large_transaction",
            SignalType::CreatorToken => "creator_token",
        }
    }

    fn emoji(&self) -> &'static str {
        match self {
            SignalType::Price => "🚨",
            SignalType::Liquidity => "💧",
            SignalType::MarketCap => "📊",
            SignalType::WhaleConcentration => "🐋",
            SignalType::LargeTransaction => "🚨",
            SignalType::CreatorToken => "🆕",
        }
    }
}

impl fmt::Display for SignalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An immutable threshold-breach event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertEvent {
    pub monitor_name: String,
    pub target: String,
    pub signal_type: SignalType,
    pub observed_value: f64,
    pub previous_value: Option<f64>,
    pub percent_change: Option<f64>,
    pub formatted_message: String,
    pub timestamp: DateTime<Utc>,
}

impl AlertEvent {
    pub fn new(
        monitor_name: &str,
        target: &str,
        signal_type: SignalType,
        observed_value: f64,
        formatted_message: String,
    ) -> Self {
        Self {
            monitor_name: monitor_name.to_string(),
            target: target.to_string(),
            signal_type,
            observed_value,
            previous_value: None,
            percent_change: None,
            formatted_message: format!("{} {}", signal_type.emoji(), formatted_message),
            timestamp: Utc::now(),
        }
    }

    pub fn with_change(mut self, previous_value: f64, percent_change: f64) -> Self {
        self.previous_value = Some(previous_value);
        self.percent_change = Some(percent_change);
        self
    }
}

/// Delivers alerts to the configured Telegram chat and to in-process subscribers.
///
/// Delivery is fire-and-forget: failures are logged and never reach the monitor.
pub struct AlertService {
    telegram: Option<TelegramTarget>,
    client: reqwest::Client,
    alert_history: RwLock<VecDeque<AlertEvent>>,
    alert_sender: broadcast::Sender<AlertEvent>,
}

struct TelegramTarget {
    api_url: String,
    bot_token: String,
    chat_id: String,
}

impl AlertService {
    /// Create a new alert service; Telegram requests share the gateway timeout
    pub fn new(config: &Config) -> reqwest::Result<Self> {
        let telegram = match (&config.telegram_bot_token, &config.telegram_chat_id) {
            (Some(token), Some(chat_id)) => {
                info!(target: "ALERTS", "Telegram delivery enabled");
                Some(TelegramTarget {
                    api_url: TELEGRAM_API_URL.to_string(),
                    bot_token: token.clone(),
                    chat_id: chat_id.clone(),
                })
            }
            _ => {
                info!(target: "ALERTS", "Telegram not configured, alerts are logged only");
                None
            }
        };

        Self::build(telegram, config.gateway_timeout)
    }

    /// Alert service that only records and broadcasts
    pub fn local() -> Self {
        Self::with_client(None, reqwest::Client::new())
    }

    fn build(telegram: Option<TelegramTarget>, timeout: Duration) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(telegram, client))
    }

    fn with_client(telegram: Option<TelegramTarget>, client: reqwest::Client) -> Self {
        let (alert_sender, _) = broadcast::channel(1000);
        Self {
            telegram,
            client,
            alert_history: RwLock::new(VecDeque::with_capacity(HISTORY_CAPACITY)),
            alert_sender,
        }
    }

    /// Subscribe to alerts
    pub fn subscribe(&self) -> broadcast::Receiver<AlertEvent> {
        self.alert_sender.subscribe()
    }

    /// Record, broadcast and deliver one alert
    pub async fn dispatch(&self, event: &AlertEvent) {
        {
            let mut history = self.alert_history.write();
            history.push_front(event.clone());
            history.truncate(HISTORY_CAPACITY);
        }

        let _ = self.alert_sender.send(event.clone());

        if let Some(telegram) = &self.telegram {
            if let Err(e) = self.send_telegram(telegram, &event.formatted_message).await {
                error!(target: "ALERTS", "Telegram send failed: {}", e);
            } else {
                debug!(target: "ALERTS", "Delivered {} alert for {}", event.signal_type, event.target);
            }
        }
    }

    async fn send_telegram(&self, telegram: &TelegramTarget, text: &str) -> reqwest::Result<()> {
        let url = format!("{}/bot{}/sendMessage", telegram.api_url, telegram.bot_token);
        let params = serde_json::json!({
            "chat_id": telegram.chat_id,
            "text": text,
            "disable_web_page_preview": true,
        });

        self.client
            .post(&url)
            .json(&params)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    /// Get recent alerts, newest first
    pub fn get_recent_alerts(&self, limit: usize) -> Vec<AlertEvent> {
        let history = self.alert_history.read();
        history.iter().take(limit).cloned().collect()
    }
}
