//! Error types for WhaleWatch

use thiserror::Error;

/// Errors surfaced by the data gateway after its own retry handling
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// Provider explicitly asked us to slow down (HTTP 429 or RPC rate-limit)
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// Timeout, connection failure or 5xx
    #[error("transient provider failure: {0}")]
    Transient(String),

    /// 4xx (other than rate-limit) or a body we could not understand
    #[error("permanent provider failure: {0}")]
    Permanent(String),
}

impl GatewayError {
    /// Whether the gateway should retry the call that produced this error
    pub fn is_retryable(&self) -> bool {
        matches!(self, GatewayError::RateLimited(_) | GatewayError::Transient(_))
    }

    /// Short label used for metrics
    pub fn kind(&self) -> &'static str {
        match self {
            GatewayError::RateLimited(_) => "rate_limited",
            GatewayError::Transient(_) => "transient",
            GatewayError::Permanent(_) => "permanent",
        }
    }
}

/// Errors produced while running one monitor cycle
#[derive(Error, Debug)]
pub enum MonitorError {
    /// Fetch failed after retries. The cycle is skipped, the loop continues.
    #[error("gateway error: {0}")]
    Gateway(#[from] GatewayError),

    /// Evaluation could not complete. Ends the monitor loop.
    #[error("evaluation error: {0}")]
    Evaluation(String),

    /// Anything else escaping a cycle. Ends the monitor loop.
    #[error("internal error: {0}")]
    Internal(String),
}

impl MonitorError {
    /// Errors the monitor loop absorbs itself instead of handing to the supervisor
    pub fn is_skippable(&self) -> bool {
        matches!(self, MonitorError::Gateway(_))
    }
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A partial update must be a JSON object
    #[error("config update must be a JSON object")]
    NotAnObject,

    /// The merged config did not match the expected shape
    #[error("invalid config: {0}")]
    Invalid(#[from] serde_json::Error),

    /// Bad or missing process environment
    #[error("environment error: {0}")]
    Env(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(GatewayError::RateLimited("429".into()).is_retryable());
        assert!(GatewayError::Transient("503".into()).is_retryable());
        assert!(!GatewayError::Permanent("404".into()).is_retryable());
    }

    #[test]
    fn test_only_gateway_errors_are_skippable() {
        assert!(MonitorError::from(GatewayError::Transient("timeout".into())).is_skippable());
        assert!(!MonitorError::Evaluation("bad".into()).is_skippable());
        assert!(!MonitorError::Internal("boom".into()).is_skippable());
    }
}
