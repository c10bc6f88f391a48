//! Shared services used by every monitor

pub mod alerts;
pub mod gateway;
pub mod health;
pub mod history;
pub mod logger;
pub mod metrics;

pub use alerts::{AlertEvent, AlertService, SignalType};
pub use gateway::{DataGateway, HttpTransport, RetryPolicy, Transport};
pub use health::HealthTracker;
pub use history::HistoryStore;
pub use logger::init_logger;
pub use metrics::MetricsService;
