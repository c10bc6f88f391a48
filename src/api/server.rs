//! HTTP API for operators: health, live config, alerts, history, metrics

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::config::{ConfigStore, MonitorConfig};
use crate::utils::health::MonitorHealth;
use crate::utils::history::WalletHistoryEntry;
use crate::utils::{AlertEvent, AlertService, HealthTracker, HistoryStore, MetricsService};

const DEFAULT_LIMIT: usize = 50;

/// Query params for list endpoints
#[derive(Debug, Deserialize)]
pub struct ListParams {
    limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: &'static str,
    uptime: f64,
    monitors: Vec<MonitorHealth>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ConfigStore>,
    pub health: Arc<HealthTracker>,
    pub history: Arc<HistoryStore>,
    pub alerts: Arc<AlertService>,
    pub metrics: Arc<MetricsService>,
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        .route("/api/config", get(get_config).post(update_config))
        .route("/api/alerts", get(get_alerts))
        .route("/api/history", get(get_history))
        .route("/metrics", get(get_metrics))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// API server
pub struct ApiServer {
    port: u16,
    state: AppState,
}

impl ApiServer {
    pub fn new(port: u16, state: AppState) -> Self {
        Self { port, state }
    }

    /// Serve until `shutdown` is cancelled
    pub async fn start(&self, shutdown: CancellationToken) -> anyhow::Result<()> {
        let app = router(self.state.clone());

        let addr = SocketAddr::from(([0, 0, 0, 0], self.port));
        let listener = tokio::net::TcpListener::bind(addr).await?;
        info!(target: "API", "✅ Operator API listening on http://localhost:{}", self.port);

        axum::serve(listener, app)
            .with_graceful_shutdown(async move { shutdown.cancelled().await })
            .await?;

        Ok(())
    }
}

// ============================================
// HANDLERS
// ============================================

async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let config = state.config.get();
    let monitors = state.health.report(config.stale_after());
    let status = if monitors.iter().any(|m| m.stale) {
        "degraded"
    } else {
        "healthy"
    };

    Json(HealthResponse {
        status,
        uptime: state.metrics.uptime_secs(),
        monitors,
    })
}

async fn get_config(State(state): State<AppState>) -> Json<MonitorConfig> {
    Json(state.config.get().as_ref().clone())
}

async fn update_config(State(state): State<AppState>, Json(partial): Json<Value>) -> Response {
    match state.config.update(partial) {
        Ok(config) => Json(config.as_ref().clone()).into_response(),
        Err(e) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse { error: e.to_string() }),
        )
            .into_response(),
    }
}

async fn get_alerts(State(state): State<AppState>, Query(params): Query<ListParams>) -> Json<Vec<AlertEvent>> {
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT);
    Json(state.alerts.get_recent_alerts(limit))
}

async fn get_history(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Json<Vec<WalletHistoryEntry>> {
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT);
    let mut wallets = state.history.snapshot();
    wallets.truncate(limit);
    Json(wallets)
}

async fn get_metrics(State(state): State<AppState>) -> Response {
    state.metrics.history_wallets.set(state.history.len() as f64);

    match state.metrics.get_metrics() {
        Ok(text) => ([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], text).into_response(),
        Err(e) => {
            error!(target: "API", "Failed to encode metrics: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
