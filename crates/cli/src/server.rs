//! HTTP surface: block rewards, sync duties and Prometheus metrics.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use validator_api_rewards::{
    BlockReward, DutiesError, RewardError, RewardService, SyncDuties, SyncDutiesService,
};
use validator_api_telemetry::Metrics;

/// Shared handler state. Services are stateless, so clones are cheap handles.
#[derive(Clone)]
pub struct AppState {
    pub rewards: Arc<RewardService>,
    pub duties: Arc<SyncDutiesService>,
    pub metrics: Metrics,
}

/// Error rendered as `{"error": "<message>"}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: u16, message: String) -> Self {
        Self {
            status: StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            message,
        }
    }
}

impl From<RewardError> for ApiError {
    fn from(e: RewardError) -> Self {
        ApiError::new(e.status_code(), e.to_string())
    }
}

impl From<DutiesError> for ApiError {
    fn from(e: DutiesError) -> Self {
        ApiError::new(e.status_code(), e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

async fn block_reward(
    State(state): State<AppState>,
    Path(slot): Path<String>,
) -> Result<Json<BlockReward>, ApiError> {
    Ok(Json(state.rewards.block_reward(&slot).await?))
}

async fn sync_duties(
    State(state): State<AppState>,
    Path(slot): Path<String>,
) -> Result<Json<SyncDuties>, ApiError> {
    Ok(Json(state.duties.sync_duties(&slot).await?))
}

async fn metrics_handler(State(state): State<AppState>) -> Result<impl IntoResponse, StatusCode> {
    match state.metrics.gather() {
        Ok(body) => Ok((StatusCode::OK, body)),
        Err(_) => Err(StatusCode::INTERNAL_SERVER_ERROR),
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/blockreward/:slot", get(block_reward))
        .route("/syncduties/:slot", get(sync_duties))
        .route("/metrics", get(metrics_handler))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
