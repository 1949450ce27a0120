//! HTTP API for the moderation engine

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::error::{ModerationError, Result};
use crate::moderation::{ModerationVerdict, Moderator};
use crate::spam::HeuristicScore;

/// Largest number of messages accepted by one batch request
pub const MAX_BATCH_SIZE: usize = 100;

/// Application state
pub struct AppState {
    pub moderator: Arc<Moderator>,
}

/// Moderate request
#[derive(Debug, Deserialize)]
pub struct ModerateRequest {
    pub text: String,
}

/// Batch moderate request
#[derive(Debug, Deserialize)]
pub struct BatchModerateRequest {
    pub texts: Vec<String>,
}

/// Batch moderate response
#[derive(Debug, Serialize, Deserialize)]
pub struct BatchModerateResponse {
    pub verdicts: Vec<ModerationVerdict>,
}

/// Build the API router
pub fn router(moderator: Arc<Moderator>) -> Router {
    let state = Arc::new(AppState { moderator });

    Router::new()
        .route("/health", get(health_check))
        .route("/moderate", post(moderate))
        .route("/moderate/batch", post(moderate_batch))
        .route("/score", post(score))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// API Server
pub struct ApiServer {
    router: Router,
    addr: String,
}

impl ApiServer {
    pub fn new(moderator: Arc<Moderator>, addr: impl Into<String>) -> Self {
        Self {
            router: router(moderator),
            addr: addr.into(),
        }
    }

    /// Serve until the process is stopped
    pub async fn run(self) -> Result<()> {
        let listener = tokio::net::TcpListener::bind(&self.addr).await?;
        info!("Moderation API listening on http://{}", self.addr);

        axum::serve(listener, self.router)
            .await
            .map_err(|e| ModerationError::Server(e.to_string()))
    }
}

/// Health check endpoint
async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "moderation-rs",
        "version": env!("CARGO_PKG_VERSION"),
        "model": state.moderator.model_name(),
    }))
}

/// Moderate a single message
async fn moderate(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ModerateRequest>,
) -> Json<ModerationVerdict> {
    Json(state.moderator.moderate(&payload.text).await)
}

/// Moderate several messages
async fn moderate_batch(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<BatchModerateRequest>,
) -> std::result::Result<Json<BatchModerateResponse>, (StatusCode, String)> {
    if payload.texts.len() > MAX_BATCH_SIZE {
        return Err((
            StatusCode::PAYLOAD_TOO_LARGE,
            format!("at most {} texts per batch", MAX_BATCH_SIZE),
        ));
    }

    let verdicts = state.moderator.moderate_batch(&payload.texts).await;
    Ok(Json(BatchModerateResponse { verdicts }))
}

/// Heuristic score only, no external call
async fn score(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ModerateRequest>,
) -> Json<HeuristicScore> {
    Json(state.moderator.heuristic_score(&payload.text))
}
