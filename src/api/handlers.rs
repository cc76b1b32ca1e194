//! Webhook request handling.
//!
//! Telegram retries a webhook delivery until it sees a 2xx, so the handler
//! acknowledges immediately and hands the update to the dispatcher on a
//! background task. Slow intent lookups never stall the webhook queue.

use super::AppState;
use crate::telegram::Update;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tower_http::trace::TraceLayer;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/webhook/:token", post(receive_update))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn receive_update(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Json(update): Json<Update>,
) -> StatusCode {
    if token != *state.telegram_token {
        tracing::warn!("webhook request with wrong token");
        return StatusCode::NOT_FOUND;
    }

    tracing::debug!(update_id = update.update_id, "webhook update");
    let dispatcher = state.dispatcher.clone();
    tokio::spawn(async move {
        dispatcher.handle_update(update).await;
    });
    StatusCode::OK
}

async fn health() -> StatusCode {
    StatusCode::OK
}
