//! services/bot/src/web/handlers.rs
//!
//! The webhook entry point: Telegram POSTs each update to
//! `/webhook/{token}`, where the path token must match the configured bot
//! token. Processing happens in a spawned task so the platform gets its 200
//! immediately and never retries a slow upload.

use crate::dispatcher;
use crate::web::state::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use std::sync::Arc;
use teloxide::types::Update;
use tracing::warn;

pub async fn webhook_handler(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
    Json(update): Json<Update>,
) -> StatusCode {
    if token != state.config.bot_token {
        warn!("webhook call with a non-matching token");
        return StatusCode::NOT_FOUND;
    }

    tokio::spawn(dispatcher::dispatch(state, update));
    StatusCode::OK
}
