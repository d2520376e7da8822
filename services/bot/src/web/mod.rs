pub mod handlers;
pub mod state;

use axum::routing::post;
use axum::Router;
use state::AppState;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

// Re-export the webhook handler to make it easily accessible
// to the binary that builds the web server router.
pub use handlers::webhook_handler;

/// Builds the webhook router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/webhook/{token}", post(webhook_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
