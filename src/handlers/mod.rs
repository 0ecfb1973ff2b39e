mod chat;
mod health;
mod metrics;

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

use crate::state::AppState;

pub use chat::chat_handler;
pub use health::health_handler;
pub use metrics::metrics_handler;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/chat", post(chat_handler))
        .route("/api/chat", post(chat_handler)) // path the widget calls
        .route("/metrics", get(metrics_handler))
        .with_state(state)
}
