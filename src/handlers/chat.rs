use axum::{
    Json,
    body::Bytes,
    extract::{State, rejection::BytesRejection},
    http::HeaderMap,
};
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, warn};

use crate::error::ChatError;
use crate::gate::client_id;
use crate::metrics::{CHAT_ERRORS, REQUEST_LATENCY, REQUEST_TOTAL, TRACKED_CLIENTS};
use crate::models::{ChatReply, chat_message};
use crate::state::AppState;

// The body is taken raw so the rate limit is charged before parsing, and so
// an oversized body still gets a themed reply
pub async fn chat_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<ChatReply>, ChatError> {
    REQUEST_TOTAL.inc();
    let start_time = Instant::now();
    let client = client_id(&headers);

    let result = handle_chat(&state, &client, body).await;

    REQUEST_LATENCY.observe(start_time.elapsed().as_secs_f64());
    if let Err(err) = &result {
        CHAT_ERRORS.with_label_values(&[err.kind()]).inc();
    }

    result.map(Json)
}

async fn handle_chat(
    state: &AppState,
    client: &str,
    body: Result<Bytes, BytesRejection>,
) -> Result<ChatReply, ChatError> {
    let now = Instant::now();

    let body = match body {
        Ok(body) => body,
        Err(rejection) => {
            state.gate.throttle(client, now)?;
            warn!(client, status = %rejection.status(), "unreadable chat request body: {rejection}");
            return Err(ChatError::InvalidInput);
        }
    };

    let decision = match serde_json::from_slice::<Value>(&body) {
        Ok(value) => state.gate.admit(client, chat_message(&value), now),
        Err(e) => {
            state.gate.throttle(client, now)?;
            error!(client, error = %e, "chat request body is not JSON");
            return Err(ChatError::Unexpected(e.to_string()));
        }
    };
    TRACKED_CLIENTS.set(state.gate.limiter().tracked_clients() as f64);

    let message = decision.into_result()?;
    state.forwarder.forward(&message).await
}
