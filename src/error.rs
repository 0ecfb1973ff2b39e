use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::models::ChatReply;
use crate::persona;

/// Every way a chat request can end without a model-generated reply.
///
/// Each variant renders as `{ "reply": ... }` with a themed string; the
/// detail carried in the variant is for server-side logs only.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("message missing, not a string, empty or too long")]
    InvalidInput,

    #[error("client {client} exceeded the request window")]
    RateLimited { client: String },

    #[error("message contains blocked term {term:?}")]
    BlockedContent { term: String },

    #[error("upstream API key is not configured")]
    MissingCredentials,

    #[error("upstream responded {status}: {body}")]
    Upstream { status: StatusCode, body: String },

    #[error("unexpected failure: {0}")]
    Unexpected(String),
}

impl ChatError {
    pub fn kind(&self) -> &'static str {
        match self {
            ChatError::InvalidInput => "invalid_input",
            ChatError::RateLimited { .. } => "rate_limited",
            ChatError::BlockedContent { .. } => "blocked",
            ChatError::MissingCredentials => "missing_credentials",
            ChatError::Upstream { .. } => "upstream",
            ChatError::Unexpected(_) => "unexpected",
        }
    }

    // Upstream failures mirror the upstream status
    pub fn status(&self) -> StatusCode {
        match self {
            ChatError::InvalidInput => StatusCode::BAD_REQUEST,
            ChatError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            ChatError::BlockedContent { .. } => StatusCode::FORBIDDEN,
            ChatError::MissingCredentials => StatusCode::INTERNAL_SERVER_ERROR,
            ChatError::Upstream { status, .. } => *status,
            ChatError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn reply(&self) -> &'static str {
        match self {
            ChatError::InvalidInput => persona::INVALID_INPUT_REPLY,
            ChatError::RateLimited { .. } => persona::RATE_LIMITED_REPLY,
            ChatError::BlockedContent { .. } => persona::BLOCKED_REPLY,
            ChatError::MissingCredentials => persona::MISSING_KEY_REPLY,
            ChatError::Upstream { .. } => persona::UPSTREAM_FAILURE_REPLY,
            ChatError::Unexpected(_) => persona::UNEXPECTED_REPLY,
        }
    }
}

impl From<reqwest::Error> for ChatError {
    fn from(err: reqwest::Error) -> Self {
        ChatError::Unexpected(err.to_string())
    }
}

impl IntoResponse for ChatError {
    fn into_response(self) -> Response {
        (self.status(), Json(ChatReply::new(self.reply()))).into_response()
    }
}
