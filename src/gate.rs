use axum::http::HeaderMap;
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tracing::warn;

use crate::error::ChatError;
use crate::filter::ContentFilter;
use crate::rate_limit::RateLimiter;

// Shared bucket for callers that arrive without any client address header
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Outcome of running a request through the gate.
#[derive(Debug)]
pub enum GateDecision {
    Admitted(String),
    Rejected(ChatError),
}

impl GateDecision {
    pub fn into_result(self) -> Result<String, ChatError> {
        match self {
            GateDecision::Admitted(message) => Ok(message),
            GateDecision::Rejected(err) => Err(err),
        }
    }
}

/// Rate limiting, validation and content filtering in front of the upstream call.
pub struct RequestGate {
    limiter: Arc<dyn RateLimiter>,
    filter: ContentFilter,
    max_message_len: usize,
}

impl RequestGate {
    pub fn new(limiter: Arc<dyn RateLimiter>, filter: ContentFilter, max_message_len: usize) -> Self {
        Self {
            limiter,
            filter,
            max_message_len,
        }
    }

    pub fn limiter(&self) -> Arc<dyn RateLimiter> {
        Arc::clone(&self.limiter)
    }

    /// Charges one request to `client`. Runs before the body is even parsed,
    /// so malformed requests still count against the window.
    pub fn throttle(&self, client: &str, now: Instant) -> Result<(), ChatError> {
        if self.limiter.check(client, now) {
            return Ok(());
        }
        warn!(client, "rate limit exceeded");
        Err(ChatError::RateLimited {
            client: client.to_string(),
        })
    }

    /// Validates the raw `message` field. A denylisted term wins over a
    /// length violation; a missing, non-string or empty message is invalid.
    /// Length is counted in UTF-16 code units, the unit browsers count in.
    pub fn validate(&self, client: &str, message: Option<&Value>) -> Result<String, ChatError> {
        let message = match message {
            Some(Value::String(m)) if !m.is_empty() => m,
            _ => return Err(ChatError::InvalidInput),
        };

        if let Some(term) = self.filter.find_blocked(message) {
            warn!(client, term, "blocked message");
            return Err(ChatError::BlockedContent {
                term: term.to_string(),
            });
        }

        if message.encode_utf16().count() > self.max_message_len {
            return Err(ChatError::InvalidInput);
        }

        Ok(message.clone())
    }

    pub fn admit(&self, client: &str, message: Option<&Value>, now: Instant) -> GateDecision {
        let checked = self
            .throttle(client, now)
            .and_then(|_| self.validate(client, message));
        match checked {
            Ok(message) => GateDecision::Admitted(message),
            Err(err) => GateDecision::Rejected(err),
        }
    }
}

// Client identifier: first x-forwarded-for hop, then x-real-ip, then "unknown"
pub fn client_id(headers: &HeaderMap) -> String {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    let real_ip = || {
        headers
            .get("x-real-ip")
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    forwarded
        .or_else(real_ip)
        .unwrap_or(UNKNOWN_CLIENT)
        .to_string()
}
