use lazy_static::lazy_static;
use prometheus::{
    Counter, CounterVec, Gauge, Histogram, register_counter, register_counter_vec, register_gauge,
    register_histogram,
};


lazy_static! {
    pub static ref REQUEST_TOTAL: Counter =
        register_counter!("pawpaw_chat_requests_total", "Total number of chat requests").unwrap();
    pub static ref CHAT_ERRORS: CounterVec = register_counter_vec!(
        "pawpaw_chat_errors_total",
        "Chat requests answered with an error status, by kind",
        &["kind"]
    )
    .unwrap();
    pub static ref UPSTREAM_FAILURES: Counter = register_counter!(
        "pawpaw_upstream_failures_total",
        "Upstream calls that failed or returned a non-success status"
    )
    .unwrap();
    pub static ref FALLBACK_REPLIES: Counter = register_counter!(
        "pawpaw_fallback_replies_total",
        "Themed fallback replies sent in place of a model reply"
    )
    .unwrap();
    pub static ref REQUEST_LATENCY: Histogram = register_histogram!(
        "pawpaw_chat_latency_seconds",
        "Chat request latency in seconds"
    )
    .unwrap();
    pub static ref TRACKED_CLIENTS: Gauge =
        register_gauge!("pawpaw_rate_limit_clients", "Client identifiers with rate limit state").unwrap();
}
