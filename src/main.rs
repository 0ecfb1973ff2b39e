use clap::Parser; // for cli
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod error;
mod filter;
mod forwarder;
mod gate;
mod handlers;
mod metrics;
mod models;
mod persona;
mod rate_limit;
mod state;

use config::Args;
use filter::ContentFilter;
use forwarder::{CompletionForwarder, OpenAiBackend};
use gate::RequestGate;
use rate_limit::{FixedWindowLimiter, RateLimiter};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env is optional, real env vars win
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "pawpaw_gateway=info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let limiter: Arc<dyn RateLimiter> = Arc::new(FixedWindowLimiter::new(
        args.rate_limit,
        Duration::from_secs(args.rate_window),
    ));
    let filter = ContentFilter::new(&args.denylist);
    let blocked_terms = filter.term_count();
    let backend = OpenAiBackend::new(&args.upstream_url, Duration::from_secs(args.upstream_timeout))?;

    let state = Arc::new(AppState {
        gate: RequestGate::new(Arc::clone(&limiter), filter, args.max_message_len),
        forwarder: CompletionForwarder::new(Arc::new(backend), args.api_key(), args.model.clone()),
    });

    if !state.forwarder.has_credentials() {
        warn!("OPENAI_API_KEY is not set, every chat will get the missing-key reply");
    }

    // spawn the rate limit sweeper
    if args.sweep_interval > 0 {
        tokio::spawn(rate_limit::sweeper(limiter, Duration::from_secs(args.sweep_interval)));
    }

    let app = handlers::router(state);

    let addr = format!("0.0.0.0:{}", args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("Pawpaw gateway running on http://localhost:{}", args.port);
    info!(upstream = %args.upstream_url, model = %args.model, "forwarding chat completions");
    info!(
        "Rate limit: {} requests per {} seconds, {} blocked terms, max {} chars",
        args.rate_limit,
        args.rate_window,
        blocked_terms,
        args.max_message_len
    );

    axum::serve(listener, app).await?;
    Ok(())
}
