mod config;
mod errors;
mod estimate;
mod gemini_client;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::estimate::poller::PollPolicy;
use crate::gemini_client::GeminiClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Salary Estimator v{}", env!("CARGO_PKG_VERSION"));

    // Initialize Gemini client (one per process, shared by every request)
    let gemini = GeminiClient::new(config.gemini_api_key.clone(), &config.gemini_api_base)
        .context("Failed to build Gemini HTTP client")?;
    info!("Gemini client initialized (model: {})", gemini_client::MODEL);

    let poll_policy = PollPolicy::from_config(&config);
    info!(
        "Readiness poll: every {:?}, at most {} checks within {:?}",
        poll_policy.interval, poll_policy.max_attempts, poll_policy.timeout
    );
    info!("Scratch directory: {}", config.scratch_dir.display());

    let state = AppState {
        gemini: Arc::new(gemini),
        config: config.clone(),
        poll_policy,
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
