mod config;
mod db;
mod errors;
mod interview;
mod llm_client;
mod log_store;
mod models;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::interview::orchestrator::Orchestrator;
use crate::llm_client::{LlmClient, ModelGateway};
use crate::log_store::{InMemoryLogStore, LogStore, PgLogStore};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Interview API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize the log store: PostgreSQL when configured, otherwise in-process
    let log_store: Arc<dyn LogStore> = match &config.database_url {
        Some(url) => Arc::new(PgLogStore::new(create_pool(url).await?)),
        None => {
            warn!("DATABASE_URL not set; interview logs and sessions are kept in memory only");
            Arc::new(InMemoryLogStore::new())
        }
    };

    // Initialize LLM client
    let gateway: Arc<dyn ModelGateway> = Arc::new(LlmClient::new(
        config.anthropic_api_key.clone(),
        config.llm_timeout,
    )?);
    info!("LLM client initialized (model: {})", llm_client::MODEL);
    info!(
        "Question limits: {} technical, {} DSA",
        config.limits.technical_questions, config.limits.dsa_questions
    );

    let orchestrator = Arc::new(Orchestrator::new(
        gateway,
        Arc::clone(&log_store),
        config.limits,
    ));

    // Build app state
    let state = AppState {
        config: config.clone(),
        orchestrator,
        log_store,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the chat frontend has a fixed host

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
