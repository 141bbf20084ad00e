use std::sync::Arc;

use crate::config::Config;
use crate::interview::orchestrator::Orchestrator;
use crate::log_store::LogStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub orchestrator: Arc<Orchestrator>,
    /// Same store the orchestrator writes to; handlers use it for read queries.
    pub log_store: Arc<dyn LogStore>,
}
