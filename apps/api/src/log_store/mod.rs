//! Log Store: append-only persistence for candidate profiles, per-exchange
//! interview logs, and session snapshots, plus a constrained read query.
//!
//! Every write is best-effort. Nodes go through `LogSink`, which spawns the
//! write, attempts it once, and logs failures. Session snapshots are saved
//! inline by the orchestrator while it holds the session lock.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::interview::models::SessionState;
use crate::interview::profile::CandidateProfile;

pub mod memory;
pub mod postgres;
pub mod query_guard;

pub use memory::InMemoryLogStore;
pub use postgres::PgLogStore;

#[derive(Debug, Error)]
pub enum LogStoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Only read-only SELECT statements are allowed: {0}")]
    ReadOnlyViolation(String),

    #[error("Unsupported by this log store: {0}")]
    Unsupported(String),
}

/// One question/answer exchange. `score` is `None` when the answer could not
/// be scored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InteractionLog {
    pub session_id: String,
    pub question: String,
    pub answer: String,
    pub evaluation: String,
    pub score: Option<i16>,
}

#[async_trait]
pub trait LogStore: Send + Sync {
    /// Stores a parsed candidate profile. Returns the candidate id.
    async fn append_profile(
        &self,
        name: &str,
        resume_text: &str,
        profile: &CandidateProfile,
    ) -> Result<i64, LogStoreError>;

    async fn append_interaction(&self, log: &InteractionLog) -> Result<(), LogStoreError>;

    /// Runs a read-only statement and returns each row as a JSON object.
    async fn query(&self, statement: &str) -> Result<Vec<serde_json::Value>, LogStoreError>;

    /// Upserts the canonical snapshot of a session.
    async fn save_session(&self, state: &SessionState) -> Result<(), LogStoreError>;

    async fn load_session(&self, session_id: &str) -> Result<Option<SessionState>, LogStoreError>;
}

/// Fire-and-forget writer handed to stage nodes.
#[derive(Clone)]
pub struct LogSink {
    store: Arc<dyn LogStore>,
}

impl LogSink {
    pub fn new(store: Arc<dyn LogStore>) -> Self {
        Self { store }
    }

    pub fn record_profile(&self, name: String, resume_text: String, profile: CandidateProfile) {
        let store = Arc::clone(&self.store);
        tokio::spawn(async move {
            match store.append_profile(&name, &resume_text, &profile).await {
                Ok(id) => debug!("Saved candidate profile {id} for {name}"),
                Err(e) => warn!("Failed to save candidate profile for {name}: {e}"),
            }
        });
    }

    pub fn record_interaction(&self, log: InteractionLog) {
        let store = Arc::clone(&self.store);
        tokio::spawn(async move {
            if let Err(e) = store.append_interaction(&log).await {
                warn!(
                    "Failed to log interaction for session {}: {e}",
                    log.session_id
                );
            }
        });
    }
}
