use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::query_guard::validate_read_only;
use super::{InteractionLog, LogStore, LogStoreError};
use crate::interview::models::SessionState;
use crate::interview::profile::CandidateProfile;
use crate::models::interview::{CandidateRow, InterviewLogRow};

/// Process-local log store. Used when no `DATABASE_URL` is configured.
/// Appends serialize on the inner locks.
#[derive(Default)]
pub struct InMemoryLogStore {
    candidates: RwLock<Vec<CandidateRow>>,
    interactions: RwLock<Vec<InterviewLogRow>>,
    sessions: RwLock<HashMap<String, SessionState>>,
}

impl InMemoryLogStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn candidates(&self) -> Vec<CandidateRow> {
        self.candidates.read().await.clone()
    }

    pub async fn interactions(&self) -> Vec<InterviewLogRow> {
        self.interactions.read().await.clone()
    }
}

#[async_trait]
impl LogStore for InMemoryLogStore {
    async fn append_profile(
        &self,
        name: &str,
        resume_text: &str,
        profile: &CandidateProfile,
    ) -> Result<i64, LogStoreError> {
        let profile = serde_json::to_value(profile)?;
        let mut candidates = self.candidates.write().await;
        let id = candidates.len() as i64 + 1;
        candidates.push(CandidateRow {
            id,
            name: name.to_string(),
            resume_text: resume_text.to_string(),
            profile,
            created_at: Utc::now(),
        });
        Ok(id)
    }

    async fn append_interaction(&self, log: &InteractionLog) -> Result<(), LogStoreError> {
        let mut interactions = self.interactions.write().await;
        let id = interactions.len() as i64 + 1;
        interactions.push(InterviewLogRow {
            id,
            session_id: log.session_id.clone(),
            question: log.question.clone(),
            answer: log.answer.clone(),
            evaluation: log.evaluation.clone(),
            score: log.score,
            created_at: Utc::now(),
        });
        Ok(())
    }

    async fn query(&self, statement: &str) -> Result<Vec<serde_json::Value>, LogStoreError> {
        validate_read_only(statement)?;
        Err(LogStoreError::Unsupported(
            "SQL queries require a DATABASE_URL-backed store".to_string(),
        ))
    }

    async fn save_session(&self, state: &SessionState) -> Result<(), LogStoreError> {
        self.sessions
            .write()
            .await
            .insert(state.session_id.clone(), state.clone());
        Ok(())
    }

    async fn load_session(&self, session_id: &str) -> Result<Option<SessionState>, LogStoreError> {
        Ok(self.sessions.read().await.get(session_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_appends_assign_sequential_ids() {
        let store = InMemoryLogStore::new();
        let profile = CandidateProfile::default();
        assert_eq!(store.append_profile("A", "r", &profile).await.unwrap(), 1);
        assert_eq!(store.append_profile("B", "r", &profile).await.unwrap(), 2);
        assert_eq!(store.candidates().await[1].name, "B");
    }

    #[tokio::test]
    async fn test_interactions_are_kept_in_order() {
        let store = InMemoryLogStore::new();
        for score in [3, 9] {
            store
                .append_interaction(&InteractionLog {
                    session_id: "s".to_string(),
                    question: "q".to_string(),
                    answer: "a".to_string(),
                    evaluation: "e".to_string(),
                    score: Some(score),
                })
                .await
                .unwrap();
        }
        let rows = store.interactions().await;
        assert_eq!(rows.iter().map(|r| r.score).collect::<Vec<_>>(), vec![Some(3), Some(9)]);
    }

    #[tokio::test]
    async fn test_query_validates_before_reporting_unsupported() {
        let store = InMemoryLogStore::new();
        assert!(matches!(
            store.query("DELETE FROM candidates").await,
            Err(LogStoreError::ReadOnlyViolation(_))
        ));
        assert!(matches!(
            store.query("SELECT 1").await,
            Err(LogStoreError::Unsupported(_))
        ));
    }

    #[tokio::test]
    async fn test_session_snapshots_round_trip() {
        let store = InMemoryLogStore::new();
        let state = SessionState::new("abc");
        store.save_session(&state).await.unwrap();
        assert_eq!(store.load_session("abc").await.unwrap(), Some(state));
        assert_eq!(store.load_session("missing").await.unwrap(), None);
    }
}
