use async_trait::async_trait;
use sqlx::PgPool;
use tracing::info;

use super::query_guard::validate_read_only;
use super::{InteractionLog, LogStore, LogStoreError};
use crate::interview::models::SessionState;
use crate::interview::profile::CandidateProfile;
use crate::models::interview::InterviewSessionRow;

/// PostgreSQL-backed log store. Tables are created by the embedded
/// migrations applied by `db::create_pool`.
#[derive(Clone)]
pub struct PgLogStore {
    pool: PgPool,
}

impl PgLogStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LogStore for PgLogStore {
    async fn append_profile(
        &self,
        name: &str,
        resume_text: &str,
        profile: &CandidateProfile,
    ) -> Result<i64, LogStoreError> {
        let profile_json = serde_json::to_value(profile)?;
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO candidates (name, resume_text, profile) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(name)
        .bind(resume_text)
        .bind(&profile_json)
        .fetch_one(&self.pool)
        .await?;

        info!("Saved candidate {id} ({name})");
        Ok(id)
    }

    async fn append_interaction(&self, log: &InteractionLog) -> Result<(), LogStoreError> {
        sqlx::query(
            r#"
            INSERT INTO interview_logs (session_id, question, answer, evaluation, score)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(&log.session_id)
        .bind(&log.question)
        .bind(&log.answer)
        .bind(&log.evaluation)
        .bind(log.score)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn query(&self, statement: &str) -> Result<Vec<serde_json::Value>, LogStoreError> {
        let statement = validate_read_only(statement)?;

        // Wrap so any row shape comes back as one JSON array.
        let wrapped =
            format!("SELECT COALESCE(json_agg(q), '[]'::json) FROM ({statement}) AS q");

        let mut tx = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION READ ONLY")
            .execute(&mut *tx)
            .await?;
        let rows: serde_json::Value = sqlx::query_scalar(&wrapped).fetch_one(&mut *tx).await?;
        tx.rollback().await?;

        Ok(match rows {
            serde_json::Value::Array(items) => items,
            other => vec![other],
        })
    }

    async fn save_session(&self, state: &SessionState) -> Result<(), LogStoreError> {
        let snapshot = serde_json::to_value(state)?;
        sqlx::query(
            r#"
            INSERT INTO interview_sessions (id, stage, state)
            VALUES ($1, $2, $3)
            ON CONFLICT (id) DO UPDATE
                SET stage = EXCLUDED.stage, state = EXCLUDED.state, updated_at = NOW()
            "#,
        )
        .bind(&state.session_id)
        .bind(state.interview_stage.as_str())
        .bind(&snapshot)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn load_session(&self, session_id: &str) -> Result<Option<SessionState>, LogStoreError> {
        let row = sqlx::query_as::<_, InterviewSessionRow>(
            "SELECT * FROM interview_sessions WHERE id = $1",
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| serde_json::from_value(r.state).map_err(LogStoreError::from))
            .transpose()
    }
}
