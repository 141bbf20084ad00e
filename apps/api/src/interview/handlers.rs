use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::interview::models::{Message, SessionState};
use crate::interview::orchestrator::{AdvanceRequest, AdvanceResponse};
use crate::interview::profile::CandidateProfile;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct AnalyzeResumeRequest {
    #[serde(default)]
    pub session_id: Option<String>,
    pub resume_text: String,
}

#[derive(Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub candidate_profile: Option<CandidateProfile>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub history: Vec<Message>,
}

#[derive(Deserialize)]
pub struct LogQueryRequest {
    #[serde(alias = "query")]
    pub statement: String,
}

#[derive(Serialize)]
pub struct LogQueryResponse {
    pub rows: Vec<Value>,
    pub row_count: usize,
}

/// POST /api/v1/interview/analyze-resume
pub async fn handle_analyze_resume(
    State(state): State<AppState>,
    Json(req): Json<AnalyzeResumeRequest>,
) -> Result<Json<AdvanceResponse>, AppError> {
    let response = state
        .orchestrator
        .advance(AdvanceRequest {
            session_id: req.session_id,
            resume_text: Some(req.resume_text),
            ..Default::default()
        })
        .await?;
    Ok(Json(response))
}

/// POST /api/v1/interview/resume/upload
///
/// Multipart fields: `file` (PDF or plain text, required) and `session_id`
/// (optional).
pub async fn handle_resume_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<AdvanceResponse>, AppError> {
    let mut session_id = None;
    let mut resume_text = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "session_id" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("Invalid session_id: {e}")))?;
                session_id = Some(text.trim().to_string()).filter(|s| !s.is_empty());
            }
            "file" => {
                let file_name = field.file_name().unwrap_or("resume").to_string();
                let content_type = field.content_type().map(str::to_string);
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Failed to read upload: {e}")))?;
                info!("Received resume upload {file_name} ({} bytes)", data.len());
                resume_text = Some(extract_resume_text(data, content_type.as_deref()).await?);
            }
            _ => {}
        }
    }

    let resume_text = resume_text
        .ok_or_else(|| AppError::Validation("Missing 'file' field".to_string()))?;

    let response = state
        .orchestrator
        .advance(AdvanceRequest {
            session_id,
            resume_text: Some(resume_text),
            ..Default::default()
        })
        .await?;
    Ok(Json(response))
}

/// POST /api/v1/interview/chat
pub async fn handle_chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<AdvanceResponse>, AppError> {
    let response = state
        .orchestrator
        .advance(AdvanceRequest {
            session_id: req.session_id,
            candidate_profile: req.candidate_profile,
            message: req.message,
            history: req.history,
            resume_text: None,
        })
        .await?;
    Ok(Json(response))
}

/// GET /api/v1/interview/sessions/:session_id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionState>, AppError> {
    let session = state
        .orchestrator
        .session(&session_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Session {session_id} not found")))?;
    Ok(Json(session))
}

/// POST /api/v1/logs/query
pub async fn handle_log_query(
    State(state): State<AppState>,
    Json(req): Json<LogQueryRequest>,
) -> Result<Json<LogQueryResponse>, AppError> {
    let rows = state.log_store.query(&req.statement).await?;
    Ok(Json(LogQueryResponse {
        row_count: rows.len(),
        rows,
    }))
}

/// PDFs go through `pdf_extract` on the blocking pool; anything else must be
/// UTF-8 text.
async fn extract_resume_text(data: Bytes, content_type: Option<&str>) -> Result<String, AppError> {
    let is_pdf = content_type == Some("application/pdf") || data.starts_with(b"%PDF");
    if !is_pdf {
        return String::from_utf8(data.to_vec()).map_err(|_| {
            AppError::UnprocessableEntity("Resume must be a PDF or UTF-8 text file".to_string())
        });
    }

    let extracted = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&data))
        .await
        .map_err(|e| {
            warn!("PDF extraction task failed: {e}");
            AppError::UnprocessableEntity("Could not extract text from the PDF".to_string())
        })?;
    extracted.map_err(|e| {
        warn!("PDF text extraction failed: {e}");
        AppError::UnprocessableEntity("Could not extract text from the PDF".to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_plain_text_upload_is_read_as_utf8() {
        let text = extract_resume_text(Bytes::from_static(b"Ada Lovelace\nRust"), Some("text/plain"))
            .await
            .unwrap();
        assert_eq!(text, "Ada Lovelace\nRust");
    }

    #[tokio::test]
    async fn test_binary_upload_is_unprocessable() {
        let err = extract_resume_text(Bytes::from_static(&[0xff, 0xfe, 0x00]), None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::UnprocessableEntity(_)));
    }

    #[tokio::test]
    async fn test_corrupt_pdf_is_unprocessable() {
        let err = extract_resume_text(Bytes::from_static(b"%PDF-1.7 garbage"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::UnprocessableEntity(_)));
    }
}
