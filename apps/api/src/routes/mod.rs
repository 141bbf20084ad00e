pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::interview::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Interview API
        .route(
            "/api/v1/interview/analyze-resume",
            post(handlers::handle_analyze_resume),
        )
        .route(
            "/api/v1/interview/resume/upload",
            post(handlers::handle_resume_upload),
        )
        .route("/api/v1/interview/chat", post(handlers::handle_chat))
        .route(
            "/api/v1/interview/sessions/:session_id",
            get(handlers::handle_get_session),
        )
        // Log Store API
        .route("/api/v1/logs/query", post(handlers::handle_log_query))
        .with_state(state)
}
