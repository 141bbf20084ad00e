//! Orchestrator: drives stage nodes according to the router until the
//! session suspends, merging each node's diff into the canonical state.
//!
//! A turn holds its session's lock from the first route decision until the
//! merged state is written back, so nodes of one session never overlap.
//! Independent sessions advance concurrently.

use std::sync::Arc;

use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::interview::models::{
    FinalScore, InterviewStage, Message, SessionState, StateDiff,
};
use crate::interview::nodes::{self, NodeContext};
use crate::interview::profile::CandidateProfile;
use crate::interview::registry::SessionRegistry;
use crate::interview::router::{route, NodeName, Route, RouteView, Trigger};
use crate::interview::InterviewLimits;
use crate::llm_client::ModelGateway;
use crate::log_store::{LogSink, LogStore};

/// Upper bound on node executions in one turn. The longest legal path is
/// well under this; hitting it means the transition table is looping.
pub const MAX_NODES_PER_TURN: usize = 16;

const COMPLETED_NOTICE: &str = "The interview is already completed.";

/// Input to one `advance` call.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdvanceRequest {
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub candidate_profile: Option<CandidateProfile>,
    #[serde(default)]
    pub message: Option<String>,
    /// Used only when the session is unknown to the server.
    #[serde(default)]
    pub history: Vec<Message>,
    #[serde(default)]
    pub resume_text: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdvanceResponse {
    pub session_id: String,
    pub assistant_messages: Vec<String>,
    pub candidate_profile: Option<CandidateProfile>,
    pub interview_stage: InterviewStage,
    pub questions_asked: u32,
    pub final_score: Option<FinalScore>,
    pub code_output: Option<String>,
    pub feedback_count: usize,
    pub notices: Vec<String>,
}

/// Everything a turn produced, plus the merged state.
#[derive(Debug)]
pub struct TurnOutcome {
    pub state: SessionState,
    pub assistant_messages: Vec<String>,
    pub visited: Vec<NodeName>,
    pub notices: Vec<String>,
}

pub struct Orchestrator {
    gateway: Arc<dyn ModelGateway>,
    log_store: Arc<dyn LogStore>,
    logs: LogSink,
    sessions: SessionRegistry,
    limits: InterviewLimits,
}

impl Orchestrator {
    pub fn new(
        gateway: Arc<dyn ModelGateway>,
        log_store: Arc<dyn LogStore>,
        limits: InterviewLimits,
    ) -> Self {
        Self {
            logs: LogSink::new(Arc::clone(&log_store)),
            gateway,
            log_store,
            sessions: SessionRegistry::new(),
            limits,
        }
    }

    /// Runs router and nodes from `trigger` until the router suspends.
    pub async fn run_turn(
        &self,
        mut state: SessionState,
        trigger: Trigger,
    ) -> Result<TurnOutcome, AppError> {
        let ctx = NodeContext {
            gateway: self.gateway.as_ref(),
            logs: &self.logs,
            limits: self.limits,
        };

        let mut trigger = trigger;
        let mut visited = Vec::new();
        let mut assistant_messages = Vec::new();
        let mut notices = Vec::new();

        loop {
            let node = match route(trigger, RouteView::of(&state)) {
                Route::Suspend => break,
                Route::Run(node) => node,
            };
            if visited.len() >= MAX_NODES_PER_TURN {
                error!(
                    "Session {} exceeded {MAX_NODES_PER_TURN} nodes in one turn: {:?}",
                    state.session_id, visited
                );
                return Err(AppError::Internal(anyhow!(
                    "interview turn did not settle after {MAX_NODES_PER_TURN} steps"
                )));
            }

            info!(
                "Session {}: running {node} at stage {}",
                state.session_id, state.interview_stage
            );
            let diff = run_node(node, &ctx, &state).await;

            assistant_messages.extend(
                diff.messages
                    .iter()
                    .filter(|m| !m.is_human())
                    .map(|m| m.content.clone()),
            );
            notices.extend(diff.notices.iter().cloned());

            state = state.apply(diff);
            visited.push(node);
            trigger = Trigger::NodeCompleted(node);
        }

        debug!(
            "Session {} suspended at {} after {:?}",
            state.session_id, state.interview_stage, visited
        );

        Ok(TurnOutcome {
            state,
            assistant_messages,
            visited,
            notices,
        })
    }

    /// The caller-facing operation: submit a resume or a chat message and
    /// receive everything the interviewer said in response.
    pub async fn advance(&self, req: AdvanceRequest) -> Result<AdvanceResponse, AppError> {
        match req.resume_text.clone() {
            Some(resume_text) => self.submit_resume(req, resume_text).await,
            None => self.submit_message(req).await,
        }
    }

    /// Current snapshot of a session, from memory or the log store.
    pub async fn session(&self, session_id: &str) -> Result<Option<SessionState>, AppError> {
        match self.open_session(session_id).await {
            Some(handle) => Ok(Some(handle.lock().await.clone())),
            None => Ok(None),
        }
    }

    async fn submit_resume(
        &self,
        req: AdvanceRequest,
        resume_text: String,
    ) -> Result<AdvanceResponse, AppError> {
        let session_id = req
            .session_id
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        let handle = match self.open_session(&session_id).await {
            Some(handle) => handle,
            None => {
                self.sessions
                    .get_or_insert(SessionState::new(session_id.clone()))
                    .await
            }
        };
        let mut guard = handle.lock().await;

        if guard.candidate_profile.is_some() {
            return Err(AppError::Conflict(format!(
                "Session {session_id} already has an analyzed resume"
            )));
        }

        info!("Analyzing resume for session {session_id}");
        let state = guard.clone().apply(StateDiff::new().resume_text(resume_text));
        let outcome = self.run_turn(state, Trigger::ResumeSubmitted).await?;
        Ok(self.commit(&mut guard, outcome).await)
    }

    async fn submit_message(&self, req: AdvanceRequest) -> Result<AdvanceResponse, AppError> {
        let message = req
            .message
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(String::from);

        let handle = match &req.session_id {
            Some(id) => self.open_session(id).await,
            None => None,
        };
        let handle = match handle {
            Some(handle) => handle,
            None => {
                let state = reconstruct(&req)?;
                info!(
                    "Reconstructed session {} from caller profile and {} messages",
                    state.session_id,
                    state.messages.len()
                );
                self.sessions.get_or_insert(state).await
            }
        };
        let mut guard = handle.lock().await;

        if guard.is_completed() {
            let mut response = respond(&guard, Vec::new(), vec![COMPLETED_NOTICE.to_string()]);
            resurface_last_assistant(&guard, &mut response);
            return Ok(response);
        }
        if guard.candidate_profile.is_none() {
            return Err(AppError::Validation(
                "No candidate profile for this session; submit a resume first".to_string(),
            ));
        }

        let mut state = guard.clone();
        if let Some(text) = message {
            state = state.apply(StateDiff::new().message(Message::human(text)));
        }
        let outcome = self.run_turn(state, Trigger::ExternalInput).await?;
        Ok(self.commit(&mut guard, outcome).await)
    }

    /// Writes the merged state back, persists a snapshot, and shapes the
    /// response. The snapshot is saved while the caller still holds the
    /// session lock, so saves of one session land in turn order.
    async fn commit(&self, slot: &mut SessionState, outcome: TurnOutcome) -> AdvanceResponse {
        let TurnOutcome {
            state,
            assistant_messages,
            visited: _,
            notices,
        } = outcome;

        *slot = state;
        if let Err(e) = self.log_store.save_session(slot).await {
            warn!("Failed to save session {}: {e}", slot.session_id);
        }

        let mut response = respond(slot, assistant_messages, notices);
        if response.assistant_messages.is_empty() {
            resurface_last_assistant(slot, &mut response);
        }
        response
    }

    async fn open_session(&self, session_id: &str) -> Option<Arc<Mutex<SessionState>>> {
        if let Some(handle) = self.sessions.get(session_id).await {
            return Some(handle);
        }
        match self.log_store.load_session(session_id).await {
            Ok(Some(state)) => {
                debug!("Restored session {session_id} from the log store");
                Some(self.sessions.get_or_insert(state).await)
            }
            Ok(None) => None,
            Err(e) => {
                warn!("Failed to load session {session_id}: {e}");
                None
            }
        }
    }
}

async fn run_node(node: NodeName, ctx: &NodeContext<'_>, state: &SessionState) -> StateDiff {
    match node {
        NodeName::ResumeAnalyst => nodes::resume_analyst::run(ctx, state).await,
        NodeName::Introduction => nodes::introduction::run(ctx, state).await,
        NodeName::SelfIntro => nodes::self_intro::run(ctx, state).await,
        NodeName::TechnicalQuestions => nodes::technical::run(ctx, state).await,
        NodeName::AmbiguityChecker => nodes::ambiguity::run(ctx, state).await,
        NodeName::TechnicalFeedback => nodes::feedback::run(ctx, state).await,
        NodeName::DsaQuestions => nodes::dsa::run(ctx, state).await,
        NodeName::CodeEvaluator => nodes::code_evaluator::run(ctx, state).await,
        NodeName::FinalFeedback => nodes::final_feedback::run(ctx, state).await,
    }
}

/// Builds a session the server has never seen from what the caller holds.
/// Without stage information it resumes at the self-introduction stage.
fn reconstruct(req: &AdvanceRequest) -> Result<SessionState, AppError> {
    let Some(profile) = req.candidate_profile.clone() else {
        return Err(AppError::Validation(
            "Unknown session and no candidate profile supplied; submit a resume first"
                .to_string(),
        ));
    };
    let session_id = req
        .session_id
        .clone()
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let mut state = SessionState::new(session_id);
    state.candidate_profile = Some(profile);
    state.interview_stage = InterviewStage::SelfIntro;
    state.messages = req.history.clone();
    Ok(state)
}

fn respond(
    state: &SessionState,
    assistant_messages: Vec<String>,
    notices: Vec<String>,
) -> AdvanceResponse {
    AdvanceResponse {
        session_id: state.session_id.clone(),
        assistant_messages,
        candidate_profile: state.candidate_profile.clone(),
        interview_stage: state.interview_stage,
        questions_asked: state.questions_asked,
        final_score: state.final_score.clone(),
        code_output: state.code_output.clone(),
        feedback_count: state.feedbacks.len(),
        notices,
    }
}

/// Callers always get something to display.
fn resurface_last_assistant(state: &SessionState, response: &mut AdvanceResponse) {
    if let Some(last) = state.last_assistant_message() {
        response.assistant_messages.push(last.content.clone());
    }
}
