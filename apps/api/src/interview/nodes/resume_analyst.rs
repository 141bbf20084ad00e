//! Resume analyst: entry node. Extracts a structured `CandidateProfile`
//! from the submitted resume text.

use tracing::{info, warn};

use super::{gateway_diagnostic, NodeContext};
use crate::interview::models::{InterviewStage, SessionState, StateDiff};
use crate::interview::profile::CandidateProfile;
use crate::interview::prompts::{RESUME_ANALYSIS_PROMPT, RESUME_ANALYSIS_TASK};
use crate::llm_client::prompts::json_system;
use crate::llm_client::GatewayRequest;

pub const EMPTY_RESUME: &str =
    "Error: No resume text provided. Please upload a resume with readable text.";
pub const INVALID_PROFILE: &str =
    "Error: Failed to parse the resume into a valid profile. Please try uploading it again.";

pub async fn run(ctx: &NodeContext<'_>, state: &SessionState) -> StateDiff {
    let resume_text = state.resume_text.as_deref().unwrap_or_default().trim();
    if resume_text.is_empty() {
        return StateDiff::new().say(EMPTY_RESUME);
    }

    if state.candidate_profile.is_some() {
        return StateDiff::new().notice("Resume already analyzed for this session; ignoring");
    }

    let request = GatewayRequest::new(
        json_system(RESUME_ANALYSIS_TASK),
        RESUME_ANALYSIS_PROMPT.replace("{resume_text}", resume_text),
    );

    let value = match ctx.gateway.ask_json(&request).await {
        Ok(value) => value,
        Err(e) => {
            warn!("Resume analysis failed for {}: {e}", state.session_id);
            return StateDiff::new().say(gateway_diagnostic("analyzing your resume", &e));
        }
    };

    let Some(profile) = CandidateProfile::from_model_value(value) else {
        warn!(
            "Resume analysis for {} returned an empty or invalid profile",
            state.session_id
        );
        return StateDiff::new().say(INVALID_PROFILE);
    };

    let name = profile.display_name().to_string();
    info!("Resume analyzed for {name} (session {})", state.session_id);

    ctx.logs
        .record_profile(name.clone(), resume_text.to_string(), profile.clone());

    StateDiff::new()
        .profile(profile)
        .stage(InterviewStage::Introduction)
        .say(format!(
            "Resume analyzed for {name}. Ready to start the interview."
        ))
}
