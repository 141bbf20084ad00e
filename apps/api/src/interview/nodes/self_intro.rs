//! Self-introduction stage. Summarizes the candidate's introduction into the
//! profile, scores it, and opens the technical round. A failed model call
//! keeps the session at this stage so the next reply is assessed again.

use serde::Deserialize;
use tracing::{info, warn};

use super::{gateway_diagnostic, lenient_score, NodeContext};
use crate::interview::models::{FeedbackEntry, InterviewStage, SessionState, StateDiff};
use crate::interview::profile::{lenient_text, string_or_list, IntroSummary};
use crate::interview::prompts::{
    OPENING_PROMPT, SELF_INTRO_ACK, SELF_INTRO_PROMPT, SELF_INTRO_TASK,
};
use crate::llm_client::prompts::json_system;
use crate::llm_client::{ask_structured, GatewayRequest};
use crate::log_store::InteractionLog;

/// Score used when the model omits one.
const DEFAULT_INTRO_SCORE: i64 = 5;

#[derive(Debug, Deserialize)]
struct IntroAssessment {
    #[serde(default, deserialize_with = "lenient_text")]
    summary: Option<String>,
    #[serde(default, deserialize_with = "string_or_list")]
    highlights: Vec<String>,
    #[serde(default, deserialize_with = "string_or_list")]
    interests: Vec<String>,
    #[serde(default, deserialize_with = "string_or_list")]
    skills: Vec<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    feedback: Option<String>,
    #[serde(default, deserialize_with = "lenient_score")]
    score: Option<i64>,
}

pub async fn run(ctx: &NodeContext<'_>, state: &SessionState) -> StateDiff {
    if state.interview_stage != InterviewStage::SelfIntro {
        return StateDiff::new();
    }
    let Some(mut profile) = state.candidate_profile.clone() else {
        return StateDiff::new();
    };
    if state.messages.is_empty() {
        return StateDiff::new()
            .questions_asked(0)
            .say(OPENING_PROMPT.replace("{name}", profile.display_name()));
    }
    if !state.last_message_is_human() {
        return StateDiff::new();
    }

    let question = state
        .last_assistant_message()
        .map(|m| m.content.as_str())
        .unwrap_or_default();
    let answer = state
        .last_human_message()
        .map(|m| m.content.as_str())
        .unwrap_or_default();
    let ack = SELF_INTRO_ACK.replace("{name}", profile.display_name());

    let request = GatewayRequest::new(
        json_system(SELF_INTRO_TASK),
        SELF_INTRO_PROMPT
            .replace("{question}", question)
            .replace("{answer}", answer)
            .replace("{profile}", &profile.prompt_summary()),
    );

    let assessment = match ask_structured::<IntroAssessment>(ctx.gateway, &request).await {
        Ok(assessment) => assessment,
        Err(e) => {
            warn!(
                "Self-introduction analysis failed for {}: {e}",
                state.session_id
            );
            return StateDiff::new().say(gateway_diagnostic("reviewing your introduction", &e));
        }
    };

    let feedback_text = assessment
        .feedback
        .unwrap_or_else(|| "Introduction received.".to_string());
    let entry = FeedbackEntry::new(
        question,
        answer,
        feedback_text,
        assessment.score.unwrap_or(DEFAULT_INTRO_SCORE),
        InterviewStage::SelfIntro,
    );

    ctx.logs.record_interaction(InteractionLog {
        session_id: state.session_id.clone(),
        question: question.to_string(),
        answer: answer.to_string(),
        evaluation: entry.feedback_text.clone(),
        score: Some(entry.score as i16),
    });

    profile.merge_intro(
        IntroSummary {
            summary: assessment.summary,
            highlights: assessment.highlights,
            interests: assessment.interests,
        },
        assessment.skills,
    );
    info!(
        "Self-introduction scored {} for session {}",
        entry.score, state.session_id
    );

    StateDiff::new()
        .profile(profile)
        .feedback(entry)
        .stage(InterviewStage::Technical)
        .questions_asked(0)
        .say(ack)
}
