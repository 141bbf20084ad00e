//! Stage nodes. Each node reads the session and returns a `StateDiff`; none
//! of them mutates state or returns an error. Gateway failures are turned into
//! diagnostics inside the node, and log writes go through the fire-and-forget
//! `LogSink`.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::interview::models::SessionState;
use crate::interview::profile::CandidateProfile;
use crate::interview::InterviewLimits;
use crate::llm_client::prompts::interviewer_system;
use crate::llm_client::{GatewayRequest, LlmError, ModelGateway};
use crate::log_store::LogSink;

pub mod ambiguity;
pub mod code_evaluator;
pub mod dsa;
pub mod feedback;
pub mod final_feedback;
pub mod introduction;
pub mod resume_analyst;
pub mod self_intro;
pub mod technical;

/// Dependencies a node may use. Constructed per turn by the orchestrator.
pub struct NodeContext<'a> {
    pub gateway: &'a dyn ModelGateway,
    pub logs: &'a LogSink,
    pub limits: InterviewLimits,
}

/// User-facing text for a failed model call.
pub(crate) fn gateway_diagnostic(action: &str, error: &LlmError) -> String {
    format!(
        "Sorry, I ran into a problem while {action} ({error}). Please try again."
    )
}

/// Asks the interviewer persona for the next question, with the whole
/// transcript as history.
pub(crate) async fn ask_interviewer(
    ctx: &NodeContext<'_>,
    state: &SessionState,
    stage_rules: &str,
    prompt: String,
) -> Result<String, LlmError> {
    let summary = state
        .candidate_profile
        .as_ref()
        .map(CandidateProfile::prompt_summary)
        .unwrap_or_default();
    let request = GatewayRequest::new(
        interviewer_system(&stage_rules.replace("{profile}", &summary)),
        prompt,
    )
    .with_history(&state.messages);

    let text = ctx.gateway.ask(&request).await?;
    let text = text.trim();
    if text.is_empty() {
        return Err(LlmError::EmptyContent);
    }
    Ok(text.to_string())
}

/// Reads a model-supplied score: `7`, `7.6`, `"7"`, or `"7/10"`.
pub(crate) fn lenient_score<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.round() as i64)),
        Value::String(s) => {
            let digits: String = s
                .trim()
                .chars()
                .take_while(|c| c.is_ascii_digit() || *c == '.')
                .collect();
            digits.parse::<f64>().ok().map(|f| f.round() as i64)
        }
        _ => None,
    })
}

/// Truncates to at most `max` characters, appending an ellipsis when cut.
pub(crate) fn clip(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut clipped: String = text.chars().take(max).collect();
    clipped.push('…');
    clipped
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use crate::interview::models::{InterviewStage, Message, SessionState};
    use crate::interview::profile::CandidateProfile;
    use crate::log_store::{InMemoryLogStore, LogSink};

    pub fn sink() -> (Arc<InMemoryLogStore>, LogSink) {
        let store = Arc::new(InMemoryLogStore::new());
        (Arc::clone(&store), LogSink::new(store))
    }

    pub fn profile() -> CandidateProfile {
        CandidateProfile {
            name: Some("Ada Lovelace".to_string()),
            skills: vec!["Rust".to_string(), "PostgreSQL".to_string()],
            recommended_topics: vec!["Ownership".to_string()],
            ..Default::default()
        }
    }

    pub fn session_at(stage: InterviewStage, messages: Vec<Message>) -> SessionState {
        let mut state = SessionState::new("test-session");
        state.candidate_profile = Some(profile());
        state.interview_stage = stage;
        state.messages = messages;
        state
    }

    /// Lets spawned log writes run on the current-thread test runtime.
    pub async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clip_keeps_short_text() {
        assert_eq!(clip("short", 10), "short");
    }

    #[test]
    fn test_clip_truncates_on_char_boundary() {
        assert_eq!(clip("héllo wörld", 5), "héllo…");
    }

    #[derive(Deserialize)]
    struct Scored {
        #[serde(default, deserialize_with = "lenient_score")]
        score: Option<i64>,
    }

    fn score_of(json: &str) -> Option<i64> {
        serde_json::from_str::<Scored>(json).unwrap().score
    }

    #[test]
    fn test_lenient_score_accepts_common_shapes() {
        assert_eq!(score_of(r#"{"score": 7}"#), Some(7));
        assert_eq!(score_of(r#"{"score": 7.6}"#), Some(8));
        assert_eq!(score_of(r#"{"score": "6/10"}"#), Some(6));
        assert_eq!(score_of(r#"{"score": "great"}"#), None);
        assert_eq!(score_of(r#"{}"#), None);
    }
}
