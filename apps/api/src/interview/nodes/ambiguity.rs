//! Ambiguity checker. Flags vague or shallow technical answers and asks a
//! deeper follow-up instead of scoring them.

use serde::Deserialize;
use tracing::{info, warn};

use super::{lenient_score, NodeContext};
use crate::interview::models::{
    FeedbackEntry, FeedbackKind, InterviewStage, SessionState, StateDiff,
};
use crate::interview::profile::lenient_text;
use crate::interview::prompts::{AMBIGUITY_PROMPT, AMBIGUITY_TASK};
use crate::llm_client::prompts::json_system;
use crate::llm_client::{ask_structured, GatewayRequest};

const DEFAULT_CLARITY_SCORE: i64 = 3;
const FALLBACK_FOLLOW_UP: &str =
    "Could you be more specific? Please walk me through a concrete example.";

#[derive(Debug, Deserialize)]
struct AmbiguityVerdict {
    #[serde(default)]
    ambiguous: bool,
    #[serde(default, deserialize_with = "lenient_text")]
    reason: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    follow_up: Option<String>,
    #[serde(default, deserialize_with = "lenient_score")]
    clarity_score: Option<i64>,
}

pub async fn run(ctx: &NodeContext<'_>, state: &SessionState) -> StateDiff {
    if !state.last_message_is_human() {
        return StateDiff::new().ambiguity(false);
    }
    let answer = state
        .last_human_message()
        .map(|m| m.content.as_str())
        .unwrap_or_default();
    let question = state
        .last_assistant_message()
        .map(|m| m.content.as_str())
        .unwrap_or_default();

    let request = GatewayRequest::new(
        json_system(AMBIGUITY_TASK),
        AMBIGUITY_PROMPT
            .replace("{question}", question)
            .replace("{answer}", answer),
    );

    let verdict = match ask_structured::<AmbiguityVerdict>(ctx.gateway, &request).await {
        Ok(verdict) => verdict,
        Err(e) => {
            warn!("Ambiguity check failed for {}: {e}", state.session_id);
            return StateDiff::new()
                .ambiguity(false)
                .notice(format!("Ambiguity check skipped: {e}"));
        }
    };

    if !verdict.ambiguous {
        return StateDiff::new().ambiguity(false);
    }

    info!(
        "Vague answer in session {}: {}",
        state.session_id,
        verdict.reason.as_deref().unwrap_or("no reason given")
    );

    let follow_up = verdict
        .follow_up
        .unwrap_or_else(|| FALLBACK_FOLLOW_UP.to_string());
    let entry = FeedbackEntry::new(
        question,
        answer,
        verdict
            .reason
            .unwrap_or_else(|| "The answer lacked specifics.".to_string()),
        verdict.clarity_score.unwrap_or(DEFAULT_CLARITY_SCORE),
        InterviewStage::Technical,
    )
    .with_kind(FeedbackKind::Clarity);

    StateDiff::new()
        .ambiguity(true)
        .feedback(entry)
        .say(follow_up)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interview::models::Message;
    use crate::interview::nodes::test_support::{session_at, sink};
    use crate::interview::InterviewLimits;
    use crate::llm_client::scripted::ScriptedGateway;

    fn answered(answer: &str) -> SessionState {
        session_at(
            InterviewStage::Technical,
            vec![
                Message::assistant("How would you shard a Postgres table?"),
                Message::human(answer),
            ],
        )
    }

    #[tokio::test]
    async fn test_vague_answer_gets_follow_up() {
        let gateway = ScriptedGateway::new([r#"{
            "ambiguous": true,
            "reason": "No strategy was named.",
            "follow_up": "Which shard key would you pick, and why?",
            "clarity_score": 2
        }"#]);
        let (_, logs) = sink();
        let ctx = NodeContext {
            gateway: &gateway,
            logs: &logs,
            limits: InterviewLimits::default(),
        };

        let diff = run(&ctx, &answered("it depends")).await;

        assert_eq!(diff.ambiguity_detected, Some(true));
        assert_eq!(
            diff.messages[0].content,
            "Which shard key would you pick, and why?"
        );
        assert_eq!(diff.feedbacks[0].kind, FeedbackKind::Clarity);
        assert_eq!(diff.feedbacks[0].score, 2);
        assert_eq!(diff.feedbacks[0].answer, "it depends");
    }

    #[tokio::test]
    async fn test_specific_answer_passes_through() {
        let gateway = ScriptedGateway::new([r#"{"ambiguous": false, "reason": "Concrete."}"#]);
        let (_, logs) = sink();
        let ctx = NodeContext {
            gateway: &gateway,
            logs: &logs,
            limits: InterviewLimits::default(),
        };

        let diff = run(&ctx, &answered("Hash on tenant_id with pg_partman")).await;

        assert_eq!(diff.ambiguity_detected, Some(false));
        assert!(diff.messages.is_empty());
        assert!(diff.feedbacks.is_empty());
    }

    #[tokio::test]
    async fn test_missing_follow_up_uses_fallback() {
        let gateway = ScriptedGateway::new([r#"{"ambiguous": true}"#]);
        let (_, logs) = sink();
        let ctx = NodeContext {
            gateway: &gateway,
            logs: &logs,
            limits: InterviewLimits::default(),
        };

        let diff = run(&ctx, &answered("not sure")).await;

        assert_eq!(diff.messages[0].content, FALLBACK_FOLLOW_UP);
        assert_eq!(diff.feedbacks[0].score, 3);
    }

    #[tokio::test]
    async fn test_gateway_failure_is_not_ambiguous() {
        let gateway = ScriptedGateway::new(["definitely not json"]);
        let (_, logs) = sink();
        let ctx = NodeContext {
            gateway: &gateway,
            logs: &logs,
            limits: InterviewLimits::default(),
        };

        let diff = run(&ctx, &answered("it depends")).await;

        assert_eq!(diff.ambiguity_detected, Some(false));
        assert!(diff.messages.is_empty());
        assert_eq!(diff.notices.len(), 1);
    }

    #[tokio::test]
    async fn test_without_candidate_reply_makes_no_call() {
        let gateway = ScriptedGateway::default();
        let (_, logs) = sink();
        let ctx = NodeContext {
            gateway: &gateway,
            logs: &logs,
            limits: InterviewLimits::default(),
        };
        let state = session_at(InterviewStage::Technical, vec![Message::assistant("Q?")]);

        let diff = run(&ctx, &state).await;
        assert_eq!(diff.ambiguity_detected, Some(false));
        assert_eq!(gateway.call_count(), 0);
    }
}
