//! Feedback generator. Scores the latest question/answer pair and records it
//! under the current stage.

use serde::Deserialize;
use tracing::{debug, warn};

use super::{lenient_score, NodeContext};
use crate::interview::models::{FeedbackEntry, SessionState, StateDiff};
use crate::interview::profile::lenient_text;
use crate::interview::prompts::{FEEDBACK_PROMPT, FEEDBACK_TASK};
use crate::llm_client::prompts::json_system;
use crate::llm_client::{ask_structured, GatewayRequest};
use crate::log_store::InteractionLog;

const DEFAULT_SCORE: i64 = 5;

#[derive(Debug, Deserialize)]
struct AnswerFeedback {
    #[serde(default, deserialize_with = "lenient_text")]
    feedback: Option<String>,
    #[serde(default, deserialize_with = "lenient_score")]
    score: Option<i64>,
}

pub async fn run(ctx: &NodeContext<'_>, state: &SessionState) -> StateDiff {
    if state.messages.len() < 2 {
        return StateDiff::new();
    }
    // Scanned independently; a follow-up may sit between them.
    let (Some(question), Some(answer)) =
        (state.last_assistant_message(), state.last_human_message())
    else {
        return StateDiff::new();
    };
    let (question, answer) = (question.content.as_str(), answer.content.as_str());
    let stage = state.interview_stage;

    let request = GatewayRequest::new(
        json_system(FEEDBACK_TASK),
        FEEDBACK_PROMPT
            .replace("{stage}", stage.as_str())
            .replace("{question}", question)
            .replace("{answer}", answer),
    );

    let scored = match ask_structured::<AnswerFeedback>(ctx.gateway, &request).await {
        Ok(scored) => scored,
        Err(e) => {
            warn!("Feedback generation failed for {}: {e}", state.session_id);
            ctx.logs.record_interaction(InteractionLog {
                session_id: state.session_id.clone(),
                question: question.to_string(),
                answer: answer.to_string(),
                evaluation: format!("Not scored: {e}"),
                score: None,
            });
            return StateDiff::new().notice(format!("Answer was not scored: {e}"));
        }
    };

    let entry = FeedbackEntry::new(
        question,
        answer,
        scored
            .feedback
            .unwrap_or_else(|| "No feedback provided.".to_string()),
        scored.score.unwrap_or(DEFAULT_SCORE),
        stage,
    );
    debug!(
        "Scored {stage} answer {} for session {}",
        entry.score, state.session_id
    );

    ctx.logs.record_interaction(InteractionLog {
        session_id: state.session_id.clone(),
        question: question.to_string(),
        answer: answer.to_string(),
        evaluation: entry.feedback_text.clone(),
        score: Some(entry.score as i16),
    });

    StateDiff::new().feedback(entry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interview::models::{InterviewStage, Message};
    use crate::interview::nodes::test_support::{session_at, settle, sink};
    use crate::interview::InterviewLimits;
    use crate::llm_client::scripted::ScriptedGateway;

    #[tokio::test]
    async fn test_scores_latest_pair_under_current_stage() {
        let gateway =
            ScriptedGateway::new([r#"{"feedback": "Solid grasp of lifetimes.", "score": 12}"#]);
        let (store, logs) = sink();
        let ctx = NodeContext {
            gateway: &gateway,
            logs: &logs,
            limits: InterviewLimits::default(),
        };
        let state = session_at(
            InterviewStage::Technical,
            vec![
                Message::assistant("Old question"),
                Message::human("Old answer"),
                Message::assistant("Explain lifetimes."),
                Message::human("They bound how long references live."),
            ],
        );

        let diff = run(&ctx, &state).await;
        settle().await;

        let entry = &diff.feedbacks[0];
        assert_eq!(entry.question, "Explain lifetimes.");
        assert_eq!(entry.answer, "They bound how long references live.");
        assert_eq!(entry.score, 10);
        assert_eq!(entry.stage, InterviewStage::Technical);
        assert!(diff.messages.is_empty());

        let logged = store.interactions().await;
        assert_eq!(logged.len(), 1);
        assert_eq!(logged[0].session_id, "test-session");
        assert_eq!(logged[0].score, Some(10));
    }

    #[tokio::test]
    async fn test_non_adjacent_question_and_answer() {
        let gateway = ScriptedGateway::new([r#"{"feedback": "ok", "score": 6}"#]);
        let (_, logs) = sink();
        let ctx = NodeContext {
            gateway: &gateway,
            logs: &logs,
            limits: InterviewLimits::default(),
        };
        let state = session_at(
            InterviewStage::Technical,
            vec![
                Message::human("First answer"),
                Message::assistant("Follow-up?"),
                Message::assistant("Let me rephrase."),
            ],
        );

        let diff = run(&ctx, &state).await;

        assert_eq!(diff.feedbacks[0].question, "Let me rephrase.");
        assert_eq!(diff.feedbacks[0].answer, "First answer");
    }

    #[tokio::test]
    async fn test_needs_two_messages() {
        let gateway = ScriptedGateway::default();
        let (_, logs) = sink();
        let ctx = NodeContext {
            gateway: &gateway,
            logs: &logs,
            limits: InterviewLimits::default(),
        };
        let state = session_at(InterviewStage::Technical, vec![Message::human("hi")]);

        assert!(run(&ctx, &state).await.is_empty());
        assert_eq!(gateway.call_count(), 0);
    }

    #[tokio::test]
    async fn test_unscored_answer_is_still_logged() {
        let gateway = ScriptedGateway::new(["Great answer, 8/10"]);
        let (store, logs) = sink();
        let ctx = NodeContext {
            gateway: &gateway,
            logs: &logs,
            limits: InterviewLimits::default(),
        };
        let state = session_at(
            InterviewStage::Technical,
            vec![Message::assistant("Q"), Message::human("A")],
        );

        let diff = run(&ctx, &state).await;
        settle().await;

        assert!(diff.feedbacks.is_empty());
        assert!(diff.messages.is_empty());
        assert_eq!(diff.notices.len(), 1);

        let logged = store.interactions().await;
        assert_eq!(logged.len(), 1);
        assert_eq!(logged[0].question, "Q");
        assert_eq!(logged[0].answer, "A");
        assert_eq!(logged[0].score, None);
        assert!(logged[0].evaluation.starts_with("Not scored"));
    }
}
