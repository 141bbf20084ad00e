//! Technical question asker. Asks one question per visit until the stage
//! limit is reached, then hands over to the DSA round.

use tracing::{info, warn};

use super::{ask_interviewer, gateway_diagnostic, NodeContext};
use crate::interview::models::{InterviewStage, SessionState, StateDiff};
use crate::interview::prompts::{TECHNICAL_PROMPT, TECHNICAL_RULES, TECHNICAL_TO_DSA};

pub async fn run(ctx: &NodeContext<'_>, state: &SessionState) -> StateDiff {
    if state.interview_stage != InterviewStage::Technical {
        return StateDiff::new();
    }

    let limit = ctx.limits.technical_questions;
    if state.questions_asked >= limit {
        info!(
            "Session {} answered {} technical questions; moving to DSA",
            state.session_id, state.questions_asked
        );
        return StateDiff::new()
            .stage(InterviewStage::Dsa)
            .questions_asked(0)
            .say(TECHNICAL_TO_DSA);
    }

    let number = state.questions_asked + 1;
    let prompt = TECHNICAL_PROMPT
        .replace("{number}", &number.to_string())
        .replace("{limit}", &limit.to_string());

    match ask_interviewer(ctx, state, TECHNICAL_RULES, prompt).await {
        Ok(question) => StateDiff::new().say(question).questions_asked(number),
        Err(e) => {
            warn!(
                "Technical question {number} failed for {}: {e}",
                state.session_id
            );
            StateDiff::new().say(gateway_diagnostic("preparing the next question", &e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interview::models::Message;
    use crate::interview::nodes::test_support::{session_at, sink};
    use crate::interview::InterviewLimits;
    use crate::llm_client::scripted::ScriptedGateway;

    #[tokio::test]
    async fn test_asks_question_and_counts_it() {
        let gateway = ScriptedGateway::new(["  What does the borrow checker enforce?  "]);
        let (_, logs) = sink();
        let ctx = NodeContext {
            gateway: &gateway,
            logs: &logs,
            limits: InterviewLimits::default(),
        };
        let mut state = session_at(
            InterviewStage::Technical,
            vec![Message::assistant("Let's move on to some technical questions.")],
        );
        state.questions_asked = 3;

        let diff = run(&ctx, &state).await;

        assert_eq!(diff.questions_asked, Some(4));
        assert_eq!(
            diff.messages[0].content,
            "What does the borrow checker enforce?"
        );

        let request = &gateway.requests()[0];
        assert!(request.system.contains("TECHNICAL QUESTIONS"));
        assert!(request.system.contains("Ada Lovelace"));
        assert!(request.prompt.contains("4 of 10"));
        assert_eq!(request.history.len(), 1);
    }

    #[tokio::test]
    async fn test_limit_moves_to_dsa_without_model_call() {
        let gateway = ScriptedGateway::default();
        let (_, logs) = sink();
        let ctx = NodeContext {
            gateway: &gateway,
            logs: &logs,
            limits: InterviewLimits::default(),
        };
        let mut state = session_at(InterviewStage::Technical, vec![Message::human("answer")]);
        state.questions_asked = 10;

        let diff = run(&ctx, &state).await;

        assert_eq!(diff.interview_stage, Some(InterviewStage::Dsa));
        assert_eq!(diff.questions_asked, Some(0));
        assert_eq!(diff.messages[0].content, TECHNICAL_TO_DSA);
        assert_eq!(gateway.call_count(), 0);
    }

    #[tokio::test]
    async fn test_failure_does_not_count_a_question() {
        let gateway = ScriptedGateway::default();
        gateway.push_failure(529);
        let (_, logs) = sink();
        let ctx = NodeContext {
            gateway: &gateway,
            logs: &logs,
            limits: InterviewLimits::default(),
        };
        let mut state = session_at(InterviewStage::Technical, vec![]);
        state.questions_asked = 2;

        let diff = run(&ctx, &state).await;

        assert!(diff.questions_asked.is_none());
        assert!(diff.messages[0].content.contains("529"));
    }

    #[tokio::test]
    async fn test_custom_limit_is_respected() {
        let gateway = ScriptedGateway::default();
        let (_, logs) = sink();
        let ctx = NodeContext {
            gateway: &gateway,
            logs: &logs,
            limits: InterviewLimits {
                technical_questions: 2,
                dsa_questions: 1,
            },
        };
        let mut state = session_at(InterviewStage::Technical, vec![]);
        state.questions_asked = 2;

        assert_eq!(
            run(&ctx, &state).await.interview_stage,
            Some(InterviewStage::Dsa)
        );
    }
}
