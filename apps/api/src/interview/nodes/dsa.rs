//! DSA problem asker. Poses coding problems until the stage limit is reached,
//! then hands over to final feedback.

use tracing::{info, warn};

use super::{ask_interviewer, gateway_diagnostic, NodeContext};
use crate::interview::models::{InterviewStage, SessionState, StateDiff};
use crate::interview::prompts::{DSA_PROMPT, DSA_RULES, DSA_TO_FINAL};

pub async fn run(ctx: &NodeContext<'_>, state: &SessionState) -> StateDiff {
    if state.interview_stage != InterviewStage::Dsa {
        return StateDiff::new();
    }

    let limit = ctx.limits.dsa_questions;
    if state.questions_asked >= limit {
        info!(
            "Session {} finished {} coding problems; moving to final feedback",
            state.session_id, state.questions_asked
        );
        return StateDiff::new()
            .stage(InterviewStage::FinalFeedback)
            .questions_asked(0)
            .say(DSA_TO_FINAL);
    }

    let number = state.questions_asked + 1;
    let prompt = DSA_PROMPT
        .replace("{number}", &number.to_string())
        .replace("{limit}", &limit.to_string());

    match ask_interviewer(ctx, state, DSA_RULES, prompt).await {
        Ok(problem) => StateDiff::new().say(problem).questions_asked(number),
        Err(e) => {
            warn!("DSA problem {number} failed for {}: {e}", state.session_id);
            StateDiff::new().say(gateway_diagnostic("preparing a coding problem", &e))
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
    async fn test_poses_problem_with_transcript() {
        let gateway = ScriptedGateway::new(["Reverse a linked list in place."]);
        let (_, logs) = sink();
        let ctx = NodeContext {
            gateway: &gateway,
            logs: &logs,
            limits: InterviewLimits::default(),
        };
        let state = session_at(
            InterviewStage::Dsa,
            vec![Message::assistant("Next we'll move to data structures.")],
        );

        let diff = run(&ctx, &state).await;

        assert_eq!(diff.questions_asked, Some(1));
        assert_eq!(diff.messages[0].content, "Reverse a linked list in place.");
        let request = &gateway.requests()[0];
        assert!(request.system.contains("DATA STRUCTURES"));
        assert!(request.prompt.contains("1 of 2"));
    }

    #[tokio::test]
    async fn test_limit_moves_to_final_feedback() {
        let gateway = ScriptedGateway::default();
        let (_, logs) = sink();
        let ctx = NodeContext {
            gateway: &gateway,
            logs: &logs,
            limits: InterviewLimits::default(),
        };
        let mut state = session_at(InterviewStage::Dsa, vec![]);
        state.questions_asked = 2;

        let diff = run(&ctx, &state).await;

        assert_eq!(diff.interview_stage, Some(InterviewStage::FinalFeedback));
        assert_eq!(diff.messages[0].content, DSA_TO_FINAL);
        assert_eq!(gateway.call_count(), 0);
    }

    #[tokio::test]
    async fn test_ignored_outside_dsa_stage() {
        let gateway = ScriptedGateway::default();
        let (_, logs) = sink();
        let ctx = NodeContext {
            gateway: &gateway,
            logs: &logs,
            limits: InterviewLimits::default(),
        };
        let state = session_at(InterviewStage::Technical, vec![]);
        assert!(run(&ctx, &state).await.is_empty());
    }
}
