//! Bridges a freshly analyzed resume into the self-introduction stage.

use super::NodeContext;
use crate::interview::models::{InterviewStage, SessionState, StateDiff};
use crate::interview::prompts::OPENING_PROMPT;

pub async fn run(_ctx: &NodeContext<'_>, state: &SessionState) -> StateDiff {
    if state.interview_stage != InterviewStage::Introduction {
        return StateDiff::new();
    }
    let Some(profile) = &state.candidate_profile else {
        return StateDiff::new();
    };

    StateDiff::new()
        .stage(InterviewStage::SelfIntro)
        .questions_asked(0)
        .say(OPENING_PROMPT.replace("{name}", profile.display_name()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interview::nodes::test_support::{session_at, sink};
    use crate::interview::InterviewLimits;
    use crate::llm_client::scripted::ScriptedGateway;

    #[tokio::test]
    async fn test_moves_to_self_intro_and_asks_for_introduction() {
        let gateway = ScriptedGateway::default();
        let (_, logs) = sink();
        let ctx = NodeContext {
            gateway: &gateway,
            logs: &logs,
            limits: InterviewLimits::default(),
        };

        let diff = run(&ctx, &session_at(InterviewStage::Introduction, vec![])).await;

        assert_eq!(diff.interview_stage, Some(InterviewStage::SelfIntro));
        assert_eq!(diff.questions_asked, Some(0));
        assert!(diff.messages[0].content.contains("introduce yourself"));
        assert!(diff.messages[0].content.contains("Ada Lovelace"));
        assert_eq!(gateway.call_count(), 0);
    }

    #[tokio::test]
    async fn test_out_of_turn_is_a_no_op() {
        let gateway = ScriptedGateway::default();
        let (_, logs) = sink();
        let ctx = NodeContext {
            gateway: &gateway,
            logs: &logs,
            limits: InterviewLimits::default(),
        };

        let diff = run(&ctx, &session_at(InterviewStage::Technical, vec![])).await;
        assert!(diff.is_empty());
    }
}
