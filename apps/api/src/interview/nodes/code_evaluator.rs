//! Code evaluator. Pulls the fenced code block out of the candidate's reply
//! and asks the model to predict its output and review it.

use tracing::{info, warn};

use super::{clip, gateway_diagnostic, NodeContext};
use crate::interview::code_block::extract_code_block;
use crate::interview::models::{FeedbackEntry, SessionState, StateDiff};
use crate::interview::prompts::{
    CODE_EVALUATION_PROMPT, CODE_EVALUATION_TASK, EMPTY_CODE_BLOCK, NO_CODE_FOUND,
};
use crate::llm_client::{GatewayRequest, LlmError};
use crate::log_store::InteractionLog;

const DEFAULT_CODE_SCORE: i64 = 5;
const LOGGED_REVIEW_CHARS: usize = 4000;

pub async fn run(ctx: &NodeContext<'_>, state: &SessionState) -> StateDiff {
    let Some(reply) = state.last_message().filter(|m| m.is_human()) else {
        return StateDiff::new().code_output(None);
    };

    let Some(block) = extract_code_block(&reply.content) else {
        return StateDiff::new().say(NO_CODE_FOUND).code_output(None);
    };
    if block.is_blank() {
        return StateDiff::new().say(EMPTY_CODE_BLOCK).code_output(None);
    }

    let problem = state
        .last_assistant_message()
        .map(|m| m.content.as_str())
        .unwrap_or("(problem statement unavailable)");
    let language = block.language_or_default();

    let request = GatewayRequest::new(
        CODE_EVALUATION_TASK,
        CODE_EVALUATION_PROMPT
            .replace("{problem}", problem)
            .replace("{language}", language)
            .replace("{code}", &block.code),
    );

    let outcome = ctx.gateway.ask(&request).await.and_then(|text| {
        if text.trim().is_empty() {
            Err(LlmError::EmptyContent)
        } else {
            Ok(text)
        }
    });
    let review = match outcome {
        Ok(text) => text,
        Err(e) => {
            warn!("Code evaluation failed for {}: {e}", state.session_id);
            return StateDiff::new()
                .say(gateway_diagnostic("evaluating your code", &e))
                .code_output(None);
        }
    };

    let score = score_from_review(&review).unwrap_or(DEFAULT_CODE_SCORE);
    let entry = FeedbackEntry::new(
        problem,
        block.code.as_str(),
        clip(&review, LOGGED_REVIEW_CHARS),
        score,
        state.interview_stage,
    );
    info!(
        "Evaluated {language} submission for session {} (score {})",
        state.session_id, entry.score
    );

    ctx.logs.record_interaction(InteractionLog {
        session_id: state.session_id.clone(),
        question: problem.to_string(),
        answer: block.code.clone(),
        evaluation: entry.feedback_text.clone(),
        score: Some(entry.score as i16),
    });

    StateDiff::new()
        .say(review.clone())
        .feedback(entry)
        .code_output(Some(review))
}

/// Reads the `Score: X/10` line the review prompt asks for. Markdown emphasis
/// around the label is ignored.
fn score_from_review(review: &str) -> Option<i64> {
    review.lines().find_map(|line| {
        let line = line.replace('*', "");
        let lower = line.to_ascii_lowercase();
        let at = lower.find("score:")?;
        let digits: String = line[at + "score:".len()..]
            .trim_start()
            .chars()
            .take_while(|c| c.is_ascii_digit())
            .collect();
        digits.parse().ok()
    })
}
