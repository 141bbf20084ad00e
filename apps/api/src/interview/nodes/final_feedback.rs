//! Feedback aggregator. Folds every feedback entry into the final score and
//! asks the model for a narrative evaluation. Always completes the session.

use tracing::{info, warn};

use super::{clip, NodeContext};
use crate::interview::models::{
    FeedbackEntry, FinalScore, InterviewStage, SessionState, StageScores, StateDiff,
};
use crate::interview::prompts::{
    FINAL_FEEDBACK_PROMPT, FINAL_FEEDBACK_TASK, NOTHING_TO_EVALUATE,
};
use crate::llm_client::prompts::interviewer_system;
use crate::llm_client::GatewayRequest;

const SUMMARY_FEEDBACK_CHARS: usize = 300;

/// Unweighted mean over all entries plus per-stage means for the three scored
/// stages. Entries from any other stage count toward the overall mean only.
pub fn aggregate(feedbacks: &[FeedbackEntry]) -> Option<FinalScore> {
    if feedbacks.is_empty() {
        return None;
    }

    let overall = mean(feedbacks.iter().map(|f| f.score));
    let bucket = |stage: InterviewStage| {
        mean(
            feedbacks
                .iter()
                .filter(|f| f.stage == stage)
                .map(|f| f.score),
        )
    };

    Some(FinalScore {
        overall_score: overall,
        total_questions: feedbacks.len(),
        stage_scores: StageScores {
            self_intro: bucket(InterviewStage::SelfIntro),
            technical: bucket(InterviewStage::Technical),
            dsa: bucket(InterviewStage::Dsa),
        },
    })
}

/// Mean rounded to one decimal; 0 for no values.
fn mean(scores: impl Iterator<Item = u8>) -> f64 {
    let (sum, count) = scores.fold((0u32, 0u32), |(sum, n), s| (sum + s as u32, n + 1));
    if count == 0 {
        return 0.0;
    }
    round1(sum as f64 / count as f64)
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

pub async fn run(ctx: &NodeContext<'_>, state: &SessionState) -> StateDiff {
    let Some(score) = aggregate(&state.feedbacks) else {
        return StateDiff::new()
            .say(NOTHING_TO_EVALUATE)
            .stage(InterviewStage::Completed);
    };

    let name = state
        .candidate_profile
        .as_ref()
        .map(|p| p.display_name())
        .unwrap_or("Candidate");

    let request = GatewayRequest::new(
        interviewer_system(FINAL_FEEDBACK_TASK),
        FINAL_FEEDBACK_PROMPT
            .replace("{name}", name)
            .replace("{total}", &score.total_questions.to_string())
            .replace("{average}", &score.overall_score.to_string())
            .replace("{self_intro}", &score.stage_scores.self_intro.to_string())
            .replace("{technical}", &score.stage_scores.technical.to_string())
            .replace("{dsa}", &score.stage_scores.dsa.to_string())
            .replace("{feedback_summary}", &summarize(&state.feedbacks)),
    );

    let narrative = match ctx.gateway.ask(&request).await {
        Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
        Ok(_) => fallback_narrative(&score),
        Err(e) => {
            warn!("Final evaluation failed for {}: {e}", state.session_id);
            fallback_narrative(&score)
        }
    };

    info!(
        "Session {} completed with overall score {} over {} answers",
        state.session_id, score.overall_score, score.total_questions
    );

    StateDiff::new()
        .say(narrative)
        .final_score(score)
        .stage(InterviewStage::Completed)
}

fn summarize(feedbacks: &[FeedbackEntry]) -> String {
    feedbacks
        .iter()
        .enumerate()
        .map(|(i, f)| {
            format!(
                "{}. [{}] {}/10: {}",
                i + 1,
                f.stage,
                f.score,
                clip(&f.feedback_text, SUMMARY_FEEDBACK_CHARS)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn fallback_narrative(score: &FinalScore) -> String {
    format!(
        "## Final Evaluation\n\n\
         Overall score: **{}/10** across {} scored answers.\n\n\
         - Self introduction: {}\n\
         - Technical questions: {}\n\
         - DSA / coding: {}\n\n\
         A detailed written evaluation could not be generated.",
        score.overall_score,
        score.total_questions,
        score.stage_scores.self_intro,
        score.stage_scores.technical,
        score.stage_scores.dsa
    )
}
