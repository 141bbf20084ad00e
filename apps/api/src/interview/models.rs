//! Session state model and the reducer that merges node diffs into it.
//!
//! The orchestrator owns the canonical `SessionState`. Nodes read it and
//! return a `StateDiff`; `SessionState::apply` is the only place state is
//! mutated. Sequence fields are concatenated, scalar fields overwritten.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::interview::profile::CandidateProfile;

// ────────────────────────────────────────────────────────────────────────────
// Stage
// ────────────────────────────────────────────────────────────────────────────

/// Interview stage. Declaration order is the only legal progression order.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum InterviewStage {
    #[default]
    Introduction,
    SelfIntro,
    Technical,
    Dsa,
    FinalFeedback,
    Completed,
}

impl InterviewStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            InterviewStage::Introduction => "introduction",
            InterviewStage::SelfIntro => "self_intro",
            InterviewStage::Technical => "technical",
            InterviewStage::Dsa => "dsa",
            InterviewStage::FinalFeedback => "final_feedback",
            InterviewStage::Completed => "completed",
        }
    }
}

impl fmt::Display for InterviewStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Transcript
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[serde(alias = "user")]
    Human,
    #[serde(alias = "ai", alias = "bot")]
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn human(content: impl Into<String>) -> Self {
        Self {
            role: Role::Human,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    pub fn is_human(&self) -> bool {
        self.role == Role::Human
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Feedback
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackKind {
    /// Scored question/answer pair.
    #[default]
    Answer,
    /// Written by the ambiguity checker when an answer was vague or shallow.
    Clarity,
}

/// One scored exchange. Consumed only by the final aggregator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackEntry {
    pub question: String,
    pub answer: String,
    pub feedback_text: String,
    /// Always within 1–10.
    pub score: u8,
    pub stage: InterviewStage,
    #[serde(default)]
    pub kind: FeedbackKind,
}

pub const MIN_SCORE: u8 = 1;
pub const MAX_SCORE: u8 = 10;

impl FeedbackEntry {
    pub fn new(
        question: impl Into<String>,
        answer: impl Into<String>,
        feedback_text: impl Into<String>,
        score: i64,
        stage: InterviewStage,
    ) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
            feedback_text: feedback_text.into(),
            score: clamp_score(score),
            stage,
            kind: FeedbackKind::Answer,
        }
    }

    pub fn with_kind(mut self, kind: FeedbackKind) -> Self {
        self.kind = kind;
        self
    }
}

pub fn clamp_score(raw: i64) -> u8 {
    raw.clamp(MIN_SCORE as i64, MAX_SCORE as i64) as u8
}

// ────────────────────────────────────────────────────────────────────────────
// Final score
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StageScores {
    pub self_intro: f64,
    pub technical: f64,
    pub dsa: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalScore {
    pub overall_score: f64,
    pub total_questions: usize,
    pub stage_scores: StageScores,
}

// ────────────────────────────────────────────────────────────────────────────
// Session state
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub session_id: String,
    pub messages: Vec<Message>,
    pub feedbacks: Vec<FeedbackEntry>,
    pub candidate_profile: Option<CandidateProfile>,
    pub interview_stage: InterviewStage,
    pub questions_asked: u32,
    pub ambiguity_detected: bool,
    pub final_score: Option<FinalScore>,
    /// Resume text submitted on the entry path.
    #[serde(default)]
    pub resume_text: Option<String>,
    /// Latest code evaluation; `None` when the last submission had no code.
    #[serde(default)]
    pub code_output: Option<String>,
}

impl SessionState {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            messages: Vec::new(),
            feedbacks: Vec::new(),
            candidate_profile: None,
            interview_stage: InterviewStage::Introduction,
            questions_asked: 0,
            ambiguity_detected: false,
            final_score: None,
            resume_text: None,
            code_output: None,
        }
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn last_message_is_human(&self) -> bool {
        self.last_message().is_some_and(Message::is_human)
    }

    pub fn last_human_message(&self) -> Option<&Message> {
        self.messages.iter().rev().find(|m| m.is_human())
    }

    pub fn last_assistant_message(&self) -> Option<&Message> {
        self.messages.iter().rev().find(|m| !m.is_human())
    }

    pub fn is_completed(&self) -> bool {
        self.interview_stage == InterviewStage::Completed
    }

    /// Merges a node diff into the state and returns the new state.
    ///
    /// Invariants enforced here rather than trusted to nodes:
    /// - a completed session is immutable;
    /// - the stage never regresses;
    /// - a stage change resets `questions_asked` unless the diff sets it;
    /// - `final_score` is written at most once.
    pub fn apply(mut self, diff: StateDiff) -> Self {
        if self.is_completed() {
            if !diff.is_empty() {
                warn!(
                    "Session {} is completed; discarding state diff",
                    self.session_id
                );
            }
            return self;
        }

        let StateDiff {
            messages,
            feedbacks,
            candidate_profile,
            interview_stage,
            questions_asked,
            ambiguity_detected,
            final_score,
            resume_text,
            code_output,
            notices: _,
        } = diff;

        self.messages.extend(messages);
        self.feedbacks.extend(feedbacks);

        if let Some(profile) = candidate_profile {
            self.candidate_profile = Some(profile);
        }
        if let Some(text) = resume_text {
            self.resume_text = Some(text);
        }

        let mut stage_changed = false;
        if let Some(stage) = interview_stage {
            if stage < self.interview_stage {
                warn!(
                    "Session {}: refusing stage regression {} -> {}",
                    self.session_id, self.interview_stage, stage
                );
            } else if stage != self.interview_stage {
                self.interview_stage = stage;
                stage_changed = true;
            }
        }

        match questions_asked {
            Some(count) => self.questions_asked = count,
            None if stage_changed => self.questions_asked = 0,
            None => {}
        }

        if let Some(flag) = ambiguity_detected {
            self.ambiguity_detected = flag;
        }

        if let Some(score) = final_score {
            if self.final_score.is_none() {
                self.final_score = Some(score);
            } else {
                warn!(
                    "Session {}: final score already set; ignoring",
                    self.session_id
                );
            }
        }

        if let Some(output) = code_output {
            self.code_output = output;
        }

        self
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Diff
// ────────────────────────────────────────────────────────────────────────────

/// Partial state update returned by a node. Fields left at their default do
/// not touch the state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateDiff {
    pub messages: Vec<Message>,
    pub feedbacks: Vec<FeedbackEntry>,
    pub candidate_profile: Option<CandidateProfile>,
    pub interview_stage: Option<InterviewStage>,
    pub questions_asked: Option<u32>,
    pub ambiguity_detected: Option<bool>,
    pub final_score: Option<FinalScore>,
    pub resume_text: Option<String>,
    /// `Some(None)` clears the stored evaluation.
    pub code_output: Option<Option<String>>,
    /// Operator-facing diagnostics. Surfaced in the turn output, never stored.
    pub notices: Vec<String>,
}

impl StateDiff {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    pub fn message(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }

    pub fn say(self, content: impl Into<String>) -> Self {
        self.message(Message::assistant(content))
    }

    pub fn feedback(mut self, entry: FeedbackEntry) -> Self {
        self.feedbacks.push(entry);
        self
    }

    pub fn profile(mut self, profile: CandidateProfile) -> Self {
        self.candidate_profile = Some(profile);
        self
    }

    pub fn stage(mut self, stage: InterviewStage) -> Self {
        self.interview_stage = Some(stage);
        self
    }

    pub fn questions_asked(mut self, count: u32) -> Self {
        self.questions_asked = Some(count);
        self
    }

    pub fn ambiguity(mut self, detected: bool) -> Self {
        self.ambiguity_detected = Some(detected);
        self
    }

    pub fn final_score(mut self, score: FinalScore) -> Self {
        self.final_score = Some(score);
        self
    }

    pub fn resume_text(mut self, text: impl Into<String>) -> Self {
        self.resume_text = Some(text.into());
        self
    }

    pub fn code_output(mut self, output: Option<String>) -> Self {
        self.code_output = Some(output);
        self
    }

    pub fn notice(mut self, notice: impl Into<String>) -> Self {
        self.notices.push(notice.into());
        self
    }
}
