//! Stage-transition router.
//!
//! `route` is a pure function of the triggering event and a small snapshot of
//! the session (`RouteView`). It never calls the model or the log store, so
//! the whole transition table is testable with hand-built snapshots.

use serde::Serialize;

use crate::interview::models::{InterviewStage, SessionState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeName {
    ResumeAnalyst,
    Introduction,
    SelfIntro,
    TechnicalQuestions,
    AmbiguityChecker,
    TechnicalFeedback,
    DsaQuestions,
    CodeEvaluator,
    FinalFeedback,
}

impl NodeName {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeName::ResumeAnalyst => "resume_analyst",
            NodeName::Introduction => "introduction",
            NodeName::SelfIntro => "self_intro",
            NodeName::TechnicalQuestions => "technical_questions",
            NodeName::AmbiguityChecker => "ambiguity_checker",
            NodeName::TechnicalFeedback => "technical_feedback",
            NodeName::DsaQuestions => "dsa_questions",
            NodeName::CodeEvaluator => "code_evaluator",
            NodeName::FinalFeedback => "final_feedback",
        }
    }
}

impl std::fmt::Display for NodeName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What caused the router to be consulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// A resume was submitted; always the `resume_analyst` entry path.
    ResumeSubmitted,
    /// External input arrived (or the caller resumed without input).
    ExternalInput,
    /// The named node just finished and its diff has been merged.
    NodeCompleted(NodeName),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Run(NodeName),
    Suspend,
}

/// The only session fields routing decisions may read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RouteView {
    pub stage: InterviewStage,
    pub questions_asked: u32,
    pub ambiguity_detected: bool,
    pub last_message_is_human: bool,
    pub has_profile: bool,
    pub has_code_output: bool,
}

impl RouteView {
    pub fn of(state: &SessionState) -> Self {
        Self {
            stage: state.interview_stage,
            questions_asked: state.questions_asked,
            ambiguity_detected: state.ambiguity_detected,
            last_message_is_human: state.last_message_is_human(),
            has_profile: state.candidate_profile.is_some(),
            has_code_output: state.code_output.is_some(),
        }
    }
}

pub fn route(trigger: Trigger, view: RouteView) -> Route {
    match trigger {
        Trigger::ResumeSubmitted => Route::Run(NodeName::ResumeAnalyst),
        Trigger::ExternalInput => route_entry(view),
        Trigger::NodeCompleted(node) => route_after(node, view),
    }
}

/// Resumes a suspended session by replaying the edge out of the stage's
/// asking node, as if it had just run.
fn route_entry(view: RouteView) -> Route {
    match view.stage {
        InterviewStage::Introduction if view.has_profile => Route::Run(NodeName::Introduction),
        InterviewStage::Introduction => Route::Suspend,
        InterviewStage::SelfIntro => Route::Run(NodeName::SelfIntro),
        InterviewStage::Technical => route_after(NodeName::TechnicalQuestions, view),
        InterviewStage::Dsa => route_after(NodeName::DsaQuestions, view),
        InterviewStage::FinalFeedback => Route::Run(NodeName::FinalFeedback),
        InterviewStage::Completed => Route::Suspend,
    }
}

fn route_after(node: NodeName, view: RouteView) -> Route {
    match node {
        NodeName::ResumeAnalyst => {
            if view.has_profile && view.stage == InterviewStage::Introduction {
                Route::Run(NodeName::Introduction)
            } else {
                Route::Suspend
            }
        }
        NodeName::Introduction => match view.stage {
            InterviewStage::SelfIntro => Route::Run(NodeName::SelfIntro),
            _ => Route::Suspend,
        },
        // Stays on self_intro across turns; within a turn it waits for input.
        NodeName::SelfIntro => match view.stage {
            InterviewStage::Technical => Route::Run(NodeName::TechnicalQuestions),
            _ => Route::Suspend,
        },
        NodeName::TechnicalQuestions => match view.stage {
            InterviewStage::Dsa => Route::Run(NodeName::DsaQuestions),
            InterviewStage::Technical if view.last_message_is_human => {
                Route::Run(NodeName::AmbiguityChecker)
            }
            _ => Route::Suspend,
        },
        // A follow-up question was just asked; it is not scored.
        NodeName::AmbiguityChecker if view.ambiguity_detected => Route::Suspend,
        NodeName::AmbiguityChecker => Route::Run(NodeName::TechnicalFeedback),
        NodeName::TechnicalFeedback => match view.stage {
            InterviewStage::Technical => Route::Run(NodeName::TechnicalQuestions),
            InterviewStage::Dsa => Route::Run(NodeName::DsaQuestions),
            InterviewStage::FinalFeedback => Route::Run(NodeName::FinalFeedback),
            _ => Route::Suspend,
        },
        NodeName::DsaQuestions => match view.stage {
            InterviewStage::FinalFeedback => Route::Run(NodeName::FinalFeedback),
            InterviewStage::Dsa if view.last_message_is_human => {
                Route::Run(NodeName::CodeEvaluator)
            }
            _ => Route::Suspend,
        },
        // Control returns to the asking node of the current stage so it can
        // comment on the evaluation. No evaluation means we wait for code.
        NodeName::CodeEvaluator if !view.has_code_output => Route::Suspend,
        NodeName::CodeEvaluator => match view.stage {
            InterviewStage::Technical => Route::Run(NodeName::TechnicalQuestions),
            InterviewStage::Dsa => Route::Run(NodeName::DsaQuestions),
            _ => Route::Suspend,
        },
        NodeName::FinalFeedback => Route::Suspend,
    }
}
