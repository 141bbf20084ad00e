//! Interview orchestration: session state, the stage router, stage nodes and
//! the orchestrator that drives them turn by turn.

pub mod code_block;
pub mod handlers;
pub mod models;
pub mod nodes;
pub mod orchestrator;
pub mod profile;
pub mod prompts;
pub mod registry;
pub mod router;

/// Per-stage question caps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterviewLimits {
    pub technical_questions: u32,
    pub dsa_questions: u32,
}

impl Default for InterviewLimits {
    fn default() -> Self {
        Self {
            technical_questions: 10,
            dsa_questions: 2,
        }
    }
}
