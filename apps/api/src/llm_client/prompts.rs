// Shared prompt fragments used across interview stages.
// Stage-specific prompts live in interview/prompts.rs.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You are a precise, structured assistant. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Persona shared by every interviewer-facing call.
pub const INTERVIEWER_PERSONA: &str = "You are an expert technical interviewer named 'VIntervu'. \
    Be professional but conversational. \
    Ask one thing at a time and never answer your own questions.";

/// Builds a system prompt from the interviewer persona plus stage rules.
pub fn interviewer_system(stage_rules: &str) -> String {
    format!("{INTERVIEWER_PERSONA}\n\n{stage_rules}")
}

/// Builds a JSON-only system prompt for a structured extraction call.
pub fn json_system(task: &str) -> String {
    format!("{task}\n\n{JSON_ONLY_SYSTEM}")
}
