// Cross-cutting prompt fragments. Each stage that calls the model keeps its
// own prompts.rs alongside it.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_INSTRUCTION: &str = "Always respond with valid JSON only, \
    no additional text or formatting whatsoever, not even '```'.";

/// System prompt fragment that keeps generated documents renderable offline.
pub const SELF_CONTAINED_HTML_INSTRUCTION: &str = "Include all necessary CSS styling \
    inline and ensure the HTML is self-contained with no external dependencies: \
    no external stylesheets, scripts, fonts or images.";

/// Instruction shared by every rewrite: never invent history.
pub const FACTUAL_FIDELITY_INSTRUCTION: &str = "Maintain the factual accuracy of the \
    original CV. Do NOT fabricate experience, employers, dates, qualifications or skills.";

/// A fully assembled model call: system instruction plus user prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}
