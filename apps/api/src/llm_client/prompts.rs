// Shared prompt fragments.
// Each service that needs LLM calls defines its own prompts.rs alongside it.

/// System prompt fragment that keeps the oracle on plain, sectioned text.
pub const PLAIN_TEXT_SYSTEM: &str = "You are a precise financial news editor. \
    Respond in plain text using exactly the section markers you are given. \
    Do NOT wrap the answer in code fences. \
    Do NOT include explanations or apologies.";

/// Instruction appended to every generation prompt to discourage invented facts.
pub const FACTUALITY_INSTRUCTION: &str = "\
    CRITICAL: Only report developments you can attribute to an official publication \
    (press release, circular, notification or consultation paper). \
    If you are not certain an update exists, leave it out rather than inventing it.";
