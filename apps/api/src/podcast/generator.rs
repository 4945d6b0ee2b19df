//! Content Generator Adapter: one oracle call per briefing.
//!
//! No retries and no validation happen here; malformed output is the parser's
//! problem, and a failed call is reported to the orchestrator as-is.

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;
use tracing::{debug, info};

use crate::llm_client::prompts::{FACTUALITY_INSTRUCTION, PLAIN_TEXT_SYSTEM};
use crate::llm_client::{LlmClient, LlmError};
use crate::podcast::language::LanguageInfo;
use crate::podcast::prompts::{BRIEFING_PROMPT_TEMPLATE, BRIEFING_SYSTEM, FOCUS_TOPICS, SOURCE_HINTS};

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("{0}")]
    Failed(String),
}

impl From<LlmError> for GenerationError {
    fn from(err: LlmError) -> Self {
        GenerationError::Failed(err.to_string())
    }
}

/// Structured input to the oracle.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptSpec {
    pub date: NaiveDate,
    pub language_instruction: String,
    pub source_hints: Vec<&'static str>,
    pub focus_topics: Vec<&'static str>,
}

impl PromptSpec {
    /// The fixed daily briefing request for `date`, written in `language`.
    pub fn daily_briefing(date: NaiveDate, language: &LanguageInfo) -> Self {
        Self {
            date,
            language_instruction: format!(
                "Write the entire answer in {}. Keep the section markers in English.",
                language.content_language
            ),
            source_hints: SOURCE_HINTS.to_vec(),
            focus_topics: FOCUS_TOPICS.to_vec(),
        }
    }

    pub fn render(&self) -> String {
        BRIEFING_PROMPT_TEMPLATE
            .replace("{date}", &self.date.format("%A, %B %-d, %Y").to_string())
            .replace("{factuality_instruction}", FACTUALITY_INSTRUCTION)
            .replace("{source_hints}", &bullet_list(&self.source_hints))
            .replace("{focus_topics}", &bullet_list(&self.focus_topics))
            .replace("{language_instruction}", &self.language_instruction)
    }
}

fn bullet_list(items: &[&str]) -> String {
    items
        .iter()
        .map(|item| format!("- {item}"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[async_trait]
pub trait ContentGenerator: Send + Sync {
    async fn generate(&self, spec: &PromptSpec) -> Result<String, GenerationError>;
}

/// Generator backed by the shared [`LlmClient`].
pub struct LlmContentGenerator {
    llm: LlmClient,
}

impl LlmContentGenerator {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl ContentGenerator for LlmContentGenerator {
    async fn generate(&self, spec: &PromptSpec) -> Result<String, GenerationError> {
        let prompt = spec.render();
        let system = format!("{BRIEFING_SYSTEM} {PLAIN_TEXT_SYSTEM}");
        info!("Requesting daily briefing for {}", spec.date);

        let text = self.llm.call_text(&prompt, &system).await?;
        debug!("Oracle returned {} characters", text.len());
        Ok(text)
    }
}
