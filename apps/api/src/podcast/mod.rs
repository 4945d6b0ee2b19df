//! Daily regulatory briefing podcast.
//!
//! Content is generated once per day in the base language by the text oracle,
//! parsed into an episode and cached in the store. Requests for other languages
//! reuse the base text with translated titles; only their audio differs.

use thiserror::Error;

use crate::podcast::generator::GenerationError;
use crate::podcast::store::StoreError;

pub mod flight;
pub mod generator;
pub mod handlers;
pub mod language;
pub mod models;
pub mod orchestrator;
pub mod parser;
pub mod prompts;
pub mod store;

#[cfg(test)]
pub mod testing;

#[derive(Debug, Error)]
pub enum PodcastError {
    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),

    /// A non-base language was requested before any base content exists.
    #[error("No English content available yet for {language}")]
    NoBaseContentAvailable { language: String },

    #[error("Generation failed: {0}")]
    GenerationFailed(#[from] GenerationError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
