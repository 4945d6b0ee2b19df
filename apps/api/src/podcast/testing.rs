//! Test doubles shared by the orchestrator and handler tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::podcast::generator::{ContentGenerator, GenerationError, PromptSpec};
use crate::podcast::models::{AudioStatus, Category, Episode, Importance, NewEpisode};

pub const SAMPLE_BRIEFING: &str = r#"PODCAST TITLE: "Daily Roundup - Jan 1, 2025"

REGULATORY SUMMARY: SEBI and RBI both tightened disclosure norms this week.

SINGLE EPISODE:
title: "Disclosure rules tighten"
summary: Regulators moved on several fronts at once.
keyPoints:
* **SEBI**: New margin framework for derivatives traders
* **RBI**: Revised KYC norms for payment aggregators
category: sebi
importance: high
"#;

/// Counts calls and returns a canned briefing, or fails when told to.
pub struct FakeGenerator {
    calls: AtomicUsize,
    output: Mutex<Result<String, String>>,
    delay: Duration,
}

impl FakeGenerator {
    pub fn new() -> Self {
        Self::returning(SAMPLE_BRIEFING)
    }

    pub fn returning(text: &str) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            output: Mutex::new(Ok(text.to_string())),
            delay: Duration::ZERO,
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            output: Mutex::new(Err(message.to_string())),
            delay: Duration::ZERO,
        }
    }

    /// Holds every call open for `delay` so concurrent requests overlap.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContentGenerator for FakeGenerator {
    async fn generate(&self, _spec: &PromptSpec) -> Result<String, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let output = self.output.lock().unwrap().clone();
        output.map_err(GenerationError::Failed)
    }
}

pub fn new_episode(language: &str) -> NewEpisode {
    NewEpisode {
        podcast_title: "Daily Regulatory Briefing - Jan 1, 2025".to_string(),
        title: "Margin rules".to_string(),
        summary: "SEBI changed margin rules.".to_string(),
        market_summary: "Markets steady.".to_string(),
        key_points: vec!["New margin framework for derivatives".to_string()],
        sources: vec![],
        category: Category::Sebi,
        importance: Importance::High,
        language: language.to_string(),
        content_date: None,
    }
}

/// A stored-looking episode created at `created_at`.
pub fn episode_at(language: &str, created_at: DateTime<Utc>) -> Episode {
    Episode::materialize(Uuid::new_v4(), new_episode(language), created_at)
}

/// A recent episode whose audio finished.
pub fn episode_with_audio(language: &str) -> Episode {
    let mut episode = episode_at(language, Utc::now());
    episode.audio.status = AudioStatus::Completed;
    episode.audio.url = Some(format!("https://cdn.example.com/{language}.mp3"));
    episode.audio.duration_secs = Some(300);
    episode
}
