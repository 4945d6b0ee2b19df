//! Episode Store: persistence of episodes and their owned key points / sources.
//!
//! Reads never fail from the caller's point of view: errors are logged and
//! reported as "no data", which the orchestrator treats as a cache miss.
//! Writes surface `StoreError`, since losing a generated episode silently
//! would throw away a costly oracle call.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::podcast::models::{AudioUpdate, Episode, NewEpisode};

#[cfg(test)]
pub mod memory;
pub mod postgres;

pub use postgres::PgEpisodeStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[async_trait]
pub trait EpisodeStore: Send + Sync {
    /// Most recently created episode in `language` created within `window_days`.
    async fn find_recent_by_language(&self, language: &str, window_days: i64) -> Option<Episode>;

    /// Persists an episode with its key points (positions from 1) and sources.
    async fn create(&self, episode: NewEpisode) -> Result<Uuid, StoreError>;

    /// Writes the audio fields only. Absent url/duration/request id keep their value.
    async fn update_audio(&self, id: Uuid, update: AudioUpdate) -> Result<(), StoreError>;

    async fn find_by_request_id(&self, request_id: &str) -> Option<Episode>;

    /// Episodes created in `[start, end)`, newest first.
    async fn find_in_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        language: Option<&str>,
    ) -> Vec<Episode>;

    /// Episodes created in the last `days`, newest first.
    async fn find_recent(&self, days: i64) -> Vec<Episode>;

    /// Retention sweep. Returns the number of deleted episodes.
    async fn delete_older_than(&self, days: i64) -> Result<u64, StoreError>;
}

/// Creation-time cutoff for "within the last `days`".
pub fn cutoff(now: DateTime<Utc>, days: i64) -> DateTime<Utc> {
    now - chrono::Duration::days(days.max(0))
}
