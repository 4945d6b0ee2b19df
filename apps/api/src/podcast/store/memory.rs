use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::podcast::models::{AudioUpdate, Episode, NewEpisode};
use crate::podcast::store::{cutoff, EpisodeStore, StoreError};

/// In-memory store with the same contract as `PgEpisodeStore`.
/// Writes can be made to fail to exercise the data-loss path.
#[derive(Default)]
pub struct InMemoryEpisodeStore {
    episodes: Mutex<Vec<Episode>>,
    fail_writes: AtomicBool,
}

impl InMemoryEpisodeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds an episode as-is, keeping its timestamps.
    pub fn insert(&self, episode: Episode) {
        self.lock().push(episode);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn all(&self) -> Vec<Episode> {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Episode>> {
        self.episodes.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn check_writable(&self) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            Err(StoreError::Database(sqlx::Error::PoolClosed))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl EpisodeStore for InMemoryEpisodeStore {
    async fn find_recent_by_language(&self, language: &str, window_days: i64) -> Option<Episode> {
        let since = cutoff(Utc::now(), window_days);
        self.lock()
            .iter()
            .filter(|e| e.language == language && e.created_at >= since)
            .max_by_key(|e| e.created_at)
            .cloned()
    }

    async fn create(&self, episode: NewEpisode) -> Result<Uuid, StoreError> {
        self.check_writable()?;
        let id = Uuid::new_v4();
        self.lock().push(Episode::materialize(id, episode, Utc::now()));
        Ok(id)
    }

    async fn update_audio(&self, id: Uuid, update: AudioUpdate) -> Result<(), StoreError> {
        self.check_writable()?;
        let mut episodes = self.lock();
        let episode = episodes
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("Episode {id}")))?;

        episode.audio.status = update.status;
        if update.url.is_some() {
            episode.audio.url = update.url;
        }
        if update.duration_secs.is_some() {
            episode.audio.duration_secs = update.duration_secs;
        }
        if update.request_id.is_some() {
            episode.audio.request_id = update.request_id;
        }
        episode.updated_at = Utc::now();
        Ok(())
    }

    async fn find_by_request_id(&self, request_id: &str) -> Option<Episode> {
        self.lock()
            .iter()
            .filter(|e| e.audio.request_id.as_deref() == Some(request_id))
            .max_by_key(|e| e.updated_at)
            .cloned()
    }

    async fn find_in_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        language: Option<&str>,
    ) -> Vec<Episode> {
        let mut found: Vec<Episode> = self
            .lock()
            .iter()
            .filter(|e| e.created_at >= start && e.created_at < end)
            .filter(|e| language.map_or(true, |l| e.language == l))
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        found
    }

    async fn find_recent(&self, days: i64) -> Vec<Episode> {
        let now = Utc::now();
        self.find_in_range(cutoff(now, days), now + chrono::Duration::days(1), None)
            .await
    }

    async fn delete_older_than(&self, days: i64) -> Result<u64, StoreError> {
        self.check_writable()?;
        let threshold = cutoff(Utc::now(), days);
        let mut episodes = self.lock();
        let before = episodes.len();
        episodes.retain(|e| e.created_at >= threshold);
        Ok((before - episodes.len()) as u64)
    }
}
