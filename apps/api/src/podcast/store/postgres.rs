use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::models::episode::{EpisodeRow, KeyPointRow, SourceRow};
use crate::podcast::models::{AudioUpdate, Episode, NewEpisode};
use crate::podcast::store::{cutoff, EpisodeStore, StoreError};

/// PostgreSQL-backed episode store.
#[derive(Clone)]
pub struct PgEpisodeStore {
    pool: PgPool,
    /// Pause before the single retry of a read that hit a connectivity error.
    retry_delay: Duration,
}

impl PgEpisodeStore {
    pub fn new(pool: PgPool, retry_delay: Duration) -> Self {
        Self { pool, retry_delay }
    }

    /// Runs a read, retrying once after `retry_delay` on connectivity errors.
    /// Any remaining error is logged and reported as `None`.
    async fn read_with_retry<T, F, Fut>(&self, operation: &str, read: F) -> Option<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, sqlx::Error>>,
    {
        match read().await {
            Ok(value) => Some(value),
            Err(e) if is_connectivity_error(&e) => {
                warn!(
                    "{operation}: connectivity error ({e}), retrying once in {}ms",
                    self.retry_delay.as_millis()
                );
                tokio::time::sleep(self.retry_delay).await;
                match read().await {
                    Ok(value) => Some(value),
                    Err(e) => {
                        error!("{operation} failed after retry, treating as no data: {e}");
                        None
                    }
                }
            }
            Err(e) => {
                error!("{operation} failed, treating as no data: {e}");
                None
            }
        }
    }

    /// Loads key points and sources for `rows` in two queries and assembles episodes.
    async fn hydrate(&self, rows: Vec<EpisodeRow>) -> Result<Vec<Episode>, sqlx::Error> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();

        let key_points = sqlx::query_as::<_, KeyPointRow>(
            r#"
            SELECT episode_id, position, text
            FROM podcast_key_points
            WHERE episode_id = ANY($1)
            ORDER BY episode_id, position
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let sources = sqlx::query_as::<_, SourceRow>(
            "SELECT episode_id, title, url, published_at FROM podcast_sources WHERE episode_id = ANY($1)",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut key_points_by_episode: HashMap<Uuid, Vec<KeyPointRow>> = HashMap::new();
        for kp in key_points {
            key_points_by_episode.entry(kp.episode_id).or_default().push(kp);
        }
        let mut sources_by_episode: HashMap<Uuid, Vec<SourceRow>> = HashMap::new();
        for source in sources {
            sources_by_episode.entry(source.episode_id).or_default().push(source);
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let key_points = key_points_by_episode.remove(&row.id).unwrap_or_default();
                let sources = sources_by_episode.remove(&row.id).unwrap_or_default();
                Episode::from_rows(row, key_points, sources)
            })
            .collect())
    }

    async fn query_recent_by_language(
        &self,
        language: &str,
        since: DateTime<Utc>,
    ) -> Result<Option<Episode>, sqlx::Error> {
        let row = sqlx::query_as::<_, EpisodeRow>(
            r#"
            SELECT * FROM podcast_episodes
            WHERE language = $1 AND created_at >= $2
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(language)
        .bind(since)
        .fetch_optional(&self.pool)
        .await?;

        Ok(self.hydrate(row.into_iter().collect()).await?.pop())
    }

    async fn query_by_request_id(&self, request_id: &str) -> Result<Option<Episode>, sqlx::Error> {
        let row = sqlx::query_as::<_, EpisodeRow>(
            r#"
            SELECT * FROM podcast_episodes
            WHERE audio_request_id = $1
            ORDER BY updated_at DESC
            LIMIT 1
            "#,
        )
        .bind(request_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(self.hydrate(row.into_iter().collect()).await?.pop())
    }

    async fn query_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        language: Option<&str>,
    ) -> Result<Vec<Episode>, sqlx::Error> {
        let rows = sqlx::query_as::<_, EpisodeRow>(
            r#"
            SELECT * FROM podcast_episodes
            WHERE created_at >= $1 AND created_at < $2
              AND ($3::TEXT IS NULL OR language = $3)
            ORDER BY created_at DESC
            "#,
        )
        .bind(start)
        .bind(end)
        .bind(language)
        .fetch_all(&self.pool)
        .await?;

        self.hydrate(rows).await
    }
}

#[async_trait]
impl EpisodeStore for PgEpisodeStore {
    async fn find_recent_by_language(&self, language: &str, window_days: i64) -> Option<Episode> {
        let since = cutoff(Utc::now(), window_days);
        self.read_with_retry("find_recent_by_language", || {
            self.query_recent_by_language(language, since)
        })
        .await
        .flatten()
    }

    async fn create(&self, episode: NewEpisode) -> Result<Uuid, StoreError> {
        let id = Uuid::new_v4();
        let content_date = episode
            .content_date
            .unwrap_or_else(|| Utc::now().date_naive());

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO podcast_episodes
                (id, podcast_title, title, summary, market_summary,
                 category, importance, language, audio_status, content_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 'not_generated', $9)
            "#,
        )
        .bind(id)
        .bind(&episode.podcast_title)
        .bind(&episode.title)
        .bind(&episode.summary)
        .bind(&episode.market_summary)
        .bind(episode.category.as_str())
        .bind(episode.importance.as_str())
        .bind(&episode.language)
        .bind(content_date)
        .execute(&mut *tx)
        .await?;

        for (index, text) in episode.key_points.iter().enumerate() {
            sqlx::query(
                "INSERT INTO podcast_key_points (id, episode_id, position, text) VALUES ($1, $2, $3, $4)",
            )
            .bind(Uuid::new_v4())
            .bind(id)
            .bind(index as i32 + 1)
            .bind(text)
            .execute(&mut *tx)
            .await?;
        }

        for source in &episode.sources {
            sqlx::query(
                r#"
                INSERT INTO podcast_sources (id, episode_id, title, url, published_at)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(id)
            .bind(&source.title)
            .bind(&source.url)
            .bind(source.published_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        info!(
            "Stored episode {id} ({}, {} key points) for {content_date}",
            episode.language,
            episode.key_points.len()
        );
        Ok(id)
    }

    async fn update_audio(&self, id: Uuid, update: AudioUpdate) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE podcast_episodes
            SET audio_status     = $2,
                audio_url        = COALESCE($3, audio_url),
                audio_duration   = COALESCE($4, audio_duration),
                audio_request_id = COALESCE($5, audio_request_id),
                updated_at       = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(update.status.as_str())
        .bind(update.url.as_deref())
        .bind(update.duration_secs)
        .bind(update.request_id.as_deref())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("Episode {id}")));
        }
        info!("Episode {id} audio status -> {}", update.status.as_str());
        Ok(())
    }

    async fn find_by_request_id(&self, request_id: &str) -> Option<Episode> {
        self.read_with_retry("find_by_request_id", || self.query_by_request_id(request_id))
            .await
            .flatten()
    }

    async fn find_in_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        language: Option<&str>,
    ) -> Vec<Episode> {
        self.read_with_retry("find_in_range", || self.query_range(start, end, language))
            .await
            .unwrap_or_default()
    }

    async fn find_recent(&self, days: i64) -> Vec<Episode> {
        // Upper bound leaves room for clock skew between the app and the database.
        let now = Utc::now();
        self.find_in_range(cutoff(now, days), now + chrono::Duration::days(1), None)
            .await
    }

    async fn delete_older_than(&self, days: i64) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM podcast_episodes WHERE created_at < $1")
            .bind(cutoff(Utc::now(), days))
            .execute(&self.pool)
            .await?;

        let deleted = result.rows_affected();
        info!("Retention sweep removed {deleted} episodes older than {days} days");
        Ok(deleted)
    }
}

/// Errors worth one retry: the database was unreachable rather than the query wrong.
fn is_connectivity_error(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connectivity_errors_are_retryable() {
        assert!(is_connectivity_error(&sqlx::Error::PoolTimedOut));
        assert!(is_connectivity_error(&sqlx::Error::PoolClosed));
        assert!(is_connectivity_error(&sqlx::Error::Io(std::io::Error::new(
            std::io::ErrorKind::ConnectionReset,
            "connection reset by peer",
        ))));
    }

    #[test]
    fn test_query_errors_are_not_retryable() {
        assert!(!is_connectivity_error(&sqlx::Error::RowNotFound));
        assert!(!is_connectivity_error(&sqlx::Error::ColumnNotFound(
            "audio_url".to_string()
        )));
    }

    #[tokio::test]
    async fn test_read_with_retry_retries_once_then_degrades() {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgres://localhost/unused")
            .unwrap();
        let store = PgEpisodeStore::new(pool, Duration::from_millis(0));
        let attempts = std::sync::atomic::AtomicUsize::new(0);

        let result: Option<u32> = store
            .read_with_retry("test", || {
                attempts.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                async { Err(sqlx::Error::PoolTimedOut) }
            })
            .await;

        assert!(result.is_none());
        assert_eq!(attempts.load(std::sync::atomic::Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_read_with_retry_recovers_on_second_attempt() {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgres://localhost/unused")
            .unwrap();
        let store = PgEpisodeStore::new(pool, Duration::from_millis(0));
        let attempts = std::sync::atomic::AtomicUsize::new(0);

        let result = store
            .read_with_retry("test", || {
                let n = attempts.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                async move {
                    if n == 0 {
                        Err(sqlx::Error::PoolTimedOut)
                    } else {
                        Ok(7u32)
                    }
                }
            })
            .await;

        assert_eq!(result, Some(7));
    }

    #[tokio::test]
    async fn test_read_with_retry_does_not_retry_query_errors() {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgres://localhost/unused")
            .unwrap();
        let store = PgEpisodeStore::new(pool, Duration::from_millis(0));
        let attempts = std::sync::atomic::AtomicUsize::new(0);

        let result: Option<u32> = store
            .read_with_retry("test", || {
                attempts.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                async { Err(sqlx::Error::RowNotFound) }
            })
            .await;

        assert!(result.is_none());
        assert_eq!(attempts.load(std::sync::atomic::Ordering::SeqCst), 1);
    }

    async fn test_store() -> PgEpisodeStore {
        let url = std::env::var("TEST_DATABASE_URL")
            .or_else(|_| std::env::var("DATABASE_URL"))
            .expect("TEST_DATABASE_URL or DATABASE_URL must be set");
        let pool = crate::db::create_pool(&url).await.unwrap();
        PgEpisodeStore::new(pool, Duration::from_millis(10))
    }

    #[tokio::test]
    #[ignore = "requires a PostgreSQL database"]
    async fn test_episode_lifecycle_against_postgres() {
        use crate::podcast::models::{AudioStatus, Source};
        use crate::podcast::testing::new_episode;

        let store = test_store().await;
        let language = format!("Test-{}", Uuid::new_v4());

        let mut data = new_episode(&language);
        data.key_points = vec!["first".into(), "second".into(), "third".into()];
        data.sources = vec![Source {
            title: "SEBI circular".to_string(),
            url: "https://www.sebi.gov.in/circular".to_string(),
            published_at: chrono::NaiveDate::from_ymd_opt(2025, 1, 1),
        }];
        let id = store.create(data).await.unwrap();

        let stored = store.find_recent_by_language(&language, 7).await.unwrap();
        assert_eq!(stored.id, id);
        assert_eq!(stored.key_points, vec!["first", "second", "third"]);
        assert_eq!(stored.sources.len(), 1);
        assert_eq!(stored.sources[0].title, "SEBI circular");
        assert_eq!(stored.audio.status, AudioStatus::NotGenerated);

        let request_id = format!("req-{id}");
        store
            .update_audio(
                id,
                AudioUpdate {
                    url: Some("https://cdn.example.com/a.mp3".to_string()),
                    duration_secs: Some(240),
                    status: AudioStatus::Completed,
                    request_id: Some(request_id.clone()),
                },
            )
            .await
            .unwrap();
        // Absent fields keep their stored values.
        store
            .update_audio(
                id,
                AudioUpdate {
                    url: None,
                    duration_secs: None,
                    status: AudioStatus::Failed,
                    request_id: None,
                },
            )
            .await
            .unwrap();

        let updated = store.find_by_request_id(&request_id).await.unwrap();
        assert_eq!(updated.id, id);
        assert_eq!(updated.audio.status, AudioStatus::Failed);
        assert_eq!(updated.audio.url.as_deref(), Some("https://cdn.example.com/a.mp3"));
        assert_eq!(updated.audio.duration_secs, Some(240));

        let missing = store
            .update_audio(
                Uuid::new_v4(),
                AudioUpdate {
                    url: None,
                    duration_secs: None,
                    status: AudioStatus::Completed,
                    request_id: None,
                },
            )
            .await;
        assert!(matches!(missing, Err(StoreError::NotFound(_))));

        sqlx::query("UPDATE podcast_episodes SET created_at = NOW() - INTERVAL '100 days' WHERE id = $1")
            .bind(id)
            .execute(&store.pool)
            .await
            .unwrap();
        assert!(store.delete_older_than(90).await.unwrap() >= 1);
        assert!(store.find_recent_by_language(&language, 7).await.is_none());

        let (orphans,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM podcast_key_points WHERE episode_id = $1")
                .bind(id)
                .fetch_one(&store.pool)
                .await
                .unwrap();
        assert_eq!(orphans, 0);
    }
}
