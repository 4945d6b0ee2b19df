use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EpisodeRow {
    pub id: Uuid,
    pub podcast_title: String,
    pub title: String,
    pub summary: String,
    pub market_summary: String,
    pub category: String,
    pub importance: String,
    pub language: String,
    pub audio_url: Option<String>,
    pub audio_duration: Option<i32>,
    pub audio_status: String,
    pub audio_request_id: Option<String>,
    pub content_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct KeyPointRow {
    pub episode_id: Uuid,
    pub position: i32,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SourceRow {
    pub episode_id: Uuid,
    pub title: String,
    pub url: String,
    pub published_at: Option<NaiveDate>,
}
