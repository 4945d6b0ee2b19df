use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::episode::{EpisodeRow, KeyPointRow, SourceRow};

/// Regulator or theme an episode covers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Sebi,
    Rbi,
    Policy,
    #[default]
    GeneralRegulatory,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Sebi => "sebi",
            Category::Rbi => "rbi",
            Category::Policy => "policy",
            Category::GeneralRegulatory => "general_regulatory",
        }
    }

    /// Case-insensitive match against the fixed set. `-` and spaces count as `_`.
    pub fn parse(raw: &str) -> Option<Self> {
        match normalize_token(raw).as_str() {
            "sebi" => Some(Category::Sebi),
            "rbi" => Some(Category::Rbi),
            "policy" => Some(Category::Policy),
            "general_regulatory" | "general" | "regulatory" => Some(Category::GeneralRegulatory),
            _ => None,
        }
    }

    /// Maps a free-form hint from the oracle, defaulting to `GeneralRegulatory`.
    pub fn from_hint(hint: Option<&str>) -> Self {
        hint.and_then(Self::parse).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Importance {
    High,
    #[default]
    Medium,
    Low,
}

impl Importance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Importance::High => "high",
            Importance::Medium => "medium",
            Importance::Low => "low",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match normalize_token(raw).as_str() {
            "high" => Some(Importance::High),
            "medium" => Some(Importance::Medium),
            "low" => Some(Importance::Low),
            _ => None,
        }
    }

    pub fn from_hint(hint: Option<&str>) -> Self {
        hint.and_then(Self::parse).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioStatus {
    #[default]
    NotGenerated,
    Generating,
    Completed,
    Failed,
}

impl AudioStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AudioStatus::NotGenerated => "not_generated",
            AudioStatus::Generating => "generating",
            AudioStatus::Completed => "completed",
            AudioStatus::Failed => "failed",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match normalize_token(raw).as_str() {
            "not_generated" => Some(AudioStatus::NotGenerated),
            "generating" | "processing" => Some(AudioStatus::Generating),
            "completed" => Some(AudioStatus::Completed),
            "failed" => Some(AudioStatus::Failed),
            _ => None,
        }
    }
}

fn normalize_token(raw: &str) -> String {
    raw.trim()
        .trim_matches(|c: char| c == '*' || c == '"' || c == '\'' || c == '.')
        .trim()
        .to_lowercase()
        .replace(['-', ' '], "_")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Source {
    pub title: String,
    pub url: String,
    pub published_at: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioInfo {
    pub url: Option<String>,
    pub duration_secs: Option<i32>,
    pub status: AudioStatus,
    pub request_id: Option<String>,
}

/// One persisted unit of generated podcast content for a language and day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Episode {
    pub id: Uuid,
    pub podcast_title: String,
    pub title: String,
    pub summary: String,
    pub market_summary: String,
    pub key_points: Vec<String>,
    pub sources: Vec<Source>,
    pub category: Category,
    pub importance: Importance,
    pub language: String,
    pub audio: AudioInfo,
    pub content_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Episode {
    /// True once audio generation finished and a playable URL is attached.
    pub fn has_audio(&self) -> bool {
        self.audio.status == AudioStatus::Completed && self.audio.url.is_some()
    }

    /// Assembles an episode from its row and owned child rows.
    /// Key points are ordered by position regardless of input order.
    pub fn from_rows(row: EpisodeRow, mut key_points: Vec<KeyPointRow>, sources: Vec<SourceRow>) -> Self {
        key_points.sort_by_key(|k| k.position);
        Episode {
            id: row.id,
            podcast_title: row.podcast_title,
            title: row.title,
            summary: row.summary,
            market_summary: row.market_summary,
            key_points: key_points.into_iter().map(|k| k.text).collect(),
            sources: sources
                .into_iter()
                .map(|s| Source {
                    title: s.title,
                    url: s.url,
                    published_at: s.published_at,
                })
                .collect(),
            category: Category::parse(&row.category).unwrap_or_default(),
            importance: Importance::parse(&row.importance).unwrap_or_default(),
            language: row.language,
            audio: AudioInfo {
                url: row.audio_url,
                duration_secs: row.audio_duration,
                status: AudioStatus::parse(&row.audio_status).unwrap_or_default(),
                request_id: row.audio_request_id,
            },
            content_date: row.content_date,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }

    /// Builds the in-memory view of freshly created content, with no audio yet.
    pub fn materialize(id: Uuid, data: NewEpisode, now: DateTime<Utc>) -> Self {
        let content_date = data.content_date.unwrap_or_else(|| now.date_naive());
        Episode {
            id,
            podcast_title: data.podcast_title,
            title: data.title,
            summary: data.summary,
            market_summary: data.market_summary,
            key_points: data.key_points,
            sources: data.sources,
            category: data.category,
            importance: data.importance,
            language: data.language,
            audio: AudioInfo::default(),
            content_date,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Everything needed to persist a freshly generated episode.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEpisode {
    pub podcast_title: String,
    pub title: String,
    pub summary: String,
    pub market_summary: String,
    pub key_points: Vec<String>,
    pub sources: Vec<Source>,
    pub category: Category,
    pub importance: Importance,
    pub language: String,
    /// Defaults to the start of today when absent.
    pub content_date: Option<NaiveDate>,
}

/// Partial audio update. Only `status` is always written.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioUpdate {
    pub url: Option<String>,
    pub duration_secs: Option<i32>,
    pub status: AudioStatus,
    pub request_id: Option<String>,
}

/// Asynchronous notification from the audio pipeline, correlated by request id.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AudioEvent {
    #[serde(rename_all = "camelCase")]
    Processing { request_id: String },
    #[serde(rename_all = "camelCase")]
    Completed {
        request_id: String,
        audio_url: String,
        duration_secs: Option<i32>,
    },
    #[serde(rename_all = "camelCase")]
    Failed {
        request_id: String,
        error: Option<String>,
    },
}

impl AudioEvent {
    pub fn request_id(&self) -> &str {
        match self {
            AudioEvent::Processing { request_id }
            | AudioEvent::Completed { request_id, .. }
            | AudioEvent::Failed { request_id, .. } => request_id,
        }
    }

    pub fn into_update(self) -> AudioUpdate {
        match self {
            AudioEvent::Processing { request_id } => AudioUpdate {
                url: None,
                duration_secs: None,
                status: AudioStatus::Generating,
                request_id: Some(request_id),
            },
            AudioEvent::Completed {
                request_id,
                audio_url,
                duration_secs,
            } => AudioUpdate {
                url: Some(audio_url),
                duration_secs,
                status: AudioStatus::Completed,
                request_id: Some(request_id),
            },
            AudioEvent::Failed { request_id, .. } => AudioUpdate {
                url: None,
                duration_secs: None,
                status: AudioStatus::Failed,
                request_id: Some(request_id),
            },
        }
    }
}
