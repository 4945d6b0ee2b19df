use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::extract::{ApiJson, ApiQuery};
use crate::podcast::language::{self, LanguageInfo, BASE_LANGUAGE_CODE};
use crate::podcast::models::{AudioEvent, AudioStatus, AudioUpdate, Category, Episode};
use crate::podcast::orchestrator::{PodcastFeed, PodcastRequest, PodcastStatus};
use crate::state::AppState;

const DEFAULT_LIST_DAYS: i64 = 7;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PodcastQuery {
    /// `all` or absent means no filter.
    pub category: Option<String>,
    pub limit: Option<usize>,
    /// Only the literal `true` (any case) enables a flag.
    pub refresh: Option<String>,
    pub lang: Option<String>,
    pub status_only: Option<String>,
}

impl PodcastQuery {
    pub fn refresh(&self) -> bool {
        is_true(self.refresh.as_deref())
    }

    pub fn status_only(&self) -> bool {
        is_true(self.status_only.as_deref())
    }
}

fn is_true(flag: Option<&str>) -> bool {
    flag.is_some_and(|v| v.trim().eq_ignore_ascii_case("true"))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PodcastResponse {
    pub episodes: Vec<Episode>,
    pub podcast_title: String,
    pub podcast_description: String,
    pub total_episodes: usize,
    pub last_updated: DateTime<Utc>,
    pub market_summary: String,
    pub selected_language: &'static str,
    pub audio_language: &'static str,
    pub has_audio: bool,
    pub audio_status: AudioStatus,
    pub from_database: bool,
    pub persisted: bool,
}

impl PodcastResponse {
    fn from_feed(feed: PodcastFeed, category: Option<Category>, limit: Option<usize>) -> Self {
        let from_database = feed.from_database();
        let last_updated = feed.episode.updated_at;
        let mut episodes: Vec<Episode> = std::iter::once(feed.episode)
            .filter(|e| category.map_or(true, |c| e.category == c))
            .collect();
        if let Some(limit) = limit {
            episodes.truncate(limit);
        }

        PodcastResponse {
            total_episodes: episodes.len(),
            episodes,
            podcast_title: feed.podcast_title,
            podcast_description: feed.podcast_description,
            last_updated,
            market_summary: feed.market_summary,
            selected_language: feed.language.code,
            audio_language: feed.language.content_language,
            has_audio: feed.has_audio,
            audio_status: feed.audio_status,
            from_database,
            persisted: feed.persisted,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum PodcastPayload {
    Full(PodcastResponse),
    Status(PodcastStatus),
}

/// GET /api/v1/podcast
pub async fn handle_get_podcast(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<PodcastQuery>,
) -> Result<Json<PodcastPayload>, AppError> {
    let language = language::resolve(params.lang.as_deref())?;
    let category = parse_category_filter(params.category.as_deref())?;

    if params.status_only() {
        let status = state.orchestrator.get_status(language).await?;
        return Ok(Json(PodcastPayload::Status(status)));
    }

    let feed = state
        .orchestrator
        .get_feed(PodcastRequest {
            language,
            force_refresh: params.refresh(),
        })
        .await?;

    Ok(Json(PodcastPayload::Full(PodcastResponse::from_feed(
        feed,
        category,
        params.limit,
    ))))
}

fn parse_category_filter(raw: Option<&str>) -> Result<Option<Category>, AppError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(all) if all.eq_ignore_ascii_case("all") => Ok(None),
        Some(raw) => Category::parse(raw)
            .map(Some)
            .ok_or_else(|| AppError::Validation(format!("Unknown category '{raw}'"))),
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguagesResponse {
    pub languages: &'static [LanguageInfo],
    pub default_language: &'static str,
}

/// GET /api/v1/podcast/languages
pub async fn handle_languages() -> Json<LanguagesResponse> {
    Json(LanguagesResponse {
        languages: language::supported_languages(),
        default_language: BASE_LANGUAGE_CODE,
    })
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EpisodeListQuery {
    /// Inclusive first day.
    pub start: Option<NaiveDate>,
    /// Inclusive last day.
    pub end: Option<NaiveDate>,
    pub lang: Option<String>,
    pub days: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EpisodeListResponse {
    pub episodes: Vec<Episode>,
    pub total_episodes: usize,
}

/// GET /api/v1/podcast/episodes
pub async fn handle_list_episodes(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<EpisodeListQuery>,
) -> Result<Json<EpisodeListResponse>, AppError> {
    let language = match params.lang.as_deref() {
        Some(code) => Some(language::resolve(Some(code))?.content_language),
        None => None,
    };

    let episodes = match (params.start, params.end) {
        (Some(start), Some(end)) => {
            if start > end {
                return Err(AppError::Validation(
                    "start must not be after end".to_string(),
                ));
            }
            let start = start_of_day(start);
            let end = start_of_day(end) + Duration::days(1);
            state.store.find_in_range(start, end, language).await
        }
        (None, None) => {
            let days = params.days.unwrap_or(DEFAULT_LIST_DAYS);
            if days <= 0 {
                return Err(AppError::Validation("days must be positive".to_string()));
            }
            let mut episodes = state.store.find_recent(days).await;
            if let Some(language) = language {
                episodes.retain(|e| e.language == language);
            }
            episodes
        }
        _ => {
            return Err(AppError::Validation(
                "start and end must be given together".to_string(),
            ))
        }
    };

    Ok(Json(EpisodeListResponse {
        total_episodes: episodes.len(),
        episodes,
    }))
}

fn start_of_day(day: NaiveDate) -> DateTime<Utc> {
    day.and_time(chrono::NaiveTime::MIN).and_utc()
}

/// PATCH /api/v1/podcast/episodes/:id/audio
pub async fn handle_update_audio(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ApiJson(update): ApiJson<AudioUpdate>,
) -> Result<StatusCode, AppError> {
    if update.duration_secs.is_some_and(|d| d < 0) {
        return Err(AppError::Validation(
            "durationSecs must not be negative".to_string(),
        ));
    }
    state.store.update_audio(id, update).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioRequest {
    pub lang: Option<String>,
    pub request_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioRequestAccepted {
    pub episode_id: Uuid,
    pub language: &'static str,
    pub request_id: String,
    pub audio_status: AudioStatus,
}

/// POST /api/v1/podcast/audio
pub async fn handle_request_audio(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<AudioRequest>,
) -> Result<(StatusCode, Json<AudioRequestAccepted>), AppError> {
    let request_id = req.request_id.trim();
    if request_id.is_empty() {
        return Err(AppError::Validation("requestId is required".to_string()));
    }
    let language = language::resolve(req.lang.as_deref())?;

    let episode = state.orchestrator.prepare_audio(language, request_id).await?;
    info!(
        "Audio requested for episode {} in {} ({request_id})",
        episode.id, language.content_language
    );

    Ok((
        StatusCode::ACCEPTED,
        Json(AudioRequestAccepted {
            episode_id: episode.id,
            language: language.code,
            request_id: request_id.to_string(),
            audio_status: episode.audio.status,
        }),
    ))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioEventAck {
    pub episode_id: Uuid,
    pub audio_status: AudioStatus,
}

/// POST /api/v1/podcast/audio/callback
pub async fn handle_audio_callback(
    State(state): State<AppState>,
    ApiJson(event): ApiJson<AudioEvent>,
) -> Result<Json<AudioEventAck>, AppError> {
    let audio_status = event.clone().into_update().status;
    let episode_id = state.orchestrator.record_audio_event(event).await?;
    Ok(Json(AudioEventAck {
        episode_id,
        audio_status,
    }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupResponse {
    pub deleted: u64,
    pub retention_days: i64,
}

/// POST /api/v1/podcast/maintenance/cleanup
pub async fn handle_cleanup(State(state): State<AppState>) -> Result<Json<CleanupResponse>, AppError> {
    let retention_days = state.config.retention_days;
    let deleted = state.store.delete_older_than(retention_days).await?;
    Ok(Json(CleanupResponse {
        deleted,
        retention_days,
    }))
}
