//! Episode Orchestrator decides per request whether to serve cached content
//! or generate a new briefing.
//!
//! Lookup order for a full request:
//! 1. an episode in the requested language whose audio is complete,
//! 2. the most recent base-language episode (text reused, audio pending),
//! 3. generation, for the base language only.
//!
//! Generation holds a per-day lease so concurrent misses share one oracle call.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::podcast::flight::{FlightKey, GenerationFlights};
use crate::podcast::generator::{ContentGenerator, PromptSpec};
use crate::podcast::language::{
    translate_text, LanguageInfo, BASE_CONTENT_LANGUAGE, SERIES_DESCRIPTION, SERIES_TITLE,
};
use crate::podcast::models::{
    AudioEvent, AudioStatus, AudioUpdate, Category, Episode, Importance, NewEpisode,
};
use crate::podcast::parser;
use crate::podcast::store::{EpisodeStore, StoreError};
use crate::podcast::PodcastError;

/// Shown when the oracle output had no regulatory summary section.
pub const DEFAULT_MARKET_SUMMARY: &str =
    "Today's briefing covers the latest updates from Indian financial regulators.";

#[derive(Debug, Clone)]
pub struct OrchestratorSettings {
    pub cache_window_days: i64,
}

#[derive(Debug, Clone, Copy)]
pub struct PodcastRequest {
    pub language: &'static LanguageInfo,
    /// Honoured for base-language requests only.
    pub force_refresh: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EpisodeOrigin {
    /// Episode in the requested language with finished audio.
    LanguageCache,
    /// Cached base-language episode.
    BaseLanguageCache,
    /// Generated by this request.
    Generated,
}

/// Result of a full podcast request, with display strings already translated.
#[derive(Debug, Clone)]
pub struct PodcastFeed {
    pub episode: Episode,
    pub podcast_title: String,
    pub podcast_description: String,
    pub market_summary: String,
    pub language: &'static LanguageInfo,
    pub origin: EpisodeOrigin,
    /// False when a generated episode could not be stored and will be
    /// regenerated on the next request.
    pub persisted: bool,
    pub has_audio: bool,
    pub audio_status: AudioStatus,
}

impl PodcastFeed {
    pub fn from_database(&self) -> bool {
        self.origin != EpisodeOrigin::Generated
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PodcastStatus {
    pub has_content: bool,
    pub total_episodes: usize,
    pub last_updated: Option<DateTime<Utc>>,
    pub from_database: bool,
    pub podcast_title: String,
    pub is_generating: bool,
}

/// What the two cache states found.
struct CacheLookup {
    /// Most recent episode tagged with the requested language, audio or not.
    language_episode: Option<Episode>,
    hit: Option<(Episode, EpisodeOrigin)>,
}

pub struct EpisodeOrchestrator {
    store: Arc<dyn EpisodeStore>,
    generator: Arc<dyn ContentGenerator>,
    flights: GenerationFlights,
    settings: OrchestratorSettings,
}

impl EpisodeOrchestrator {
    pub fn new(
        store: Arc<dyn EpisodeStore>,
        generator: Arc<dyn ContentGenerator>,
        settings: OrchestratorSettings,
    ) -> Self {
        Self {
            store,
            generator,
            flights: GenerationFlights::new(),
            settings,
        }
    }

    pub async fn get_feed(&self, request: PodcastRequest) -> Result<PodcastFeed, PodcastError> {
        let language = request.language;
        let force_refresh = request.force_refresh && language.is_base();
        if request.force_refresh && !language.is_base() {
            debug!("Ignoring refresh for {}: only base content is generated", language.code);
        }

        if !force_refresh {
            let lookup = self.lookup(language).await;
            if let Some(feed) = cached_feed(lookup, language) {
                debug!(
                    "Serving cached episode {} ({:?}) for {}",
                    feed.episode.id, feed.origin, language.code
                );
                return Ok(feed);
            }
            if !language.is_base() {
                return Err(PodcastError::NoBaseContentAvailable {
                    language: language.code.to_string(),
                });
            }
        }

        self.generate(language, force_refresh).await
    }

    /// Same lookups as [`get_feed`](Self::get_feed) but reports metadata and never generates.
    pub async fn get_status(&self, language: &'static LanguageInfo) -> Result<PodcastStatus, PodcastError> {
        let lookup = self.lookup(language).await;
        let generating_today = self
            .flights
            .is_in_flight(&FlightKey::new(BASE_CONTENT_LANGUAGE, Utc::now().date_naive()));
        let audio_generating = lookup
            .language_episode
            .as_ref()
            .is_some_and(|e| e.audio.status == AudioStatus::Generating);

        match lookup.hit {
            Some((episode, _)) => Ok(PodcastStatus {
                has_content: true,
                total_episodes: 1,
                last_updated: Some(episode.updated_at),
                from_database: true,
                podcast_title: translate_text(&episode.podcast_title, language),
                is_generating: generating_today || audio_generating,
            }),
            None if !language.is_base() => Err(PodcastError::NoBaseContentAvailable {
                language: language.code.to_string(),
            }),
            None => Ok(PodcastStatus {
                has_content: false,
                total_episodes: 0,
                last_updated: None,
                from_database: false,
                podcast_title: translate_text(SERIES_TITLE, language),
                is_generating: generating_today,
            }),
        }
    }

    /// Tags an episode for `language` as awaiting audio under `request_id`.
    /// Non-base languages get their own copy of the base episode text.
    pub async fn prepare_audio(
        &self,
        language: &'static LanguageInfo,
        request_id: &str,
    ) -> Result<Episode, PodcastError> {
        let window = self.settings.cache_window_days;
        let existing = self
            .store
            .find_recent_by_language(language.content_language, window)
            .await;

        let mut episode = match existing {
            Some(episode) => episode,
            None => {
                let base = if language.is_base() {
                    None
                } else {
                    self.store.find_recent_by_language(BASE_CONTENT_LANGUAGE, window).await
                };
                let base = base.ok_or_else(|| PodcastError::NoBaseContentAvailable {
                    language: language.code.to_string(),
                })?;

                let copy = NewEpisode {
                    podcast_title: base.podcast_title,
                    title: base.title,
                    summary: base.summary,
                    market_summary: base.market_summary,
                    key_points: base.key_points,
                    sources: base.sources,
                    category: base.category,
                    importance: base.importance,
                    language: language.content_language.to_string(),
                    content_date: Some(base.content_date),
                };
                let id = self.store.create(copy.clone()).await?;
                info!("Created {} episode {id} from base episode {}", language.content_language, base.id);
                Episode::materialize(id, copy, Utc::now())
            }
        };

        let update = AudioUpdate {
            url: None,
            duration_secs: None,
            status: AudioStatus::Generating,
            request_id: Some(request_id.to_string()),
        };
        self.store.update_audio(episode.id, update).await?;
        episode.audio.status = AudioStatus::Generating;
        episode.audio.request_id = Some(request_id.to_string());
        Ok(episode)
    }

    /// Applies an audio pipeline event to the episode registered under its request id.
    pub async fn record_audio_event(&self, event: AudioEvent) -> Result<Uuid, PodcastError> {
        let request_id = event.request_id().to_string();
        let episode = self.store.find_by_request_id(&request_id).await.ok_or_else(|| {
            StoreError::NotFound(format!("Audio request {request_id}"))
        })?;

        if let AudioEvent::Failed { error: Some(reason), .. } = &event {
            warn!("Audio generation failed for episode {}: {reason}", episode.id);
        }
        self.store.update_audio(episode.id, event.into_update()).await?;
        Ok(episode.id)
    }

    async fn lookup(&self, language: &'static LanguageInfo) -> CacheLookup {
        let window = self.settings.cache_window_days;
        let language_episode = self
            .store
            .find_recent_by_language(language.content_language, window)
            .await;

        if let Some(episode) = language_episode.clone().filter(Episode::has_audio) {
            return CacheLookup {
                hit: Some((episode, EpisodeOrigin::LanguageCache)),
                language_episode,
            };
        }

        let base = if language.is_base() {
            language_episode.clone()
        } else {
            self.store.find_recent_by_language(BASE_CONTENT_LANGUAGE, window).await
        };
        CacheLookup {
            hit: base.map(|e| (e, EpisodeOrigin::BaseLanguageCache)),
            language_episode,
        }
    }

    async fn generate(
        &self,
        language: &'static LanguageInfo,
        force_refresh: bool,
    ) -> Result<PodcastFeed, PodcastError> {
        let today = Utc::now().date_naive();
        let _lease = self
            .flights
            .acquire(FlightKey::new(BASE_CONTENT_LANGUAGE, today))
            .await;

        // A request that waited on the lease usually finds the fresh episode here.
        if !force_refresh {
            if let Some(feed) = cached_feed(self.lookup(language).await, language) {
                debug!("Episode {} was stored while waiting", feed.episode.id);
                return Ok(feed);
            }
        }

        info!("Generating daily briefing for {today} (refresh: {force_refresh})");
        let raw = self
            .generator
            .generate(&PromptSpec::daily_briefing(today, language))
            .await?;

        let parsed = parser::parse(&raw, today);
        debug!(
            "Parsed briefing '{}' with {} key points via {:?}",
            parsed.title,
            parsed.key_points.len(),
            parsed.key_point_origin
        );

        let new_episode = NewEpisode {
            podcast_title: parsed.podcast_title,
            title: parsed.title,
            summary: parsed.summary,
            market_summary: parsed.market_summary,
            key_points: parsed.key_points,
            sources: parsed.sources,
            category: Category::from_hint(parsed.category_hint.as_deref()),
            importance: Importance::from_hint(parsed.importance_hint.as_deref()),
            language: BASE_CONTENT_LANGUAGE.to_string(),
            content_date: Some(today),
        };

        let (id, persisted) = match self.store.create(new_episode.clone()).await {
            Ok(id) => {
                info!("Stored episode {id}");
                (id, true)
            }
            Err(e) => {
                // The episode is still served, so the next request regenerates it.
                error!("Failed to store generated episode, returning it unsaved: {e}");
                (Uuid::new_v4(), false)
            }
        };

        let episode = Episode::materialize(id, new_episode, Utc::now());
        let status = episode.audio.status;
        Ok(build_feed(episode, language, EpisodeOrigin::Generated, persisted, status))
    }
}

/// Feed for a cache hit, labelled the same way on every path.
fn cached_feed(lookup: CacheLookup, language: &'static LanguageInfo) -> Option<PodcastFeed> {
    let (episode, origin) = lookup.hit?;
    let audio_status = audio_status_for(&episode, language, lookup.language_episode.as_ref());
    Some(build_feed(episode, language, origin, true, audio_status))
}

/// Audio state as seen by a listener of `language`.
fn audio_status_for(
    episode: &Episode,
    language: &LanguageInfo,
    language_episode: Option<&Episode>,
) -> AudioStatus {
    if episode.language == language.content_language {
        episode.audio.status
    } else {
        language_episode.map(|e| e.audio.status).unwrap_or_default()
    }
}

fn build_feed(
    mut episode: Episode,
    language: &'static LanguageInfo,
    origin: EpisodeOrigin,
    persisted: bool,
    audio_status: AudioStatus,
) -> PodcastFeed {
    let has_audio = episode.language == language.content_language && episode.has_audio();
    let market_summary = if episode.market_summary.trim().is_empty() {
        DEFAULT_MARKET_SUMMARY.to_string()
    } else {
        episode.market_summary.clone()
    };

    episode.podcast_title = translate_text(&episode.podcast_title, language);
    episode.title = translate_text(&episode.title, language);

    PodcastFeed {
        podcast_title: episode.podcast_title.clone(),
        podcast_description: translate_text(SERIES_DESCRIPTION, language),
        market_summary,
        language,
        origin,
        persisted,
        has_audio,
        audio_status,
        episode,
    }
}
