use std::sync::Arc;

use crate::config::Config;
use crate::podcast::orchestrator::EpisodeOrchestrator;
use crate::podcast::store::EpisodeStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<EpisodeOrchestrator>,
    /// Direct store access for the reporting, audio and maintenance routes.
    pub store: Arc<dyn EpisodeStore>,
    pub config: Config,
}
