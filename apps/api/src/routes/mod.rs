pub mod health;

use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::podcast::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Podcast feed
        .route("/api/v1/podcast", get(handlers::handle_get_podcast))
        .route("/api/v1/podcast/languages", get(handlers::handle_languages))
        .route("/api/v1/podcast/episodes", get(handlers::handle_list_episodes))
        // Audio pipeline
        .route(
            "/api/v1/podcast/episodes/:id/audio",
            patch(handlers::handle_update_audio),
        )
        .route("/api/v1/podcast/audio", post(handlers::handle_request_audio))
        .route(
            "/api/v1/podcast/audio/callback",
            post(handlers::handle_audio_callback),
        )
        // Maintenance
        .route(
            "/api/v1/podcast/maintenance/cleanup",
            post(handlers::handle_cleanup),
        )
        .with_state(state)
}
