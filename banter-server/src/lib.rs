//! banter-server library - Piraeus Banter editor backend
//!
//! Local HTTP service for the comic editor: proxies speech synthesis for
//! speech bubbles and merges generated clips into one MP3 export.

use axum::Router;
use banter_common::ServerConfig;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod audio;
pub mod error;
pub mod export;
pub mod tts;

pub use error::{ApiError, Error, Result};

use tts::SpeechSynthesizer;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Resolved configuration (credential fallbacks, default project dir)
    pub config: Arc<ServerConfig>,
    /// Speech synthesis provider
    pub synthesizer: Arc<dyn SpeechSynthesizer>,
}

impl AppState {
    /// Create new application state
    pub fn new(config: ServerConfig, synthesizer: Arc<dyn SpeechSynthesizer>) -> Self {
        Self {
            config: Arc::new(config),
            synthesizer,
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::post;

    Router::new()
        .route("/api/generate", post(api::generate_audio))
        .route("/api/export/audio", post(api::export_audio))
        .merge(api::health_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        // The editor runs from a different origin
        .layer(CorsLayer::permissive())
}
