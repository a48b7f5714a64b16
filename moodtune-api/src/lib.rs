//! moodtune-api library - mood-driven playlist generation
//!
//! Turns genre, weather and time of day into search queries, searches the
//! music catalog, picks an artist-diverse set of tracks and publishes them as
//! a new playlist.

use axum::http::{header, HeaderValue, Method};
use axum::Router;
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::warn;

pub mod aggregator;
pub mod api;
pub mod catalog;
pub mod composer;
pub mod credentials;
pub mod error;
pub mod llm;
pub mod pipeline;
pub mod publisher;
pub mod searcher;
pub mod selector;

pub use error::{ApiError, PlaylistError};
pub use pipeline::{PlaylistGenerator, PlaylistResult};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub generator: Arc<PlaylistGenerator>,
    /// Service start time, for uptime reporting
    pub startup_time: Instant,
}

impl AppState {
    pub fn new(generator: PlaylistGenerator) -> Self {
        Self {
            generator: Arc::new(generator),
            startup_time: Instant::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState, allowed_origins: &[String]) -> Router {
    use axum::routing::{get, post};

    Router::new()
        .route("/api/py/generate_playlist", post(api::generate_playlist))
        .route("/api/py/buildinfo", get(api::get_build_info))
        .merge(api::health_routes())
        .with_state(state)
        .layer(cors_layer(allowed_origins))
        .layer(TraceLayer::new_for_http())
}

/// CORS restricted to the configured origins
fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}
