//! Playlist generation endpoint

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use moodtune_common::api::{GeneratePlaylistRequest, PlaylistResponse};
use tracing::{info, warn};

use crate::error::ApiResult;
use crate::AppState;

/// POST /api/py/generate_playlist
///
/// Malformed bodies and validation failures return 400. Generation failures map to 503 (no
/// credentials), 404 (no tracks) or 502 (playlist write failed).
pub async fn generate_playlist(
    State(state): State<AppState>,
    payload: Result<Json<GeneratePlaylistRequest>, JsonRejection>,
) -> ApiResult<Json<PlaylistResponse>> {
    let Json(request) = payload?;
    let mood = request.into_mood()?;
    info!(
        genre = %mood.genre(),
        weather = %mood.weather(),
        time_of_day = %mood.time_of_day(),
        "Playlist requested"
    );

    let result = state.generator.generate(&mood).await.map_err(|e| {
        warn!(error = %e, "Playlist generation failed");
        e
    })?;

    Ok(Json(result.into()))
}
