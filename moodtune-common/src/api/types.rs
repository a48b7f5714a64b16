//! Shared API request/response types
//!
//! Wire format of the playlist service. Field names follow the front end
//! (`time_of_day`, `playlist_id`) rather than Rust conventions where they differ.

use serde::{Deserialize, Serialize};

use crate::{MoodInput, Result};

// ========================================
// Playlist Generation
// ========================================

/// Request body for `POST /api/py/generate_playlist`
///
/// Weather and time of day arrive as free text and are validated by
/// [`GeneratePlaylistRequest::into_mood`], so an unknown value produces a
/// readable 400 instead of a deserialization rejection.
///
/// # Examples
///
/// ```
/// use moodtune_common::api::types::GeneratePlaylistRequest;
///
/// let request: GeneratePlaylistRequest = serde_json::from_str(
///     r#"{"genre": "J-POP", "weather": "Rain", "time_of_day": "night"}"#,
/// ).unwrap();
/// let mood = request.into_mood().unwrap();
/// assert_eq!(mood.genre(), "J-POP");
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeneratePlaylistRequest {
    pub genre: String,
    pub weather: String,
    pub time_of_day: String,
    #[serde(default)]
    pub title: Option<String>,
}

impl GeneratePlaylistRequest {
    /// Validate the raw fields
    pub fn into_mood(self) -> Result<MoodInput> {
        MoodInput::parse(
            &self.genre,
            &self.weather,
            &self.time_of_day,
            self.title.as_deref(),
        )
    }
}

/// Successful playlist generation
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PlaylistResponse {
    /// Public URL of the new playlist
    pub url: String,
    /// Catalog identifier of the new playlist
    pub playlist_id: String,
    /// Primary (first) search query used
    pub query: String,
}

// ========================================
// Health
// ========================================

/// Health check response
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HealthResponse {
    /// Service status ("ok")
    pub status: String,
    /// Service name ("moodtune-api")
    pub service: String,
    /// Crate version
    pub version: String,
    /// Seconds since service started
    pub uptime_seconds: u64,
}

// ========================================
// Errors
// ========================================

/// Error envelope returned by every failing endpoint
///
/// ```json
/// {"error": {"code": "NOT_FOUND", "message": "No tracks found for ..."}}
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ErrorBody {
    /// Machine-readable error class
    pub code: String,
    /// Human-readable cause
    pub message: String,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
        }
    }
}
