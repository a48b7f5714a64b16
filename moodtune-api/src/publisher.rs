//! Playlist creation
//!
//! Create then add, in that order. The two calls are not transactional: if
//! adding fails, the playlist already created stays on the catalog and the
//! failure is reported as [`PlaylistError::RemoteWrite`].

use crate::catalog::WriteCapable;
use crate::error::PlaylistError;
use moodtune_common::{TimeOfDay, Weather};
use tracing::{error, info};

/// Title used when the caller gives none
pub fn default_title(weather: Weather, genre: &str) -> String {
    format!("MoodTune: {} {}", weather, genre.trim())
}

/// Description recording the time of day and every query used
pub fn description(time_of_day: TimeOfDay, queries: &[String]) -> String {
    format!(
        "Generated by MoodTune for {} listening. Queries: {}",
        time_of_day,
        queries.join(" / ")
    )
}

/// Create a playlist holding `track_ids`, returning its id
pub async fn publish(
    handle: &dyn WriteCapable,
    title: &str,
    description: &str,
    track_ids: &[String],
) -> Result<String, PlaylistError> {
    let playlist_id = handle
        .create_playlist(title, description)
        .await
        .map_err(|e| {
            error!(error = %e, "Playlist creation failed");
            PlaylistError::RemoteWrite(format!("create playlist: {}", e))
        })?;

    info!(playlist_id = %playlist_id, tracks = track_ids.len(), "Playlist created");

    handle.add_items(&playlist_id, track_ids).await.map_err(|e| {
        error!(
            playlist_id = %playlist_id,
            error = %e,
            "Adding tracks failed; created playlist left in place"
        );
        PlaylistError::RemoteWrite(format!("add tracks to {}: {}", playlist_id, e))
    })?;

    Ok(playlist_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_title() {
        assert_eq!(default_title(Weather::Rain, " J-POP "), "MoodTune: Rain J-POP");
    }

    #[test]
    fn test_description_lists_queries() {
        let text = description(
            TimeOfDay::Night,
            &["J-POP Rain night music".to_string(), "J-POP rainy songs".to_string()],
        );
        assert!(text.contains("night"));
        assert!(text.contains("J-POP Rain night music / J-POP rainy songs"));
    }
}
