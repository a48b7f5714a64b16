//! Playlist generation pipeline
//!
//! credentials → queries → search + merge → selection → publish.
//!
//! Credentials are resolved first so a missing credential fails before any
//! text generation or catalog call is made.

use crate::aggregator::aggregate;
use crate::composer::QueryComposer;
use crate::credentials::CredentialProvider;
use crate::error::PlaylistError;
use crate::publisher::{self, publish};
use crate::selector::select;
use moodtune_common::api::PlaylistResponse;
use moodtune_common::config::SelectionConfig;
use moodtune_common::MoodInput;
use std::sync::Arc;
use tracing::info;

/// Outcome of a successful generation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistResult {
    pub url: String,
    pub playlist_id: String,
    /// First query; the one that contributed first to the candidate pool
    pub primary_query: String,
}

impl From<PlaylistResult> for PlaylistResponse {
    fn from(result: PlaylistResult) -> Self {
        Self {
            url: result.url,
            playlist_id: result.playlist_id,
            query: result.primary_query,
        }
    }
}

pub struct PlaylistGenerator {
    composer: QueryComposer,
    credentials: Arc<dyn CredentialProvider>,
    selection: SelectionConfig,
    per_query_limit: usize,
}

impl PlaylistGenerator {
    pub fn new(
        composer: QueryComposer,
        credentials: Arc<dyn CredentialProvider>,
        selection: SelectionConfig,
        per_query_limit: usize,
    ) -> Self {
        Self {
            composer,
            credentials,
            selection,
            per_query_limit,
        }
    }

    pub async fn generate(&self, mood: &MoodInput) -> Result<PlaylistResult, PlaylistError> {
        let credentials = self.credentials.resolve().await?;

        let queries = self.composer.compose(mood).await;
        info!(
            genre = %mood.genre(),
            weather = %mood.weather(),
            time_of_day = %mood.time_of_day(),
            ?queries,
            "Composed search queries"
        );

        let candidates = aggregate(
            credentials.search.as_ref(),
            credentials.search_kind,
            &queries,
            self.per_query_limit,
        )
        .await;

        let track_ids = select(
            &candidates,
            self.selection.max_tracks,
            self.selection.max_per_artist,
        );
        if track_ids.is_empty() {
            return Err(PlaylistError::NoResults(queries));
        }

        info!(
            candidates = candidates.len(),
            selected = track_ids.len(),
            search = %credentials.search_kind,
            "Tracks selected"
        );

        let title = mood
            .title()
            .map(str::to_string)
            .unwrap_or_else(|| publisher::default_title(mood.weather(), mood.genre()));
        let description = publisher::description(mood.time_of_day(), &queries);

        let playlist_id = publish(credentials.write.as_ref(), &title, &description, &track_ids).await?;
        let url = credentials.write.playlist_url(&playlist_id);

        info!(playlist_id = %playlist_id, url = %url, "Playlist published");

        let primary_query = queries.into_iter().next().unwrap_or_default();
        Ok(PlaylistResult {
            url,
            playlist_id,
            primary_query,
        })
    }
}
