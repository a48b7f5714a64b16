//! Multi-query result aggregation
//!
//! Queries run one after another against the search handle. Results are
//! merged in arrival order (query order, then rank within a query) and
//! deduplicated on track id; rows without a track id are dropped.

use crate::catalog::{CredentialKind, RawTrack, SearchCapable};
use crate::searcher;
use std::collections::HashSet;
use tracing::debug;

/// Selectable search result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateTrack {
    /// Never empty
    pub track_id: String,
    /// Primary credited artist: browse id when known, otherwise the name
    pub artist_id: Option<String>,
}

impl CandidateTrack {
    pub fn new(track_id: impl Into<String>, artist_id: Option<&str>) -> Self {
        Self {
            track_id: track_id.into(),
            artist_id: artist_id.map(str::to_string),
        }
    }

    /// `None` when the record carries no usable track id
    pub fn from_raw(raw: &RawTrack) -> Option<Self> {
        let track_id = raw.video_id.as_deref().map(str::trim).filter(|id| !id.is_empty())?;

        let artist_id = raw.artists.first().and_then(|artist| {
            artist
                .id
                .as_deref()
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .or_else(|| Some(artist.name.trim()).filter(|name| !name.is_empty()))
                .map(str::to_string)
        });

        Some(Self {
            track_id: track_id.to_string(),
            artist_id,
        })
    }
}

/// Candidate pool built from result batches
#[derive(Debug, Default)]
pub struct CandidatePool {
    seen: HashSet<String>,
    candidates: Vec<CandidateTrack>,
}

impl CandidatePool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append unseen, selectable records; returns how many were added
    pub fn extend(&mut self, batch: &[RawTrack]) -> usize {
        let before = self.candidates.len();
        for candidate in batch.iter().filter_map(CandidateTrack::from_raw) {
            if self.seen.insert(candidate.track_id.clone()) {
                self.candidates.push(candidate);
            }
        }
        self.candidates.len() - before
    }

    pub fn into_candidates(self) -> Vec<CandidateTrack> {
        self.candidates
    }
}

/// Search every query in order and merge the results
pub async fn aggregate(
    handle: &dyn SearchCapable,
    kind: CredentialKind,
    queries: &[String],
    per_query_limit: usize,
) -> Vec<CandidateTrack> {
    let mut pool = CandidatePool::new();

    for query in queries {
        let batch = searcher::search(handle, kind, query, per_query_limit).await;
        let added = pool.extend(&batch);
        debug!(query = %query, returned = batch.len(), added, "Query merged");
    }

    let candidates = pool.into_candidates();
    debug!(candidates = candidates.len(), queries = queries.len(), "Aggregation complete");
    candidates
}
