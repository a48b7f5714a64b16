//! Per-query search with credential-specific degradation
//!
//! Browser-backed search makes a single song-filtered attempt. OAuth-backed
//! search never uses the song filter (it provokes protocol errors there) and
//! walks a fixed ladder instead:
//!
//! 1. plain query
//! 2. plain query, spelling tolerance on
//! 3. first three words, spelling tolerance on
//!
//! Only a failed call moves to the next rung; an empty but successful answer
//! is final. When every rung fails the result is empty, never an error.

use crate::catalog::{CatalogError, CredentialKind, RawTrack, SearchCapable, SearchRequest};
use tracing::{debug, error, warn};

/// Words kept when a query is collapsed for the last OAuth attempt
const COLLAPSED_QUERY_WORDS: usize = 3;

/// One planned catalog call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchAttempt {
    pub query: String,
    pub songs_only: bool,
    pub ignore_spelling: bool,
}

impl SearchAttempt {
    fn request(&self, limit: usize) -> SearchRequest {
        SearchRequest {
            query: self.query.clone(),
            limit,
            songs_only: self.songs_only,
            ignore_spelling: self.ignore_spelling,
        }
    }
}

/// Attempts to make for a query, in order
pub fn attempt_plan(kind: CredentialKind, query: &str) -> Vec<SearchAttempt> {
    match kind {
        CredentialKind::Browser => vec![SearchAttempt {
            query: query.to_string(),
            songs_only: true,
            ignore_spelling: false,
        }],
        CredentialKind::OAuth => vec![
            SearchAttempt {
                query: query.to_string(),
                songs_only: false,
                ignore_spelling: false,
            },
            SearchAttempt {
                query: query.to_string(),
                songs_only: false,
                ignore_spelling: true,
            },
            SearchAttempt {
                query: collapse_query(query),
                songs_only: false,
                ignore_spelling: true,
            },
        ],
    }
}

fn collapse_query(query: &str) -> String {
    query
        .split_whitespace()
        .take(COLLAPSED_QUERY_WORDS)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Run one query through the attempt plan for `kind`
pub async fn search(
    handle: &dyn SearchCapable,
    kind: CredentialKind,
    query: &str,
    limit: usize,
) -> Vec<RawTrack> {
    let plan = attempt_plan(kind, query);
    let attempts = plan.len();

    for (index, attempt) in plan.iter().enumerate() {
        let outcome: Result<Vec<RawTrack>, CatalogError> =
            handle.search(&attempt.request(limit)).await;

        match outcome {
            Ok(tracks) => {
                debug!(
                    query = %attempt.query,
                    attempt = index + 1,
                    results = tracks.len(),
                    "Search succeeded"
                );
                return tracks;
            }
            Err(e) if kind == CredentialKind::Browser => {
                error!(query = %attempt.query, error = %e, "Browser search failed");
            }
            Err(e) => {
                warn!(
                    query = %attempt.query,
                    attempt = index + 1,
                    of = attempts,
                    songs_only = attempt.songs_only,
                    ignore_spelling = attempt.ignore_spelling,
                    error = %e,
                    "Search attempt failed"
                );
            }
        }
    }

    warn!(query = %query, kind = %kind, "Search attempts exhausted, treating as no results");
    Vec::new()
}
