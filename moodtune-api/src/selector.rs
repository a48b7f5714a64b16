//! Artist-diverse track selection
//!
//! Two greedy passes over the candidate pool, both in input order:
//!
//! - **Pass 1** accepts a candidate unless its artist is at the cap, or it
//!   repeats the previously accepted artist while a later candidate by another
//!   under-cap artist is still available.
//! - **Pass 2** revisits the candidates pass 1 skipped and accepts any whose
//!   artist is still under the cap, without the repeat rule.
//!
//! The output lists pass-1 picks followed by pass-2 picks. Candidates without
//! an artist share one "unknown" bucket and its cap. The per-artist cap is
//! never exceeded, even when that leaves the selection short.

use crate::aggregator::CandidateTrack;
use std::collections::{HashMap, HashSet};

/// Artist bucket used for capping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtistKey<'a> {
    Known(&'a str),
    Unknown,
}

impl<'a> ArtistKey<'a> {
    pub fn of(candidate: &'a CandidateTrack) -> Self {
        match candidate.artist_id.as_deref() {
            Some(id) if !id.is_empty() => ArtistKey::Known(id),
            _ => ArtistKey::Unknown,
        }
    }
}

/// Selection state threaded through both passes
#[derive(Debug)]
struct Selection<'a> {
    picked: Vec<&'a str>,
    picked_ids: HashSet<&'a str>,
    per_artist: HashMap<ArtistKey<'a>, usize>,
    last_artist: Option<ArtistKey<'a>>,
    max_tracks: usize,
    max_per_artist: usize,
}

impl<'a> Selection<'a> {
    fn new(max_tracks: usize, max_per_artist: usize) -> Self {
        Self {
            picked: Vec::with_capacity(max_tracks),
            picked_ids: HashSet::new(),
            per_artist: HashMap::new(),
            last_artist: None,
            max_tracks,
            max_per_artist,
        }
    }

    fn is_full(&self) -> bool {
        self.picked.len() >= self.max_tracks
    }

    fn under_cap(&self, artist: ArtistKey<'a>) -> bool {
        self.per_artist.get(&artist).copied().unwrap_or(0) < self.max_per_artist
    }

    fn is_eligible(&self, candidate: &'a CandidateTrack) -> bool {
        !candidate.track_id.is_empty()
            && !self.picked_ids.contains(candidate.track_id.as_str())
            && self.under_cap(ArtistKey::of(candidate))
    }

    fn accept(&mut self, candidate: &'a CandidateTrack) {
        let artist = ArtistKey::of(candidate);
        self.picked.push(&candidate.track_id);
        self.picked_ids.insert(&candidate.track_id);
        *self.per_artist.entry(artist).or_insert(0) += 1;
        self.last_artist = Some(artist);
    }

    /// Another under-cap artist is still available after `index`
    fn has_alternative_after(
        &self,
        candidates: &'a [CandidateTrack],
        index: usize,
        artist: ArtistKey<'a>,
    ) -> bool {
        candidates[index + 1..]
            .iter()
            .any(|later| ArtistKey::of(later) != artist && self.is_eligible(later))
    }
}

/// Pick up to `max_tracks` track ids with at most `max_per_artist` per artist
pub fn select(candidates: &[CandidateTrack], max_tracks: usize, max_per_artist: usize) -> Vec<String> {
    let mut selection = Selection::new(max_tracks, max_per_artist);
    let mut skipped: Vec<&CandidateTrack> = Vec::new();

    for (index, candidate) in candidates.iter().enumerate() {
        if selection.is_full() {
            break;
        }
        if !selection.is_eligible(candidate) {
            skipped.push(candidate);
            continue;
        }

        let artist = ArtistKey::of(candidate);
        if selection.last_artist == Some(artist)
            && selection.has_alternative_after(candidates, index, artist)
        {
            skipped.push(candidate);
            continue;
        }

        selection.accept(candidate);
    }

    for candidate in skipped {
        if selection.is_full() {
            break;
        }
        if selection.is_eligible(candidate) {
            selection.accept(candidate);
        }
    }

    selection.picked.into_iter().map(str::to_string).collect()
}
