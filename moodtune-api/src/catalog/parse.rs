//! Search response parsing
//!
//! InnerTube search responses nest result rows several renderers deep and the
//! nesting differs between filtered and unfiltered searches. Rather than
//! following one fixed path, the parser walks the whole document and picks up
//! every `musicResponsiveListItemRenderer` in document order.

use super::{ArtistRef, RawTrack};
use serde_json::Value;

const ROW_RENDERER: &str = "musicResponsiveListItemRenderer";
const ARTIST_PAGE_TYPE: &str = "MUSIC_PAGE_TYPE_ARTIST";

/// Result-type labels shown in the subtitle of unfiltered results
const TYPE_LABELS: &[&str] = &[
    "Song", "Video", "Album", "Artist", "Playlist", "Single", "EP", "Episode", "Podcast",
    "Profile", "Station",
];

/// Extract result rows from a search response
pub fn parse_search_results(response: &Value) -> Vec<RawTrack> {
    let mut rows = Vec::new();
    collect_rows(response, &mut rows);
    rows.into_iter().map(parse_row).collect()
}

fn collect_rows<'a>(value: &'a Value, out: &mut Vec<&'a Value>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                if key == ROW_RENDERER {
                    out.push(child);
                } else {
                    collect_rows(child, out);
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_rows(item, out);
            }
        }
        _ => {}
    }
}

fn parse_row(row: &Value) -> RawTrack {
    let columns: Vec<&Value> = row
        .get("flexColumns")
        .and_then(Value::as_array)
        .map(|cols| {
            cols.iter()
                .filter_map(|c| c.pointer("/musicResponsiveListItemFlexColumnRenderer/text/runs"))
                .collect()
        })
        .unwrap_or_default();

    let title = columns
        .first()
        .and_then(|runs| runs.pointer("/0/text"))
        .and_then(Value::as_str)
        .map(str::to_string);

    RawTrack {
        video_id: video_id(row, columns.first().copied()),
        title,
        artists: artists(&columns),
    }
}

fn video_id(row: &Value, title_runs: Option<&Value>) -> Option<String> {
    let candidates = [
        row.pointer("/playlistItemData/videoId"),
        row.pointer(
            "/overlay/musicItemThumbnailOverlayRenderer/content/musicPlayButtonRenderer/playNavigationEndpoint/watchEndpoint/videoId",
        ),
        title_runs.and_then(|runs| runs.pointer("/0/navigationEndpoint/watchEndpoint/videoId")),
    ];

    candidates
        .into_iter()
        .flatten()
        .filter_map(Value::as_str)
        .find(|id| !id.is_empty())
        .map(str::to_string)
}

/// Credited artists from the subtitle columns
///
/// Runs linking to an artist page give id + name. When no run links anywhere
/// (uploads, some video rows) the first plain text run that is neither a
/// type label nor a separator is taken as the artist name.
fn artists(columns: &[&Value]) -> Vec<ArtistRef> {
    let runs: Vec<&Value> = columns
        .iter()
        .skip(1)
        .filter_map(|c| c.as_array())
        .flatten()
        .collect();

    let linked: Vec<ArtistRef> = runs
        .iter()
        .filter_map(|run| {
            let browse = run.pointer("/navigationEndpoint/browseEndpoint")?;
            let id = browse.get("browseId")?.as_str()?;
            let page_type = browse
                .pointer("/browseEndpointContextSupportedConfigs/browseEndpointContextMusicConfig/pageType")
                .and_then(Value::as_str);
            let is_artist = match page_type {
                Some(t) => t == ARTIST_PAGE_TYPE,
                None => id.starts_with("UC"),
            };
            is_artist.then(|| ArtistRef {
                id: Some(id.to_string()),
                name: run.get("text").and_then(Value::as_str).unwrap_or_default().to_string(),
            })
        })
        .collect();

    if !linked.is_empty() {
        return linked;
    }

    runs.iter()
        .filter(|run| run.get("navigationEndpoint").is_none())
        .filter_map(|run| run.get("text").and_then(Value::as_str))
        .map(str::trim)
        .find(|text| !is_separator(text) && !TYPE_LABELS.contains(text))
        .map(|name| {
            vec![ArtistRef {
                id: None,
                name: name.to_string(),
            }]
        })
        .unwrap_or_default()
}

fn is_separator(text: &str) -> bool {
    matches!(text, "" | "•" | "&" | "," | "·")
}
