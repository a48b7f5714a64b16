//! YouTube Music InnerTube client
//!
//! Every call is a JSON `POST {base}/youtubei/v1/{endpoint}?alt=json` carrying
//! the web-remix client context. Authentication headers come from the attached
//! [`CatalogAuth`] and are computed per request.

use super::auth::{CatalogAuth, MUSIC_ORIGIN};
use super::parse::parse_search_results;
use super::{
    CatalogError, CredentialKind, RawTrack, SearchCapable, SearchRequest, WriteCapable,
};
use async_trait::async_trait;
use moodtune_common::config::CatalogConfig;
use reqwest::header::{HeaderValue, CONTENT_TYPE, ORIGIN};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64; rv:128.0) Gecko/20100101 Firefox/128.0";
const CLIENT_NAME: &str = "WEB_REMIX";
const PLAYLIST_URL_BASE: &str = "https://music.youtube.com/playlist?list=";
const EDIT_SUCCEEDED: &str = "STATUS_SUCCEEDED";

// Search filter parameters (protobuf, base64). Spelling tolerance and the
// song filter are independent bits so each combination has its own value.
const PARAMS_IGNORE_SPELLING: &str = "EhGKAQ4IARABGAEgASgAOAFAAUICCAE%3D";
const PARAMS_SONGS: &str = "EgWKAQIIAWoMEA4QChADEAQQCRAF";
const PARAMS_SONGS_IGNORE_SPELLING: &str = "EgWKAQIIAUICCAFqDBAOEAoQAxAEEAkQBQ%3D%3D";

/// Search `params` value for a filter combination
pub fn search_params(songs_only: bool, ignore_spelling: bool) -> Option<&'static str> {
    match (songs_only, ignore_spelling) {
        (false, false) => None,
        (false, true) => Some(PARAMS_IGNORE_SPELLING),
        (true, false) => Some(PARAMS_SONGS),
        (true, true) => Some(PARAMS_SONGS_IGNORE_SPELLING),
    }
}

/// Catalog client bound to one set of credentials
pub struct YtMusicClient {
    http: reqwest::Client,
    base_url: String,
    language: String,
    privacy_status: String,
    auth: CatalogAuth,
}

impl YtMusicClient {
    pub fn new(auth: CatalogAuth, config: &CatalogConfig) -> Result<Self, CatalogError> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            language: config.language.clone(),
            privacy_status: config.privacy_status.clone(),
            auth,
        })
    }

    pub fn kind(&self) -> CredentialKind {
        self.auth.kind()
    }

    fn context(&self) -> Value {
        let version = format!("1.{}.01.00", chrono::Utc::now().format("%Y%m%d"));
        json!({
            "client": {
                "clientName": CLIENT_NAME,
                "clientVersion": version,
                "hl": self.language,
            },
            "user": {},
        })
    }

    async fn post(&self, endpoint: &str, mut body: Value) -> Result<Value, CatalogError> {
        if let Value::Object(map) = &mut body {
            map.insert("context".to_string(), self.context());
        }

        let url = format!("{}/youtubei/v1/{}", self.base_url, endpoint);
        let mut headers = self.auth.headers(&self.http).await?;
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers
            .entry(ORIGIN)
            .or_insert(HeaderValue::from_static(MUSIC_ORIGIN));

        debug!(endpoint, kind = %self.kind(), "Catalog request");

        let response = self
            .http
            .post(&url)
            .query(&[("alt", "json")])
            .headers(headers)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CatalogError::Status {
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| CatalogError::Parse(format!("{} response: {}", endpoint, e)))
    }
}

#[async_trait]
impl SearchCapable for YtMusicClient {
    async fn search(&self, request: &SearchRequest) -> Result<Vec<RawTrack>, CatalogError> {
        let mut body = json!({ "query": request.query });
        if let Some(params) = search_params(request.songs_only, request.ignore_spelling) {
            body["params"] = Value::from(params);
        }

        let response = self.post("search", body).await?;
        let mut tracks = parse_search_results(&response);
        tracks.truncate(request.limit);

        debug!(
            query = %request.query,
            songs_only = request.songs_only,
            ignore_spelling = request.ignore_spelling,
            results = tracks.len(),
            "Search complete"
        );
        Ok(tracks)
    }
}

#[async_trait]
impl WriteCapable for YtMusicClient {
    async fn create_playlist(&self, title: &str, description: &str) -> Result<String, CatalogError> {
        let body = json!({
            "title": title,
            "description": sanitize_description(description),
            "privacyStatus": self.privacy_status,
        });

        let response = self.post("playlist/create", body).await?;
        response
            .get("playlistId")
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .ok_or_else(|| CatalogError::Parse("playlist/create returned no playlistId".to_string()))
    }

    async fn add_items(&self, playlist_id: &str, track_ids: &[String]) -> Result<(), CatalogError> {
        if track_ids.is_empty() {
            return Ok(());
        }

        let actions: Vec<Value> = track_ids
            .iter()
            .map(|id| json!({ "action": "ACTION_ADD_VIDEO", "addedVideoId": id }))
            .collect();
        let body = json!({
            "playlistId": strip_browse_prefix(playlist_id),
            "actions": actions,
        });

        let response = self.post("browse/edit_playlist", body).await?;
        match response.get("status").and_then(Value::as_str) {
            Some(EDIT_SUCCEEDED) => Ok(()),
            Some(other) => Err(CatalogError::Rejected(format!("edit_playlist status {}", other))),
            None => Err(CatalogError::Rejected("edit_playlist returned no status".to_string())),
        }
    }

    fn playlist_url(&self, playlist_id: &str) -> String {
        format!("{}{}", PLAYLIST_URL_BASE, strip_browse_prefix(playlist_id))
    }
}

/// Playlist ids may arrive as browse ids (`VL` + id)
fn strip_browse_prefix(playlist_id: &str) -> &str {
    playlist_id.strip_prefix("VL").unwrap_or(playlist_id)
}

/// The catalog rejects descriptions containing angle brackets
fn sanitize_description(description: &str) -> String {
    description.chars().filter(|c| *c != '<' && *c != '>').collect()
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 512;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
