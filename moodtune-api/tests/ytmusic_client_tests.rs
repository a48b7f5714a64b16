//! Catalog client tests against a mock InnerTube server

use moodtune_api::catalog::ytmusic::search_params;
use moodtune_api::catalog::{
    BrowserSession, CatalogAuth, CatalogError, CredentialKind, OAuthClientCredentials,
    OAuthSession, OAuthToken, SearchCapable, SearchRequest, WriteCapable, YtMusicClient,
};
use moodtune_common::config::CatalogConfig;
use serde_json::{json, Value};
use moodtune_api::searcher;
use std::collections::BTreeMap;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{body_partial_json, body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

fn config(server: &MockServer) -> CatalogConfig {
    CatalogConfig {
        base_url: server.uri(),
        timeout_secs: 5,
        ..Default::default()
    }
}

fn browser_client(server: &MockServer) -> YtMusicClient {
    let mut headers = BTreeMap::new();
    headers.insert("cookie".to_string(), "SID=s; __Secure-3PAPISID=sapisid".to_string());
    headers.insert("x-goog-authuser".to_string(), "0".to_string());
    let session = BrowserSession::from_headers(headers).unwrap();
    YtMusicClient::new(CatalogAuth::Browser(session), &config(server)).unwrap()
}

fn credentials() -> OAuthClientCredentials {
    OAuthClientCredentials {
        client_id: "client-id".to_string(),
        client_secret: "client-secret".to_string(),
    }
}

fn song(video_id: &str, artist: &str) -> Value {
    json!({"musicResponsiveListItemRenderer": {
        "playlistItemData": {"videoId": video_id},
        "flexColumns": [
            {"musicResponsiveListItemFlexColumnRenderer": {"text": {"runs": [{"text": format!("Song {}", video_id)}]}}},
            {"musicResponsiveListItemFlexColumnRenderer": {"text": {"runs": [{
                "text": artist,
                "navigationEndpoint": {"browseEndpoint": {"browseId": format!("UC{}", artist)}}
            }]}}}
        ]
    }})
}

fn search_response(rows: Vec<Value>) -> Value {
    json!({"contents": {"tabbedSearchResultsRenderer": {"tabs": [{"tabRenderer": {"content": {
        "sectionListRenderer": {"contents": [{"musicShelfRenderer": {"contents": rows}}]}
    }}}]}}})
}

fn request(query: &str, songs_only: bool, ignore_spelling: bool) -> SearchRequest {
    SearchRequest {
        query: query.to_string(),
        limit: 2,
        songs_only,
        ignore_spelling,
    }
}

// =============================================================================
// Search
// =============================================================================

#[tokio::test]
async fn test_browser_search_sends_filter_and_signature() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/youtubei/v1/search"))
        .and(query_param("alt", "json"))
        .and(header("x-goog-authuser", "0"))
        .and(body_partial_json(json!({
            "query": "city pop night",
            "params": search_params(true, false).unwrap(),
            "context": {"client": {"clientName": "WEB_REMIX", "hl": "en"}}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_response(vec![
            song("v1", "Aimer"),
            song("v2", "Lisa"),
            song("v3", "Aimer"),
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let client = browser_client(&server);
    let tracks = client.search(&request("city pop night", true, false)).await.unwrap();

    assert_eq!(tracks.len(), 2);
    assert_eq!(tracks[0].video_id.as_deref(), Some("v1"));
    assert_eq!(tracks[1].artists[0].id.as_deref(), Some("UCLisa"));

    let received = server.received_requests().await.unwrap();
    let auth = received[0].headers.get("authorization").unwrap().to_str().unwrap();
    assert!(auth.starts_with("SAPISIDHASH "));
}

#[tokio::test]
async fn test_unfiltered_search_omits_params() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/youtubei/v1/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_response(vec![])))
        .mount(&server)
        .await;

    let client = browser_client(&server);
    let tracks = client.search(&request("jazz", false, false)).await.unwrap();
    assert!(tracks.is_empty());

    let received = server.received_requests().await.unwrap();
    let body: Value = serde_json::from_slice(&received[0].body).unwrap();
    assert!(body.get("params").is_none());
}

#[tokio::test]
async fn test_error_status_is_reported() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/youtubei/v1/search"))
        .respond_with(ResponseTemplate::new(400).set_body_string("Request contains an invalid argument."))
        .mount(&server)
        .await;

    let client = browser_client(&server);
    let result = client.search(&request("jazz", true, false)).await;

    match result {
        Err(CatalogError::Status { status, body }) => {
            assert_eq!(status, 400);
            assert!(body.contains("invalid argument"));
        }
        other => panic!("expected status error, got {:?}", other),
    }
}

// =============================================================================
// OAuth
// =============================================================================

#[tokio::test]
async fn test_expired_token_is_refreshed_and_saved() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let token_path = dir.path().join("oauth.json");
    std::fs::write(
        &token_path,
        r#"{"access_token": "stale", "refresh_token": "refresh-me", "expires_at": 0, "scope": "yt"}"#,
    )
    .unwrap();

    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains("grant_type=refresh_token"))
        .and(body_string_contains("refresh_token=refresh-me"))
        .and(body_string_contains("client_id=client-id"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "fresh",
            "expires_in": 3600,
            "token_type": "Bearer"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/youtubei/v1/search"))
        .and(header("authorization", "Bearer fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_response(vec![song("v9", "Yui")])))
        .expect(2)
        .mount(&server)
        .await;

    let session = OAuthSession::load(&token_path, credentials())
        .unwrap()
        .with_token_url(format!("{}/token", server.uri()));
    let client = YtMusicClient::new(CatalogAuth::OAuth(session), &config(&server)).unwrap();
    assert_eq!(client.kind(), CredentialKind::OAuth);

    // second call reuses the refreshed token
    for _ in 0..2 {
        let tracks = client.search(&request("yui", false, true)).await.unwrap();
        assert_eq!(tracks[0].video_id.as_deref(), Some("v9"));
    }

    let saved = OAuthToken::load(&token_path).unwrap();
    assert_eq!(saved.access_token, "fresh");
    assert_eq!(saved.refresh_token, "refresh-me");
    assert!(saved.expires_at > 0);
    assert_eq!(saved.extra["scope"], "yt");
}

#[tokio::test]
async fn test_refresh_failure_is_auth_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({"error": "invalid_grant"})))
        .mount(&server)
        .await;

    let token = OAuthToken {
        access_token: "stale".into(),
        refresh_token: "revoked".into(),
        expires_at: 0,
        token_type: "Bearer".into(),
        extra: Default::default(),
    };
    let session = OAuthSession::new(token, None, credentials())
        .with_token_url(format!("{}/token", server.uri()));
    let client = YtMusicClient::new(CatalogAuth::OAuth(session), &config(&server)).unwrap();

    let result = client.search(&request("anything", false, false)).await;
    assert!(matches!(result, Err(CatalogError::Auth(_))));
}

#[tokio::test]
async fn test_timed_out_attempt_moves_to_next_rung() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/youtubei/v1/search"))
        .and(body_partial_json(json!({"params": search_params(false, true).unwrap()})))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_response(vec![song("v7", "Yui")])))
        .with_priority(1)
        .expect(1)
        .mount(&server)
        .await;

    // The plain attempt answers long after the client gives up
    Mock::given(method("POST"))
        .and(path("/youtubei/v1/search"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(search_response(vec![song("late", "Slow")]))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let token = OAuthToken {
        access_token: "valid".into(),
        refresh_token: "refresh".into(),
        expires_at: 4_102_444_800,
        token_type: "Bearer".into(),
        extra: Default::default(),
    };
    let session = OAuthSession::new(token, None, credentials());
    let catalog = CatalogConfig {
        timeout_secs: 1,
        ..config(&server)
    };
    let client = YtMusicClient::new(CatalogAuth::OAuth(session), &catalog).unwrap();

    let tracks = searcher::search(&client, CredentialKind::OAuth, "yui rainy night songs", 5).await;

    assert_eq!(tracks.len(), 1);
    assert_eq!(tracks[0].video_id.as_deref(), Some("v7"));
}

// =============================================================================
// Playlist writes
// =============================================================================

#[tokio::test]
async fn test_create_playlist_returns_id() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/youtubei/v1/playlist/create"))
        .and(body_partial_json(json!({
            "title": "MoodTune: Rain J-POP",
            "description": "night b",
            "privacyStatus": "PRIVATE"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"playlistId": "PLnew"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = browser_client(&server);
    let id = client
        .create_playlist("MoodTune: Rain J-POP", "night <b>")
        .await
        .unwrap();

    assert_eq!(id, "PLnew");
    assert_eq!(client.playlist_url(&id), "https://music.youtube.com/playlist?list=PLnew");
}

#[tokio::test]
async fn test_create_without_id_is_parse_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/youtubei/v1/playlist/create"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let client = browser_client(&server);
    let result = client.create_playlist("t", "d").await;
    assert!(matches!(result, Err(CatalogError::Parse(_))));
}

#[tokio::test]
async fn test_add_items_strips_browse_prefix() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/youtubei/v1/browse/edit_playlist"))
        .and(body_partial_json(json!({
            "playlistId": "PLnew",
            "actions": [
                {"action": "ACTION_ADD_VIDEO", "addedVideoId": "v1"},
                {"action": "ACTION_ADD_VIDEO", "addedVideoId": "v2"}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "STATUS_SUCCEEDED"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = browser_client(&server);
    client
        .add_items("VLPLnew", &["v1".to_string(), "v2".to_string()])
        .await
        .unwrap();
}

#[tokio::test]
async fn test_add_items_rejected_status() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/youtubei/v1/browse/edit_playlist"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "STATUS_FAILED"})))
        .mount(&server)
        .await;

    let client = browser_client(&server);
    let result = client.add_items("PLnew", &["v1".to_string()]).await;
    assert!(matches!(result, Err(CatalogError::Rejected(_))));
}

#[tokio::test]
async fn test_add_nothing_makes_no_request() {
    let server = MockServer::start().await;
    let client = browser_client(&server);

    client.add_items("PLnew", &[]).await.unwrap();

    let received: Vec<Request> = server.received_requests().await.unwrap();
    assert!(received.is_empty());
}
