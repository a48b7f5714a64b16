//! Remote music catalog capabilities
//!
//! The pipeline talks to the catalog only through two narrow traits:
//! - [`SearchCapable`]: text search with independent song-filter and
//!   spelling-tolerance toggles
//! - [`WriteCapable`]: playlist creation and item addition
//!
//! [`ytmusic::YtMusicClient`] implements both for the two credential kinds
//! ([`CredentialKind::Browser`], [`CredentialKind::OAuth`]).

pub mod auth;
pub mod parse;
pub mod ytmusic;

use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

pub use auth::{BrowserSession, CatalogAuth, OAuthClientCredentials, OAuthSession, OAuthToken};
pub use ytmusic::YtMusicClient;

/// Which credential material backs a catalog handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CredentialKind {
    /// Cookie/header credentials copied from a logged-in web session
    Browser,
    /// Token credentials from the device-code flow
    OAuth,
}

impl CredentialKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CredentialKind::Browser => "browser",
            CredentialKind::OAuth => "oauth",
        }
    }
}

impl fmt::Display for CredentialKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One catalog search call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub query: String,
    pub limit: usize,
    /// Restrict results to track-type entries
    pub songs_only: bool,
    /// Relax exact-text matching
    pub ignore_spelling: bool,
}

/// Artist credited on a search result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtistRef {
    /// Catalog browse id, when the result links to an artist page
    pub id: Option<String>,
    pub name: String,
}

/// Raw search result record as returned by the catalog
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawTrack {
    /// Playable track identifier; rows such as albums or artists carry none
    pub video_id: Option<String>,
    pub title: Option<String>,
    pub artists: Vec<ArtistRef>,
}

/// Catalog adapter errors
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Transport failure, including timeouts
    #[error("HTTP error: {0}")]
    Http(String),

    /// Catalog answered with a non-success status
    #[error("Catalog returned {status}: {body}")]
    Status { status: u16, body: String },

    /// Response did not have the expected shape
    #[error("Parse error: {0}")]
    Parse(String),

    /// Credential material missing, malformed or not refreshable
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Catalog processed the request but reported failure
    #[error("Request rejected: {0}")]
    Rejected(String),
}

impl From<reqwest::Error> for CatalogError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            CatalogError::Http(format!("request timed out: {}", e))
        } else {
            CatalogError::Http(e.to_string())
        }
    }
}

/// Catalog search capability
#[async_trait]
pub trait SearchCapable: Send + Sync {
    async fn search(&self, request: &SearchRequest) -> Result<Vec<RawTrack>, CatalogError>;
}

/// Catalog playlist-write capability
#[async_trait]
pub trait WriteCapable: Send + Sync {
    /// Create an empty playlist, returning its id
    async fn create_playlist(&self, title: &str, description: &str) -> Result<String, CatalogError>;

    /// Append tracks to an existing playlist
    async fn add_items(&self, playlist_id: &str, track_ids: &[String]) -> Result<(), CatalogError>;

    /// Public URL of a playlist
    fn playlist_url(&self, playlist_id: &str) -> String;
}
