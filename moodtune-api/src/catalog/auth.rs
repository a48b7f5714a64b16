//! Catalog credential material
//!
//! Two variants, one per [`CredentialKind`]:
//! - [`BrowserSession`]: request headers exported from a logged-in browser
//!   (`browser.json` / `headers_auth.json`). Each request is signed with a
//!   `SAPISIDHASH` derived from the session cookie.
//! - [`OAuthSession`]: `oauth.json` token plus the client id/secret needed to
//!   refresh it. Refreshed tokens are written back to the file best-effort.

use super::{CatalogError, CredentialKind};
use moodtune_common::config::write_atomically;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha1::{Digest, Sha1};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Origin the catalog expects on authenticated requests
pub const MUSIC_ORIGIN: &str = "https://music.youtube.com";

/// Google OAuth token endpoint
pub const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Refresh tokens expiring within this many seconds
const REFRESH_MARGIN_SECS: i64 = 60;

/// Browser headers never forwarded from the stored file
///
/// `authorization` is recomputed per request; the encoding headers would ask
/// for compressed bodies the HTTP client is not configured to decode.
const SKIPPED_BROWSER_HEADERS: &[&str] = &[
    "authorization",
    "content-length",
    "content-encoding",
    "accept-encoding",
    "host",
];

/// Cookie names carrying the SAPISID value, in preference order
const SAPISID_COOKIES: &[&str] = &["__Secure-3PAPISID", "SAPISID"];

/// Credential variant attached to a catalog client
pub enum CatalogAuth {
    Browser(BrowserSession),
    OAuth(OAuthSession),
}

impl CatalogAuth {
    pub fn kind(&self) -> CredentialKind {
        match self {
            CatalogAuth::Browser(_) => CredentialKind::Browser,
            CatalogAuth::OAuth(_) => CredentialKind::OAuth,
        }
    }

    /// Authentication headers for one request
    pub async fn headers(&self, http: &reqwest::Client) -> Result<HeaderMap, CatalogError> {
        let now = chrono::Utc::now().timestamp();
        match self {
            CatalogAuth::Browser(session) => Ok(session.headers(now)),
            CatalogAuth::OAuth(session) => session.headers(http, now).await,
        }
    }
}

// ============================================================================
// Browser session
// ============================================================================

/// Headers copied from a logged-in web session
#[derive(Debug, Clone)]
pub struct BrowserSession {
    headers: BTreeMap<String, String>,
    sapisid: String,
    origin: String,
}

impl BrowserSession {
    /// Load a browser headers file (JSON object of header name → value)
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| CatalogError::Auth(format!("Read {} failed: {}", path.display(), e)))?;
        let raw: serde_json::Map<String, Value> = serde_json::from_str(&content)
            .map_err(|e| CatalogError::Auth(format!("Parse {} failed: {}", path.display(), e)))?;

        let headers = raw
            .into_iter()
            .filter_map(|(k, v)| match v {
                Value::String(s) => Some((k.to_ascii_lowercase(), s)),
                _ => None,
            })
            .collect();

        Self::from_headers(headers)
    }

    /// Build a session from already-lowercased header pairs
    pub fn from_headers(headers: BTreeMap<String, String>) -> Result<Self, CatalogError> {
        let cookie = headers
            .get("cookie")
            .ok_or_else(|| CatalogError::Auth("browser headers have no cookie".to_string()))?;

        let sapisid = sapisid_from_cookie(cookie).ok_or_else(|| {
            CatalogError::Auth(
                "cookie has no __Secure-3PAPISID or SAPISID value; copy the headers from a logged-in session"
                    .to_string(),
            )
        })?;

        let origin = headers
            .get("origin")
            .or_else(|| headers.get("x-origin"))
            .cloned()
            .unwrap_or_else(|| MUSIC_ORIGIN.to_string());

        Ok(Self {
            headers,
            sapisid,
            origin,
        })
    }

    /// `SAPISIDHASH <ts>_<sha1("<ts> <sapisid> <origin>")>`
    pub fn authorization(&self, unix_secs: i64) -> String {
        let mut hasher = Sha1::new();
        hasher.update(format!("{} {} {}", unix_secs, self.sapisid, self.origin).as_bytes());
        format!("SAPISIDHASH {}_{}", unix_secs, hex::encode(hasher.finalize()))
    }

    fn headers(&self, unix_secs: i64) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (key, value) in &self.headers {
            if SKIPPED_BROWSER_HEADERS.contains(&key.as_str()) {
                continue;
            }
            match (
                HeaderName::from_bytes(key.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                (Ok(name), Ok(value)) => {
                    map.insert(name, value);
                }
                _ => warn!(header = %key, "Skipping unusable browser header"),
            }
        }

        if let Ok(value) = HeaderValue::from_str(&self.authorization(unix_secs)) {
            map.insert(AUTHORIZATION, value);
        }
        map
    }
}

fn sapisid_from_cookie(cookie: &str) -> Option<String> {
    let pairs: Vec<(&str, &str)> = cookie
        .split(';')
        .filter_map(|part| part.trim().split_once('='))
        .collect();

    SAPISID_COOKIES.iter().find_map(|name| {
        pairs
            .iter()
            .find(|(k, v)| k == name && !v.is_empty())
            .map(|(_, v)| v.to_string())
    })
}

// ============================================================================
// OAuth session
// ============================================================================

/// Stored OAuth token (`oauth.json`)
///
/// Unknown fields are kept so a write-back does not drop them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthToken {
    pub access_token: String,
    pub refresh_token: String,
    /// Unix seconds; 0 forces a refresh on first use
    #[serde(default)]
    pub expires_at: i64,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

impl OAuthToken {
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| CatalogError::Auth(format!("Read {} failed: {}", path.display(), e)))?;
        serde_json::from_str(&content)
            .map_err(|e| CatalogError::Auth(format!("Parse {} failed: {}", path.display(), e)))
    }

    pub fn expires_within(&self, now: i64, margin_secs: i64) -> bool {
        self.expires_at - now < margin_secs
    }
}

/// Client id and secret used to refresh OAuth tokens
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthClientCredentials {
    pub client_id: String,
    pub client_secret: String,
}

#[derive(Debug, Deserialize)]
struct TokenRefreshResponse {
    access_token: String,
    expires_in: i64,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default)]
    scope: Option<String>,
}

/// OAuth token with refresh support
pub struct OAuthSession {
    token: Mutex<OAuthToken>,
    token_path: Option<PathBuf>,
    credentials: OAuthClientCredentials,
    token_url: String,
}

impl OAuthSession {
    pub fn new(
        token: OAuthToken,
        token_path: Option<PathBuf>,
        credentials: OAuthClientCredentials,
    ) -> Self {
        Self {
            token: Mutex::new(token),
            token_path,
            credentials,
            token_url: GOOGLE_TOKEN_URL.to_string(),
        }
    }

    /// Load `oauth.json`; refreshed tokens are written back to the same path
    pub fn load(path: &Path, credentials: OAuthClientCredentials) -> Result<Self, CatalogError> {
        let token = OAuthToken::load(path)?;
        Ok(Self::new(token, Some(path.to_path_buf()), credentials))
    }

    /// Override the token endpoint
    pub fn with_token_url(mut self, url: impl Into<String>) -> Self {
        self.token_url = url.into();
        self
    }

    /// Current access token, refreshed first if it is about to expire
    pub async fn access_token(&self, http: &reqwest::Client, now: i64) -> Result<String, CatalogError> {
        let mut token = self.token.lock().await;

        if token.expires_within(now, REFRESH_MARGIN_SECS) {
            debug!(expires_at = token.expires_at, "Refreshing OAuth access token");
            self.refresh(http, &mut token, now).await?;
            self.persist(&token);
        }

        Ok(token.access_token.clone())
    }

    async fn headers(&self, http: &reqwest::Client, now: i64) -> Result<HeaderMap, CatalogError> {
        let access_token = self.access_token(http, now).await?;

        let mut map = HeaderMap::new();
        let bearer = HeaderValue::from_str(&format!("Bearer {}", access_token))
            .map_err(|e| CatalogError::Auth(format!("Invalid access token: {}", e)))?;
        map.insert(AUTHORIZATION, bearer);
        if let Ok(value) = HeaderValue::from_str(&now.to_string()) {
            map.insert(HeaderName::from_static("x-goog-request-time"), value);
        }
        Ok(map)
    }

    async fn refresh(
        &self,
        http: &reqwest::Client,
        token: &mut OAuthToken,
        now: i64,
    ) -> Result<(), CatalogError> {
        let response = http
            .post(&self.token_url)
            .form(&[
                ("client_id", self.credentials.client_id.as_str()),
                ("client_secret", self.credentials.client_secret.as_str()),
                ("grant_type", "refresh_token"),
                ("refresh_token", token.refresh_token.as_str()),
            ])
            .send()
            .await
            .map_err(|e| CatalogError::Auth(format!("Token refresh request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(CatalogError::Auth(format!(
                "Token refresh returned {}: {}",
                status, body
            )));
        }

        let refreshed: TokenRefreshResponse = response
            .json()
            .await
            .map_err(|e| CatalogError::Auth(format!("Failed to parse token refresh: {}", e)))?;

        token.access_token = refreshed.access_token;
        token.expires_at = now + refreshed.expires_in;
        token
            .extra
            .insert("expires_in".to_string(), Value::from(refreshed.expires_in));
        if let Some(refresh_token) = refreshed.refresh_token {
            token.refresh_token = refresh_token;
        }
        if let Some(token_type) = refreshed.token_type {
            token.token_type = token_type;
        }
        if let Some(scope) = refreshed.scope {
            token.extra.insert("scope".to_string(), Value::from(scope));
        }

        info!(expires_at = token.expires_at, "OAuth access token refreshed");
        Ok(())
    }

    fn persist(&self, token: &OAuthToken) {
        let Some(path) = &self.token_path else {
            return;
        };

        let result = serde_json::to_string_pretty(token)
            .map_err(|e| e.to_string())
            .and_then(|json| write_atomically(path, &json).map_err(|e| e.to_string()));

        if let Err(e) = result {
            warn!("Refreshed token could not be saved to {}: {}", path.display(), e);
        }
    }
}
