//! Catalog credential resolution
//!
//! Two credential materials may be present in the auth directory:
//! - browser headers (`browser.json`, else `headers_auth.json`)
//! - an OAuth token (`oauth.json`), usable only together with the client id
//!   and secret from the environment
//!
//! Browser credentials are preferred for search because the song filter is
//! only reliable with them; OAuth is preferred for writes. When only one kind
//! exists it serves both roles. Having neither is the single configuration
//! failure of the pipeline.

use crate::catalog::{
    BrowserSession, CatalogAuth, CredentialKind, OAuthClientCredentials, OAuthSession,
    SearchCapable, WriteCapable, YtMusicClient,
};
use crate::error::PlaylistError;
use async_trait::async_trait;
use moodtune_common::config::CatalogConfig;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Browser credential file names, in priority order
pub const BROWSER_FILES: [&str; 2] = ["browser.json", "headers_auth.json"];

/// OAuth token file name
pub const OAUTH_FILE: &str = "oauth.json";

pub const OAUTH_CLIENT_ID_ENV: &str = "YT_OAUTH_CLIENT_ID";
pub const OAUTH_CLIENT_SECRET_ENV: &str = "YT_OAUTH_CLIENT_SECRET";

/// Where credential material is looked up
#[derive(Debug, Clone)]
pub struct CredentialSources {
    pub auth_dir: PathBuf,
    pub oauth_client_id: Option<String>,
    pub oauth_client_secret: Option<String>,
}

impl CredentialSources {
    /// Auth directory plus OAuth client secrets from the environment
    pub fn from_env(auth_dir: impl Into<PathBuf>) -> Self {
        let read = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());
        Self {
            auth_dir: auth_dir.into(),
            oauth_client_id: read(OAUTH_CLIENT_ID_ENV),
            oauth_client_secret: read(OAUTH_CLIENT_SECRET_ENV),
        }
    }
}

/// Which credential kind fills each role
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleAssignment {
    pub search: CredentialKind,
    pub write: CredentialKind,
}

/// Role policy given which kinds are usable
pub fn select_roles(browser: bool, oauth: bool) -> Option<RoleAssignment> {
    match (browser, oauth) {
        (true, true) => Some(RoleAssignment {
            search: CredentialKind::Browser,
            write: CredentialKind::OAuth,
        }),
        (true, false) => Some(RoleAssignment {
            search: CredentialKind::Browser,
            write: CredentialKind::Browser,
        }),
        (false, true) => Some(RoleAssignment {
            search: CredentialKind::OAuth,
            write: CredentialKind::OAuth,
        }),
        (false, false) => None,
    }
}

/// Search and write handles for one process
///
/// Both handles may point at the same client.
#[derive(Clone)]
pub struct ResolvedCredentials {
    pub search: Arc<dyn SearchCapable>,
    pub search_kind: CredentialKind,
    pub write: Arc<dyn WriteCapable>,
    pub write_kind: CredentialKind,
}

/// Source of catalog handles
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    async fn resolve(&self) -> Result<Arc<ResolvedCredentials>, PlaylistError>;
}

/// Resolves handles from the auth directory, caching the first success
pub struct CredentialResolver {
    sources: CredentialSources,
    catalog: CatalogConfig,
    token_url: Option<String>,
    cached: RwLock<Option<Arc<ResolvedCredentials>>>,
}

impl CredentialResolver {
    pub fn new(sources: CredentialSources, catalog: CatalogConfig) -> Self {
        Self {
            sources,
            catalog,
            token_url: None,
            cached: RwLock::new(None),
        }
    }

    /// Override the OAuth token endpoint
    pub fn with_token_url(mut self, url: impl Into<String>) -> Self {
        self.token_url = Some(url.into());
        self
    }

    fn probe_browser(&self) -> Option<BrowserSession> {
        for name in BROWSER_FILES {
            let path = self.sources.auth_dir.join(name);
            if !path.is_file() {
                continue;
            }
            match BrowserSession::load(&path) {
                Ok(session) => {
                    debug!("Browser credentials loaded from {}", path.display());
                    return Some(session);
                }
                Err(e) => warn!("Ignoring browser credentials {}: {}", path.display(), e),
            }
        }
        None
    }

    fn probe_oauth(&self) -> Option<OAuthSession> {
        let path = self.sources.auth_dir.join(OAUTH_FILE);
        if !path.is_file() {
            return None;
        }

        let (Some(client_id), Some(client_secret)) = (
            self.sources.oauth_client_id.clone(),
            self.sources.oauth_client_secret.clone(),
        ) else {
            warn!(
                "{} exists but {} / {} are not both set; OAuth credentials unavailable",
                path.display(),
                OAUTH_CLIENT_ID_ENV,
                OAUTH_CLIENT_SECRET_ENV
            );
            return None;
        };

        let credentials = OAuthClientCredentials {
            client_id,
            client_secret,
        };
        match OAuthSession::load(&path, credentials) {
            Ok(session) => {
                debug!("OAuth token loaded from {}", path.display());
                Some(match &self.token_url {
                    Some(url) => session.with_token_url(url.clone()),
                    None => session,
                })
            }
            Err(e) => {
                warn!("Ignoring OAuth token {}: {}", path.display(), e);
                None
            }
        }
    }

    fn client(&self, auth: CatalogAuth) -> Result<Arc<YtMusicClient>, PlaylistError> {
        YtMusicClient::new(auth, &self.catalog)
            .map(Arc::new)
            .map_err(|e| PlaylistError::Configuration(format!("catalog client setup failed: {}", e)))
    }

    async fn resolve_uncached(&self) -> Result<ResolvedCredentials, PlaylistError> {
        let browser = self.probe_browser();
        let oauth = self.probe_oauth();

        let roles = select_roles(browser.is_some(), oauth.is_some()).ok_or_else(|| {
            PlaylistError::Configuration(format!(
                "no browser headers ({}) or OAuth token ({} with {} and {}) found in {}",
                BROWSER_FILES.join(" / "),
                OAUTH_FILE,
                OAUTH_CLIENT_ID_ENV,
                OAUTH_CLIENT_SECRET_ENV,
                display_dir(&self.sources.auth_dir)
            ))
        })?;

        let browser = browser
            .map(|s| self.client(CatalogAuth::Browser(s)))
            .transpose()?;
        let oauth = oauth
            .map(|s| self.client(CatalogAuth::OAuth(s)))
            .transpose()?;

        let pick = |kind: CredentialKind| -> Result<Arc<YtMusicClient>, PlaylistError> {
            let client = match kind {
                CredentialKind::Browser => browser.clone(),
                CredentialKind::OAuth => oauth.clone(),
            };
            client.ok_or_else(|| {
                PlaylistError::Configuration(format!("{} credentials missing", kind))
            })
        };

        let search = pick(roles.search)?;
        let write = pick(roles.write)?;

        info!(
            search = %roles.search,
            write = %roles.write,
            "Catalog credentials resolved"
        );

        Ok(ResolvedCredentials {
            search,
            search_kind: roles.search,
            write,
            write_kind: roles.write,
        })
    }
}

#[async_trait]
impl CredentialProvider for CredentialResolver {
    async fn resolve(&self) -> Result<Arc<ResolvedCredentials>, PlaylistError> {
        if let Some(resolved) = self.cached.read().await.as_ref() {
            return Ok(resolved.clone());
        }

        // Concurrent first requests may both resolve; the last one wins.
        let resolved = Arc::new(self.resolve_uncached().await?);
        *self.cached.write().await = Some(resolved.clone());
        Ok(resolved)
    }
}

fn display_dir(path: &Path) -> String {
    std::fs::canonicalize(path)
        .unwrap_or_else(|_| path.to_path_buf())
        .display()
        .to_string()
}
