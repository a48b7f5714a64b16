//! Bootstrap configuration loading and config file resolution
//!
//! Priority order for every setting:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! Levels 1 and 2 are handled by the binary's argument parser; this module
//! covers locating and reading the TOML file and supplies the defaults.
//! A missing TOML file is never fatal: a warning is logged and defaults apply.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "MOODTUNE_CONFIG";

/// Config file name under the platform config directory
pub const CONFIG_FILE_NAME: &str = "moodtune-api.toml";

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TomlConfig {
    /// Address the HTTP server binds to
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory holding `browser.json`, `headers_auth.json` and `oauth.json`
    #[serde(default = "default_auth_dir")]
    pub auth_dir: PathBuf,

    /// Origins allowed by CORS
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub catalog: CatalogConfig,

    #[serde(default)]
    pub selection: SelectionConfig,

    /// Text generation settings; absent section means templates only
    /// unless an API key arrives through the environment
    #[serde(default)]
    pub llm: LlmConfig,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
            auth_dir: default_auth_dir(),
            allowed_origins: default_allowed_origins(),
            logging: LoggingConfig::default(),
            catalog: CatalogConfig::default(),
            selection: SelectionConfig::default(),
            llm: LlmConfig::default(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Remote catalog settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CatalogConfig {
    /// Base URL of the catalog service
    #[serde(default = "default_catalog_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_catalog_timeout")]
    pub timeout_secs: u64,

    /// Maximum results requested per search query
    #[serde(default = "default_per_query_limit")]
    pub per_query_limit: usize,

    /// Privacy of created playlists (PRIVATE, UNLISTED, PUBLIC)
    #[serde(default = "default_privacy_status")]
    pub privacy_status: String,

    /// Interface language sent with every request
    #[serde(default = "default_language")]
    pub language: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: default_catalog_base_url(),
            timeout_secs: default_catalog_timeout(),
            per_query_limit: default_per_query_limit(),
            privacy_status: default_privacy_status(),
            language: default_language(),
        }
    }
}

/// Track selection limits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct SelectionConfig {
    #[serde(default = "default_max_tracks")]
    pub max_tracks: usize,

    #[serde(default = "default_max_per_artist")]
    pub max_per_artist: usize,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            max_tracks: default_max_tracks(),
            max_per_artist: default_max_per_artist(),
        }
    }
}

/// OpenAI-compatible text generation settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LlmConfig {
    #[serde(default = "default_llm_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_llm_model")]
    pub model: String,

    /// API key; the environment overrides this value
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_llm_temperature")]
    pub temperature: f32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: default_llm_endpoint(),
            model: default_llm_model(),
            api_key: None,
            timeout_secs: default_llm_timeout(),
            temperature: default_llm_temperature(),
        }
    }
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_auth_dir() -> PathBuf {
    PathBuf::from("api")
}

fn default_allowed_origins() -> Vec<String> {
    vec![
        "http://localhost:3000".to_string(),
        "http://127.0.0.1:3000".to_string(),
    ]
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_catalog_base_url() -> String {
    "https://music.youtube.com".to_string()
}

fn default_catalog_timeout() -> u64 {
    30
}

fn default_per_query_limit() -> usize {
    20
}

fn default_privacy_status() -> String {
    "PRIVATE".to_string()
}

fn default_language() -> String {
    "en".to_string()
}

fn default_max_tracks() -> usize {
    15
}

fn default_max_per_artist() -> usize {
    3
}

fn default_llm_endpoint() -> String {
    "https://api.openai.com/v1/chat/completions".to_string()
}

fn default_llm_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_llm_timeout() -> u64 {
    20
}

fn default_llm_temperature() -> f32 {
    0.7
}

/// Locate the config file
///
/// Returns the first candidate in priority order: explicit argument, then
/// [`CONFIG_ENV_VAR`], then `<config_dir>/moodtune/moodtune-api.toml`.
/// The returned path may not exist.
pub fn resolve_config_path(cli_arg: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    dirs::config_dir().map(|d| d.join("moodtune").join(CONFIG_FILE_NAME))
}

/// Parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
}

impl TomlConfig {
    /// Load the config file if present, falling back to defaults
    ///
    /// A missing file yields defaults with a warning. A file that exists but
    /// does not parse is an error: silently ignoring a typo in a secret or
    /// port would be worse than refusing to start.
    pub fn load_or_default(cli_arg: Option<&Path>) -> Result<Self> {
        let Some(path) = resolve_config_path(cli_arg) else {
            warn!("Could not determine config directory, using defaults");
            return Ok(Self::default());
        };

        if !path.exists() {
            warn!("Config file {} not found, using defaults", path.display());
            return Ok(Self::default());
        }

        let config = load_toml_config(&path)?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }
}

/// Write a file atomically (temp file + rename)
///
/// The temp file lives next to the target so the rename never crosses a
/// filesystem. On Unix the temp file is created with 0600 permissions, so
/// the contents are never readable by others. A failed write removes it.
pub fn write_atomically(path: &Path, contents: &str) -> Result<()> {
    let file_name = path
        .file_name()
        .ok_or_else(|| Error::Config(format!("Invalid target path: {}", path.display())))?;
    let mut tmp_name = file_name.to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    let result = write_private(&tmp_path, contents).and_then(|()| std::fs::rename(&tmp_path, path));
    if result.is_err() {
        let _ = std::fs::remove_file(&tmp_path);
    }
    result.map_err(Error::from)
}

/// Create (or truncate) `path` readable by the owner only, then write it
fn write_private(path: &Path, contents: &str) -> std::io::Result<()> {
    use std::io::Write;

    let mut options = std::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path)?;
    #[cfg(unix)]
    {
        // A leftover temp file keeps its old mode through `open`
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
    }
    file.write_all(contents.as_bytes())?;
    file.sync_all()
}
