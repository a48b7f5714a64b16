//! Text generation client (OpenAI-compatible chat completions)
//!
//! Only the query composer uses this. The client is optional: without an API
//! key [`HttpTextGenerator::from_config`] returns `None` and queries come from
//! templates.

use async_trait::async_trait;
use moodtune_common::config::LlmConfig;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Environment variables checked for the API key, in priority order
pub const API_KEY_ENV_VARS: &[&str] = &["MOODTUNE_LLM_API_KEY", "OPENAI_API_KEY"];

/// Text generation errors
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("http error: {0}")]
    Http(String),
    #[error("response error: {0}")]
    Response(String),
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Text generation capability
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn complete(&self, system: &str, user: &str) -> Result<String, LlmError>;
}

/// HTTP text generator using an OpenAI-compatible API
pub struct HttpTextGenerator {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    temperature: f32,
    api_key: String,
}

impl HttpTextGenerator {
    pub fn new(config: &LlmConfig, api_key: String) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LlmError::Http(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
            api_key,
        })
    }

    /// Build a generator if an API key is available
    ///
    /// Environment keys override the TOML value.
    pub fn from_config(config: &LlmConfig) -> Option<Self> {
        let env_key = API_KEY_ENV_VARS
            .iter()
            .find_map(|name| std::env::var(name).ok())
            .filter(|k| !k.trim().is_empty());
        let api_key = env_key
            .or_else(|| config.api_key.clone())
            .filter(|k| !k.trim().is_empty());

        let Some(api_key) = api_key else {
            info!("No text generation API key configured, using query templates");
            return None;
        };

        match Self::new(config, api_key) {
            Ok(generator) => {
                info!(model = %config.model, "Text generation enabled");
                Some(generator)
            }
            Err(e) => {
                warn!("Text generation client unavailable: {}", e);
                None
            }
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Debug, Deserialize)]
struct ChatMessageResponse {
    #[serde(default)]
    content: Option<String>,
}

#[async_trait]
impl TextGenerator for HttpTextGenerator {
    async fn complete(&self, system: &str, user: &str) -> Result<String, LlmError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let bearer = HeaderValue::from_str(&format!("Bearer {}", self.api_key))
            .map_err(|e| LlmError::Http(e.to_string()))?;
        headers.insert(AUTHORIZATION, bearer);

        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            temperature: self.temperature,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .headers(headers)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Http(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(LlmError::Response(format!("HTTP {}: {}", status, text)));
        }

        let text = response
            .text()
            .await
            .map_err(|e| LlmError::Http(e.to_string()))?;
        let parsed: ChatResponse =
            serde_json::from_str(&text).map_err(|e| LlmError::Serialization(e.to_string()))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| LlmError::Response("Missing choices".to_string()))?;

        debug!(chars = content.len(), "Text generation complete");
        Ok(content)
    }
}
