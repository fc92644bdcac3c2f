//! Cerebras chat-completion client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};

use crate::clients::CompletionClient;
use crate::error::CompletionError;

pub const API_KEY_ENV: &str = "CEREBRAS_API_KEY";
pub const DEFAULT_MODEL: &str = "llama3.1-8b";
const API_URL: &str = "https://api.cerebras.ai/v1/chat/completions";

/// Hard request budget. On expiry the in-flight request is abandoned; the API is
/// not streamed, so there is no partial response to salvage.
const REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: String,
}

/// Configuration for the Cerebras client.
#[derive(Debug, Clone)]
pub struct CerebrasConfig {
    pub api_key: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for CerebrasConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: 4000,
            temperature: 0.7,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CerebrasClient {
    config: CerebrasConfig,
    client: Client,
}

impl CerebrasClient {
    /// Create a client, rejecting a missing or blank API key up front so the
    /// failure surfaces before any request is issued.
    pub fn new(config: CerebrasConfig) -> Result<Self, CompletionError> {
        if config.api_key.trim().is_empty() {
            return Err(CompletionError::MissingKey(API_KEY_ENV));
        }
        info!(model = %config.model, "Creating new Cerebras client");
        Ok(Self {
            config,
            client: Client::new(),
        })
    }
}

#[async_trait]
impl CompletionClient for CerebrasClient {
    #[instrument(skip(self, system, user), fields(user_len = user.len(), model = %self.config.model))]
    async fn complete(&self, system: String, user: String) -> Result<String, CompletionError> {
        let request = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system,
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user,
                },
            ],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        debug!("Sending request to Cerebras API");
        let response = self
            .client
            .post(API_URL)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("Content-Type", "application/json")
            .header("User-Agent", concat!("dquest/", env!("CARGO_PKG_VERSION")))
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    warn!(timeout_secs = REQUEST_TIMEOUT_SECS, "Cerebras request timed out");
                    CompletionError::Timeout(REQUEST_TIMEOUT_SECS)
                } else {
                    error!(error = %e, "HTTP request failed");
                    CompletionError::Http(e.to_string())
                }
            })?;

        debug!(status = %response.status(), "Received response from Cerebras API");

        match response.status().as_u16() {
            429 => {
                warn!("Cerebras API rate limit exceeded");
                return Err(CompletionError::RateLimit);
            }
            401 => {
                error!("Cerebras API authentication failed");
                return Err(CompletionError::Authentication);
            }
            403 => {
                error!("Cerebras API returned 403 Forbidden");
                return Err(CompletionError::Forbidden);
            }
            _ => {}
        }

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            error!(status, body = %body, "Cerebras API error");
            return Err(CompletionError::Upstream { status, body });
        }

        let chat: ChatResponse = response.json().await.map_err(|e| {
            error!(error = %e, "Failed to parse Cerebras response JSON");
            CompletionError::Http(e.to_string())
        })?;

        let result = chat
            .choices
            .first()
            .map(|choice| choice.message.content.clone())
            .ok_or(CompletionError::EmptyResponse);

        match &result {
            Ok(text) => info!(response_len = text.len(), "Successfully received Cerebras response"),
            Err(e) => error!(error = %e, "Failed to extract content from Cerebras response"),
        }

        result
    }

    fn clone_box(&self) -> Box<dyn CompletionClient> {
        Box::new(self.clone())
    }
}
