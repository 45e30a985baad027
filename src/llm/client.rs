use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::models::ValidationError;

const API_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";

/// Primary and fallback model identifiers, tried in order
const DEFAULT_MODELS: &[&str] = &["claude-sonnet-4-20250514", "claude-3-5-haiku-20241022"];

/// Errors from the text-generation capability
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("request to the model provider failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("model provider returned {status}: {message}")]
    Provider { status: u16, message: String },
    #[error("model returned no text")]
    EmptyResponse,
    #[error("generation timed out after {0:?}")]
    TimedOut(Duration),
    #[error("no candidate models configured")]
    NoModels,
}

/// Text-generation capability consumed by the stage runner
///
/// Model selection and credential handling belong to the implementor; the
/// pipeline only supplies prompt text and an advisory description of the
/// desired output shape.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(
        &self,
        system: &str,
        user: &str,
        expected_output: &str,
    ) -> Result<String, GenerationError>;
}

/// Configuration for the Anthropic API client
#[derive(Debug, Clone)]
pub struct AnthropicConfig {
    /// API key (from ANTHROPIC_API_KEY env var or per-request override)
    pub api_key: String,
    /// Candidate model identifiers, tried in order until one succeeds
    pub models: Vec<String>,
    /// Temperature (0-1, lower = more deterministic)
    pub temperature: f64,
    /// Maximum tokens in response
    pub max_tokens: u32,
}

impl AnthropicConfig {
    /// Create config from environment variables
    pub fn from_env() -> Result<Self, ValidationError> {
        let api_key =
            std::env::var("ANTHROPIC_API_KEY").map_err(|_| ValidationError::MissingApiKey)?;
        Ok(Self::with_api_key(api_key))
    }

    /// Create config with the default model chain and a caller-supplied key
    pub fn with_api_key(api_key: String) -> Self {
        Self {
            api_key,
            models: DEFAULT_MODELS.iter().map(|m| m.to_string()).collect(),
            temperature: 0.7,
            max_tokens: 1024,
        }
    }
}

/// Anthropic API client
pub struct AnthropicClient {
    client: Client,
    config: AnthropicConfig,
}

impl AnthropicClient {
    pub fn new(config: AnthropicConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// Send one message to a specific model and return the generated text
    async fn send_message(
        &self,
        model: &str,
        system: &str,
        user: &str,
    ) -> Result<String, GenerationError> {
        let request = AnthropicRequest {
            model: model.to_string(),
            max_tokens: self.config.max_tokens,
            temperature: Some(self.config.temperature),
            system: Some(system.to_string()),
            messages: vec![Message {
                role: "user".to_string(),
                content: user.to_string(),
            }],
        };

        let response = self
            .client
            .post(API_URL)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", API_VERSION)
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(GenerationError::Provider { status, message });
        }

        let response: AnthropicResponse = response.json().await?;

        // Extract text from the first content block
        response
            .content
            .first()
            .and_then(|c| {
                if c.content_type == "text" && !c.text.is_empty() {
                    Some(c.text.clone())
                } else {
                    None
                }
            })
            .ok_or(GenerationError::EmptyResponse)
    }
}

#[async_trait]
impl TextGenerator for AnthropicClient {
    async fn generate(
        &self,
        system: &str,
        user: &str,
        expected_output: &str,
    ) -> Result<String, GenerationError> {
        let user = if expected_output.is_empty() {
            user.to_string()
        } else {
            format!("{user}\n\nExpected output: {expected_output}")
        };

        // Model fallback chain: a retry policy of this collaborator, not of
        // the pipeline itself
        let mut last_error = None;
        for model in &self.config.models {
            match self.send_message(model, system, &user).await {
                Ok(text) => return Ok(text),
                Err(err) => {
                    warn!("Model {} failed: {}", model, err);
                    last_error = Some(err);
                }
            }
        }

        Err(last_error.unwrap_or(GenerationError::NoModels))
    }
}

#[derive(Debug, Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<Message>,
}

#[derive(Debug, Serialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    content_type: String,
    #[serde(default)]
    text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default_model_chain() {
        let config = AnthropicConfig::with_api_key("sk-test".to_string());
        assert_eq!(config.models.len(), 2);
        assert_eq!(config.models[0], "claude-sonnet-4-20250514");
    }

    #[test]
    fn test_parse_response_text_block() {
        let json = r#"{"content":[{"type":"text","text":"APPROVED. Reads well."}]}"#;
        let response: AnthropicResponse = serde_json::from_str(json).unwrap();

        assert_eq!(response.content[0].content_type, "text");
        assert_eq!(response.content[0].text, "APPROVED. Reads well.");
    }
}
