use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors reported synchronously at submission, before a run is created
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("topic is required")]
    EmptyTopic,
    #[error("brand guidelines are required")]
    EmptyGuidelines,
    #[error("an API key is required (set ANTHROPIC_API_KEY or pass api_key)")]
    MissingApiKey,
}

/// Validated input for one pipeline run
///
/// Both fields are stored trimmed and are guaranteed non-empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineRequest {
    pub topic: String,
    pub guidelines: String,
}

impl PipelineRequest {
    /// Build a request, trimming whitespace and rejecting empty fields
    pub fn new(topic: &str, guidelines: &str) -> Result<Self, ValidationError> {
        let topic = topic.trim();
        let guidelines = guidelines.trim();

        if topic.is_empty() {
            return Err(ValidationError::EmptyTopic);
        }
        if guidelines.is_empty() {
            return Err(ValidationError::EmptyGuidelines);
        }

        Ok(Self {
            topic: topic.to_string(),
            guidelines: guidelines.to_string(),
        })
    }
}
