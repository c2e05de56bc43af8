//! Blog text generation.
//!
//! A [`TextGenerator`] turns a topic into a short post. The production implementation is
//! [`bedrock::BedrockGenerator`], which sends a Mistral-style completion request to Bedrock; the
//! request and response shapes live here so they can be exercised without the SDK.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod bedrock;

/// Placeholder replaced with the requested topic when rendering a prompt template.
pub const TOPIC_PLACEHOLDER: &str = "{topic}";

/// Sampling parameters sent alongside every prompt.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct SamplingParameters {
    /// Maximum number of tokens to generate
    pub max_tokens: u32,
    pub temperature: f64,
    /// Nucleus sampling threshold
    pub top_p: f64,
    pub top_k: u32,
}

impl Default for SamplingParameters {
    fn default() -> Self {
        Self {
            max_tokens: 200,
            temperature: 0.5,
            top_p: 0.9,
            top_k: 50,
        }
    }
}

/// Substitute `topic` into every placeholder of `template`.
pub fn render_prompt(template: &str, topic: &str) -> String {
    template.replace(TOPIC_PLACEHOLDER, topic)
}

/// Body of a Mistral text completion request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRequest {
    pub prompt: String,
    #[serde(flatten)]
    pub sampling: SamplingParameters,
}

impl CompletionRequest {
    pub fn for_topic(template: &str, topic: &str, sampling: SamplingParameters) -> Self {
        Self {
            prompt: render_prompt(template, topic),
            sampling,
        }
    }
}

/// Body of a Mistral text completion response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompletionResponse {
    #[serde(default)]
    pub outputs: Vec<CompletionOutput>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompletionOutput {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub stop_reason: Option<String>,
}

impl CompletionResponse {
    /// The first output, or an empty one when the model returned none.
    pub fn into_first_output(self) -> CompletionOutput {
        self.outputs.into_iter().next().unwrap_or_default()
    }
}

/// Errors raised while producing a post
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("model invocation failed: {0}")]
    Invoke(String),

    #[error("failed to encode completion request: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("failed to decode completion response: {0}")]
    Decode(#[source] serde_json::Error),
}

/// Something that can write a post about a topic.
///
/// An empty string is a valid return value; callers decide whether it counts as a failure.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, topic: &str) -> Result<String, GenerationError>;
}
