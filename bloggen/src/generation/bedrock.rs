//! Text generation through the Bedrock runtime `InvokeModel` API.

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region, SdkConfig, retry::RetryConfig, timeout::TimeoutConfig};
use aws_sdk_bedrockruntime::{Client, error::DisplayErrorContext, primitives::Blob};
use tracing::{debug, instrument};

use super::{CompletionRequest, CompletionResponse, GenerationError, SamplingParameters, TextGenerator};
use crate::config::ModelConfig;

const JSON_CONTENT_TYPE: &str = "application/json";

/// Generates posts with a Bedrock-hosted Mistral model.
pub struct BedrockGenerator {
    client: Client,
    model_id: String,
    prompt_template: String,
    sampling: SamplingParameters,
}

impl BedrockGenerator {
    pub fn new(client: Client, config: &ModelConfig) -> Self {
        Self {
            client,
            model_id: config.model_id.clone(),
            prompt_template: config.prompt_template.clone(),
            sampling: config.sampling,
        }
    }

    /// Build a generator from the ambient AWS environment, pinned to the model's region.
    pub async fn from_config(config: &ModelConfig) -> Self {
        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .load()
            .await;
        Self::from_sdk_config(&sdk_config, config)
    }

    /// Build a generator on top of `sdk_config`, applying the model's read timeout, retry count
    /// and endpoint override.
    pub fn from_sdk_config(sdk_config: &SdkConfig, config: &ModelConfig) -> Self {
        let mut builder = aws_sdk_bedrockruntime::config::Builder::from(sdk_config)
            .timeout_config(timeout_config(config))
            .retry_config(retry_config(config));
        if let Some(endpoint) = &config.endpoint_url {
            builder = builder.endpoint_url(endpoint.as_str().trim_end_matches('/'));
        }
        Self::new(Client::from_conf(builder.build()), config)
    }
}

/// Transport timeouts for one model call.
fn timeout_config(config: &ModelConfig) -> TimeoutConfig {
    TimeoutConfig::builder().read_timeout(config.read_timeout).build()
}

/// `max_retries` counts calls after the first one; the SDK counts the first call as an attempt.
fn retry_config(config: &ModelConfig) -> RetryConfig {
    RetryConfig::standard().with_max_attempts(config.max_retries.saturating_add(1))
}

#[async_trait]
impl TextGenerator for BedrockGenerator {
    #[instrument(skip(self), fields(model_id = %self.model_id))]
    async fn generate(&self, topic: &str) -> Result<String, GenerationError> {
        let request = CompletionRequest::for_topic(&self.prompt_template, topic, self.sampling);
        let body = serde_json::to_vec(&request).map_err(GenerationError::Encode)?;

        let response = self
            .client
            .invoke_model()
            .model_id(&self.model_id)
            .content_type(JSON_CONTENT_TYPE)
            .accept(JSON_CONTENT_TYPE)
            .body(Blob::new(body))
            .send()
            .await
            .map_err(|e| GenerationError::Invoke(DisplayErrorContext(&e).to_string()))?;

        let completion: CompletionResponse = serde_json::from_slice(response.body().as_ref()).map_err(GenerationError::Decode)?;
        let output = completion.into_first_output();
        debug!(
            length = output.text.len(),
            stop_reason = output.stop_reason.as_deref().unwrap_or("none"),
            "Model returned completion"
        );

        Ok(output.text)
    }
}
