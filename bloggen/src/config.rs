//! Application configuration management.
//!
//! Configuration is loaded from a YAML file with environment variable overrides. The configuration
//! file path defaults to `config.yaml` but can be specified via `-f` flag or `BLOGGEN_CONFIG`
//! environment variable. A missing file is not an error: every field defaults to the values the
//! function has always been deployed with.
//!
//! ## Loading Priority
//!
//! 1. **YAML config file** - Base configuration (default: `config.yaml`)
//! 2. **Environment variables** - Variables prefixed with `BLOGGEN_` override YAML values
//!
//! For nested config values, use double underscores in environment variables. For example,
//! `BLOGGEN_STORAGE__BUCKET=my-bucket` sets the `storage.bucket` field.
//!
//! ## Usage
//!
//! ```no_run
//! use clap::Parser;
//! use bloggen::config::{Args, Config};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let args = Args::parse();
//! let config = Config::load(&args)?;
//!
//! println!("Blogs will be written to s3://{}/{}", config.storage.bucket, config.storage.key_prefix);
//! # Ok(())
//! # }
//! ```
//!
//! ## Environment Variable Examples
//!
//! ```bash
//! # Use a different model
//! BLOGGEN_MODEL__MODEL_ID=mistral.mistral-small-2402-v1:0
//!
//! # Sample with less randomness
//! BLOGGEN_MODEL__SAMPLING__TEMPERATURE=0.2
//!
//! # Write to a local MinIO instead of S3
//! BLOGGEN_STORAGE__ENDPOINT_URL=http://localhost:9000
//! BLOGGEN_STORAGE__FORCE_PATH_STYLE=true
//! ```

use clap::Parser;
use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use crate::errors::Error;
use crate::generation::{SamplingParameters, TOPIC_PLACEHOLDER};

/// Simple CLI args - just for specifying config file and transport
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file
    #[arg(short = 'f', long, env = "BLOGGEN_CONFIG", default_value = "config.yaml")]
    pub config: String,

    /// Validate configuration and exit without starting the function.
    #[arg(long)]
    pub validate: bool,

    /// Serve the handler over plain HTTP on `host:port` instead of polling the Lambda runtime API.
    #[arg(long)]
    pub local: bool,
}

/// Main application configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Host to bind to in local mode
    pub host: String,
    /// Port to bind to in local mode
    pub port: u16,
    /// Model invocation settings
    pub model: ModelConfig,
    /// Where generated posts are written
    pub storage: StorageConfig,
    /// Log line format
    pub log_format: LogFormat,
    /// Enable OpenTelemetry OTLP export for distributed tracing
    pub enable_otel_export: bool,
}

/// Output format of the fmt layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One JSON object per line, for CloudWatch
    #[default]
    Json,
    /// Human readable, for local development
    Pretty,
}

/// Bedrock model invocation settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModelConfig {
    /// Bedrock model identifier
    pub model_id: String,
    /// Region hosting the model
    pub region: String,
    /// Prompt sent to the model; `{topic}` is replaced with the requested topic
    pub prompt_template: String,
    /// Sampling parameters sent with every prompt
    pub sampling: SamplingParameters,
    /// Read timeout for a single attempt
    #[serde(with = "humantime_serde")]
    pub read_timeout: Duration,
    /// Retries made by the SDK transport after the first call fails
    pub max_retries: u32,
    /// Override the Bedrock runtime endpoint
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint_url: Option<Url>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_id: "mistral.mistral-large-2402-v1:0".to_string(),
            region: "us-east-1".to_string(),
            prompt_template: format!("<s>[INST] Write a 100 words blog on the topic {TOPIC_PLACEHOLDER} [/INST]"),
            sampling: SamplingParameters::default(),
            read_timeout: Duration::from_secs(300),
            max_retries: 3,
            endpoint_url: None,
        }
    }
}

/// Object storage settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageConfig {
    /// Bucket receiving generated posts
    pub bucket: String,
    /// Key prefix, without leading or trailing slash
    pub key_prefix: String,
    /// Bucket region; falls back to the SDK's default provider chain
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    /// Override the S3 endpoint (MinIO, LocalStack)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint_url: Option<Url>,
    /// Use `endpoint/bucket/key` addressing instead of virtual hosts
    pub force_path_style: bool,
    /// Report a failed write as a server error.
    ///
    /// When false, a post that was generated but could not be stored is still returned with a 200
    /// and `persisted: false` in the body.
    pub require_persistence: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            bucket: "awsbedrockcourse04".to_string(),
            key_prefix: "blog-output".to_string(),
            region: None,
            endpoint_url: None,
            force_path_style: false,
            require_persistence: false,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            model: ModelConfig::default(),
            storage: StorageConfig::default(),
            log_format: LogFormat::default(),
            enable_otel_export: false,
        }
    }
}

impl Config {
    #[allow(clippy::result_large_err)]
    pub fn load(args: &Args) -> Result<Self, figment::Error> {
        let config: Self = Self::figment(args).extract()?;
        config.validate().map_err(|e| figment::Error::from(e.to_string()))?;
        Ok(config)
    }

    /// Validate the configuration for consistency and required fields
    pub fn validate(&self) -> Result<(), Error> {
        let invalid = |message: String| Err(Error::InvalidConfig { message });

        if self.model.model_id.trim().is_empty() {
            return invalid("model.model_id cannot be empty".to_string());
        }
        if self.model.region.trim().is_empty() {
            return invalid("model.region cannot be empty".to_string());
        }
        if !self.model.prompt_template.contains(TOPIC_PLACEHOLDER) {
            return invalid(format!("model.prompt_template must contain the {TOPIC_PLACEHOLDER} placeholder"));
        }
        if self.model.read_timeout.is_zero() {
            return invalid("model.read_timeout must be positive".to_string());
        }

        let sampling = &self.model.sampling;
        if sampling.max_tokens == 0 {
            return invalid("model.sampling.max_tokens must be positive".to_string());
        }
        if !(0.0..=1.0).contains(&sampling.temperature) {
            return invalid(format!(
                "model.sampling.temperature ({}) must be between 0 and 1",
                sampling.temperature
            ));
        }
        if !(sampling.top_p > 0.0 && sampling.top_p <= 1.0) {
            return invalid(format!("model.sampling.top_p ({}) must be in (0, 1]", sampling.top_p));
        }
        if sampling.top_k == 0 {
            return invalid("model.sampling.top_k must be positive".to_string());
        }

        if self.storage.bucket.trim().is_empty() {
            return invalid("storage.bucket cannot be empty".to_string());
        }
        let prefix = &self.storage.key_prefix;
        if prefix.is_empty() || prefix.starts_with('/') || prefix.ends_with('/') {
            return invalid(format!(
                "storage.key_prefix ({prefix:?}) must be non-empty and have no leading or trailing slash"
            ));
        }

        Ok(())
    }

    pub fn figment(args: &Args) -> Figment {
        Figment::new()
            .merge(Yaml::file(&args.config))
            // BLOGGEN_CONFIG names the file, it is not a config key
            .merge(Env::prefixed("BLOGGEN_").ignore(&["config"]).split("__"))
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
