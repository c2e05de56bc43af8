//! # bloggen: serverless blog generator
//!
//! `bloggen` is a single-purpose function: given a topic, it asks a model hosted on AWS Bedrock
//! to write a short blog post about it, stores the post in an S3 bucket, and answers with the
//! post and its location.
//!
//! ## Request Flow
//!
//! An invocation carries an API Gateway style event whose `body` holds `{"blog_topic": "..."}`,
//! either as a JSON string or as structured data ([`event`]). The [`handler`] decodes the topic
//! (answering 400 when it is missing), renders the prompt and invokes the model through a
//! [`generation::TextGenerator`] (answering 500 when nothing comes back), then writes the text to
//! `blog-output/<YYYYMMDD_HHMMSS>.txt` through a [`storage::BlogStore`] and answers 200.
//!
//! A failed write does not fail the invocation unless `storage.require_persistence` is set; the
//! response's `persisted` flag tells the caller whether the post was stored.
//!
//! ## Transports
//!
//! In production the handler runs under the Lambda runtime ([`lambda`]). For development the same
//! handler can be served over plain HTTP with `--local` ([`server`]):
//!
//! ```bash
//! bloggen --local &
//! curl -X POST localhost:3000/blogs -d '{"blog_topic": "tide pools"}'
//! ```
//!
//! ## Quick Start
//!
//! ```no_run
//! use clap::Parser;
//! use bloggen::{Application, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = bloggen::config::Args::parse();
//!     let config = Config::load(&args)?;
//!
//!     bloggen::telemetry::init_telemetry(config.log_format, config.enable_otel_export)?;
//!
//!     Application::new(config).await.run_lambda().await
//! }
//! ```
//!
//! ## Configuration
//!
//! See the [`config`] module for configuration options.

pub mod config;
pub mod errors;
pub mod event;
pub mod generation;
pub mod handler;
pub mod lambda;
pub mod server;
pub mod storage;
pub mod telemetry;
#[cfg(test)]
mod test_utils;

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{debug, info};

pub use config::Config;
pub use handler::BlogService;

use generation::bedrock::BedrockGenerator;
use storage::s3::S3BlogStore;

/// The function with its AWS clients initialised.
///
/// Clients are built once per execution environment and shared by every invocation.
pub struct Application {
    config: Config,
    service: BlogService,
}

impl Application {
    /// Build the Bedrock and S3 clients from the ambient AWS environment
    pub async fn new(config: Config) -> Self {
        debug!("Starting blog generator with configuration: {:#?}", config);

        let generator = BedrockGenerator::from_config(&config.model).await;
        let store = S3BlogStore::from_config(&config.storage).await;
        let service = BlogService::builder()
            .generator(Arc::new(generator))
            .store(Arc::new(store))
            .key_prefix(config.storage.key_prefix.clone())
            .require_persistence(config.storage.require_persistence)
            .build();

        Self { config, service }
    }

    pub fn service(&self) -> &BlogService {
        &self.service
    }

    /// Serve invocations from the Lambda runtime API
    pub async fn run_lambda(self) -> anyhow::Result<()> {
        info!(
            model_id = %self.config.model.model_id,
            bucket = %self.config.storage.bucket,
            "Blog generator ready for Lambda invocations"
        );
        let result = lambda::run(self.service).await;

        telemetry::shutdown_telemetry();
        result.map_err(|e| anyhow::anyhow!(e))
    }

    /// Serve invocations over local HTTP until `shutdown` resolves
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!(
            "Blog generator listening on http://{}, available at http://localhost:{}/blogs",
            bind_addr, self.config.port
        );

        let router = server::build_router(self.service);
        axum::serve(listener, router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("Shutting down telemetry...");
        telemetry::shutdown_telemetry();

        Ok(())
    }
}
