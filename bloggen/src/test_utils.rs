//! Shared fixtures for unit tests: in-memory fakes of the two external dependencies, and an AWS
//! SDK configuration that points at a local mock server.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region, SdkConfig, retry::RetryConfig};
use aws_credential_types::{Credentials, provider::SharedCredentialsProvider};
use chrono::NaiveDateTime;

use crate::generation::{GenerationError, TextGenerator};
use crate::handler::BlogService;
use crate::storage::{BlogStore, KEY_TIMESTAMP_FORMAT, StorageError};

/// A generator that returns a canned result and records the topics it was asked about.
pub struct FakeGenerator {
    result: Result<String, String>,
    topics: Mutex<Vec<String>>,
}

impl FakeGenerator {
    pub fn returning(text: &str) -> Arc<Self> {
        Arc::new(Self {
            result: Ok(text.to_string()),
            topics: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            result: Err(message.to_string()),
            topics: Mutex::new(Vec::new()),
        })
    }

    pub fn topics(&self) -> Vec<String> {
        self.topics.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for FakeGenerator {
    async fn generate(&self, topic: &str) -> Result<String, GenerationError> {
        self.topics.lock().unwrap().push(topic.to_string());
        self.result.clone().map_err(GenerationError::Invoke)
    }
}

/// A store that keeps objects in memory, or rejects every write.
pub struct InMemoryStore {
    bucket: String,
    fail: bool,
    objects: Mutex<Vec<(String, String)>>,
}

impl InMemoryStore {
    pub fn new(bucket: &str) -> Arc<Self> {
        Arc::new(Self {
            bucket: bucket.to_string(),
            fail: false,
            objects: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(bucket: &str) -> Arc<Self> {
        Arc::new(Self {
            bucket: bucket.to_string(),
            fail: true,
            objects: Mutex::new(Vec::new()),
        })
    }

    /// `(key, content)` pairs in write order
    pub fn objects(&self) -> Vec<(String, String)> {
        self.objects.lock().unwrap().clone()
    }
}

#[async_trait]
impl BlogStore for InMemoryStore {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn put(&self, key: &str, content: &str) -> Result<(), StorageError> {
        if self.fail {
            return Err(StorageError::Put {
                bucket: self.bucket.clone(),
                key: key.to_string(),
                message: "AccessDenied".to_string(),
            });
        }
        self.objects.lock().unwrap().push((key.to_string(), content.to_string()));
        Ok(())
    }
}

pub fn test_service(generator: Arc<FakeGenerator>, store: Arc<InMemoryStore>) -> BlogService {
    BlogService::builder().generator(generator).store(store).build()
}

/// Assert `key` is `<prefix>/<YYYYMMDD_HHMMSS>.txt`.
pub fn assert_blog_key(key: &str, prefix: &str) {
    let stamp = key
        .strip_prefix(prefix)
        .and_then(|rest| rest.strip_prefix('/'))
        .and_then(|rest| rest.strip_suffix(".txt"))
        .unwrap_or_else(|| panic!("key {key} does not match {prefix}/<timestamp>.txt"));
    assert_eq!(stamp.len(), "20240102_030405".len(), "unexpected timestamp in {key}");
    assert!(
        NaiveDateTime::parse_from_str(stamp, KEY_TIMESTAMP_FORMAT).is_ok(),
        "unexpected timestamp in {key}"
    );
}

/// SDK configuration with static credentials and no retries, sending every request to `endpoint`.
pub fn aws_test_config(endpoint: &str) -> SdkConfig {
    SdkConfig::builder()
        .behavior_version(BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .credentials_provider(SharedCredentialsProvider::new(Credentials::new(
            "test-access-key",
            "test-secret-key",
            None,
            None,
            "bloggen-tests",
        )))
        .retry_config(RetryConfig::disabled())
        .endpoint_url(endpoint)
        .build()
}
