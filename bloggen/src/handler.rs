//! The invocation handler: decode the topic, generate a post, store it, shape the response.

use std::sync::Arc;

use axum::http::StatusCode;
use bon::Builder;
use chrono::Utc;
use tracing::{error, info, instrument};

use crate::errors::{Error, Result};
use crate::event::{BlogCreated, HandlerResponse, InvocationEvent, TOPIC_FIELD};
use crate::generation::TextGenerator;
use crate::storage::{BlogStore, StorageLocation, object_key};

pub const CREATED_MESSAGE: &str = "Blog Generation is completed";

/// Everything an invocation needs. Cheap to clone; shared across invocations.
///
/// # Example
///
/// ```ignore
/// let service = BlogService::builder()
///     .generator(Arc::new(generator))
///     .store(Arc::new(store))
///     .key_prefix("blog-output".to_string())
///     .build();
/// ```
#[derive(Clone, Builder)]
pub struct BlogService {
    generator: Arc<dyn TextGenerator>,
    store: Arc<dyn BlogStore>,
    #[builder(default = String::from("blog-output"))]
    key_prefix: String,
    #[builder(default = false)]
    require_persistence: bool,
}

impl BlogService {
    /// Handle one invocation. Never fails: every error is turned into a response.
    #[instrument(skip_all)]
    pub async fn handle(&self, event: InvocationEvent) -> HandlerResponse {
        match self.create_blog(&event).await {
            Ok(created) => HandlerResponse::json(StatusCode::OK, &created),
            Err(err) => err.into(),
        }
    }

    async fn create_blog(&self, event: &InvocationEvent) -> Result<BlogCreated> {
        let request = event.blog_request()?;
        let topic = request.topic().ok_or_else(|| Error::BadRequest {
            message: format!("{TOPIC_FIELD} is required"),
        })?;
        info!(topic, "Generating blog");

        let content = match self.generator.generate(topic).await {
            Ok(text) if !text.is_empty() => text,
            Ok(_) => return Err(Error::Generation { source: None }),
            Err(e) => return Err(Error::Generation { source: Some(e) }),
        };

        let location = StorageLocation::new(self.store.bucket(), object_key(&self.key_prefix, Utc::now()));
        let persisted = match self.store.put(&location.key, &content).await {
            Ok(()) => {
                info!(%location, "Blog saved");
                true
            }
            Err(e) if self.require_persistence => return Err(e.into()),
            Err(e) => {
                error!("Error when saving the blog: {:#}", e);
                false
            }
        };

        Ok(BlogCreated {
            message: CREATED_MESSAGE.to_string(),
            blog_content: content,
            s3_location: location.to_string(),
            persisted,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{FakeGenerator, InMemoryStore, assert_blog_key, test_service};
    use serde_json::json;

    fn created(response: &HandlerResponse) -> BlogCreated {
        serde_json::from_str(&response.body).expect("body should be a BlogCreated")
    }

    #[test_log::test(tokio::test)]
    async fn test_missing_topic_is_bad_request() {
        let generator = FakeGenerator::returning("unused");
        let store = InMemoryStore::new("test-bucket");
        let service = test_service(generator.clone(), store.clone());

        let response = service.handle(InvocationEvent::structured(json!({"title": "tide pools"}))).await;

        assert_eq!(response.status_code, 400);
        assert_eq!(response.body, "\"blog_topic is required\"");
        assert!(generator.topics().is_empty());
        assert!(store.objects().is_empty());
    }

    #[test_log::test(tokio::test)]
    async fn test_missing_body_is_bad_request() {
        let service = test_service(FakeGenerator::returning("unused"), InMemoryStore::new("test-bucket"));

        let response = service.handle(InvocationEvent::default()).await;

        assert_eq!(response.status_code, 400);
    }

    #[test_log::test(tokio::test)]
    async fn test_blank_or_non_string_topic_is_bad_request() {
        let generator = FakeGenerator::returning("unused");
        let service = test_service(generator.clone(), InMemoryStore::new("test-bucket"));

        for body in [json!({"blog_topic": ""}), json!({"blog_topic": "  "}), json!({"blog_topic": 12})] {
            let response = service.handle(InvocationEvent::structured(body)).await;
            assert_eq!(response.status_code, 400);
        }
        assert!(generator.topics().is_empty());
    }

    #[test_log::test(tokio::test)]
    async fn test_successful_generation_is_stored() {
        let generator = FakeGenerator::returning("Tide pools are tiny oceans.");
        let store = InMemoryStore::new("test-bucket");
        let service = test_service(generator.clone(), store.clone());

        let response = service.handle(InvocationEvent::structured(json!({"blog_topic": "tide pools"}))).await;

        assert_eq!(response.status_code, 200);
        let body = created(&response);
        assert_eq!(body.message, "Blog Generation is completed");
        assert_eq!(body.blog_content, "Tide pools are tiny oceans.");
        assert!(body.persisted);

        assert_eq!(generator.topics(), vec!["tide pools".to_string()]);

        let objects = store.objects();
        assert_eq!(objects.len(), 1);
        let (key, content) = &objects[0];
        assert_blog_key(key, "blog-output");
        assert_eq!(content, "Tide pools are tiny oceans.");
        assert_eq!(body.s3_location, format!("s3://test-bucket/{key}"));
    }

    #[test_log::test(tokio::test)]
    async fn test_encoded_and_structured_bodies_are_equivalent() {
        let generator = FakeGenerator::returning("post");
        let service = test_service(generator.clone(), InMemoryStore::new("test-bucket"));

        let encoded = service.handle(InvocationEvent::encoded(r#"{"blog_topic": "tide pools"}"#)).await;
        let structured = service.handle(InvocationEvent::structured(json!({"blog_topic": "tide pools"}))).await;

        assert_eq!(encoded.status_code, 200);
        assert_eq!(structured.status_code, 200);
        assert_eq!(generator.topics(), vec!["tide pools".to_string(), "tide pools".to_string()]);
    }

    #[test_log::test(tokio::test)]
    async fn test_custom_key_prefix() {
        let store = InMemoryStore::new("test-bucket");
        let service = BlogService::builder()
            .generator(FakeGenerator::returning("post"))
            .store(store.clone())
            .key_prefix("drafts/blogs".to_string())
            .build();

        let response = service.handle(InvocationEvent::structured(json!({"blog_topic": "x"}))).await;

        assert_eq!(response.status_code, 200);
        assert_blog_key(&store.objects()[0].0, "drafts/blogs");
    }

    #[test_log::test(tokio::test)]
    async fn test_empty_generation_is_server_error_without_write() {
        let store = InMemoryStore::new("test-bucket");
        let service = test_service(FakeGenerator::returning(""), store.clone());

        let response = service.handle(InvocationEvent::structured(json!({"blog_topic": "tide pools"}))).await;

        assert_eq!(response.status_code, 500);
        assert_eq!(response.body, "\"Failed to generate blog content\"");
        assert!(store.objects().is_empty());
    }

    #[test_log::test(tokio::test)]
    async fn test_failed_generation_is_server_error_without_write() {
        let store = InMemoryStore::new("test-bucket");
        let service = test_service(FakeGenerator::failing("ThrottlingException"), store.clone());

        let response = service.handle(InvocationEvent::structured(json!({"blog_topic": "tide pools"}))).await;

        assert_eq!(response.status_code, 500);
        assert_eq!(response.body, "\"Failed to generate blog content\"");
        assert!(!response.body.contains("Throttling"));
        assert!(store.objects().is_empty());
    }

    #[test_log::test(tokio::test)]
    async fn test_storage_failure_still_succeeds_by_default() {
        let store = InMemoryStore::failing("test-bucket");
        let service = test_service(FakeGenerator::returning("post"), store.clone());

        let response = service.handle(InvocationEvent::structured(json!({"blog_topic": "tide pools"}))).await;

        assert_eq!(response.status_code, 200);
        let body = created(&response);
        assert_eq!(body.blog_content, "post");
        assert!(!body.persisted);
        assert!(body.s3_location.starts_with("s3://test-bucket/blog-output/"));
    }

    #[test_log::test(tokio::test)]
    async fn test_storage_failure_with_required_persistence() {
        let service = BlogService::builder()
            .generator(FakeGenerator::returning("post"))
            .store(InMemoryStore::failing("test-bucket"))
            .require_persistence(true)
            .build();

        let response = service.handle(InvocationEvent::structured(json!({"blog_topic": "tide pools"}))).await;

        assert_eq!(response.status_code, 500);
        assert_eq!(response.body, "\"Failed to store blog content\"");
    }

    #[test_log::test(tokio::test)]
    async fn test_undecodable_body_is_server_error() {
        let generator = FakeGenerator::returning("unused");
        let service = test_service(generator.clone(), InMemoryStore::new("test-bucket"));

        let response = service.handle(InvocationEvent::encoded("{\"blog_topic\": ")).await;

        assert_eq!(response.status_code, 500);
        let message: String = serde_json::from_str(&response.body).unwrap();
        assert!(message.starts_with("An error occurred: "), "unexpected message: {message}");
        assert!(generator.topics().is_empty());
    }
}
