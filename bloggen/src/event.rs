//! Wire types of an invocation.
//!
//! Events follow the API Gateway proxy shape: only `body` is read, and it may arrive either as a
//! JSON-encoded string or as already-structured data. Responses are `{"statusCode", "body"}`
//! objects whose `body` is itself JSON-encoded text.

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::Result;

/// Name of the request field carrying the topic.
pub const TOPIC_FIELD: &str = "blog_topic";

/// An inbound invocation. Fields other than `body` are ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct InvocationEvent {
    #[serde(default)]
    pub body: Option<EventBody>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum EventBody {
    /// JSON document serialised into a string, as API Gateway delivers it
    Encoded(String),
    /// Already-decoded JSON, as a direct invocation delivers it
    Structured(Value),
}

impl InvocationEvent {
    pub fn encoded(body: impl Into<String>) -> Self {
        Self {
            body: Some(EventBody::Encoded(body.into())),
        }
    }

    pub fn structured(body: Value) -> Self {
        Self {
            body: Some(EventBody::Structured(body)),
        }
    }

    /// Decode the body into a request.
    ///
    /// A missing body is an empty request. A body that is not valid JSON, or that decodes to
    /// anything but an object, is an error.
    pub fn blog_request(&self) -> Result<BlogRequest> {
        let decoded;
        let value = match &self.body {
            // Deliberate: a null body is answered with 400 (no topic), not 500 (undecodable).
            None => return Ok(BlogRequest::default()),
            Some(EventBody::Encoded(text)) => {
                decoded = serde_json::from_str::<Value>(text)?;
                &decoded
            }
            Some(EventBody::Structured(value)) => value,
        };

        match value {
            Value::Object(fields) => Ok(BlogRequest {
                blog_topic: fields.get(TOPIC_FIELD).and_then(Value::as_str).map(str::to_string),
            }),
            other => Err(crate::errors::Error::InvalidBody {
                message: format!("expected a JSON object, got {}", json_type_name(other)),
            }),
        }
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Decoded request body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct BlogRequest {
    pub blog_topic: Option<String>,
}

impl BlogRequest {
    /// The topic, trimmed, or `None` when it is absent or blank.
    pub fn topic(&self) -> Option<&str> {
        self.blog_topic.as_deref().map(str::trim).filter(|topic| !topic.is_empty())
    }
}

/// Body of a successful invocation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct BlogCreated {
    pub message: String,
    pub blog_content: String,
    pub s3_location: String,
    /// False when the post was generated but could not be written
    pub persisted: bool,
}

/// An outbound response in API Gateway proxy form.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HandlerResponse {
    pub status_code: u16,
    /// JSON-encoded payload
    pub body: String,
}

impl HandlerResponse {
    pub fn json<T: Serialize>(status: StatusCode, payload: &T) -> Self {
        match serde_json::to_string(payload) {
            Ok(body) => Self {
                status_code: status.as_u16(),
                body,
            },
            Err(e) => {
                tracing::error!("Failed to encode response body: {}", e);
                Self {
                    status_code: StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
                    body: "\"An error occurred: Internal server error\"".to_string(),
                }
            }
        }
    }

    /// A response whose body is a single JSON string.
    pub fn message(status: StatusCode, message: &str) -> Self {
        Self::json(status, &message)
    }

    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_api_gateway_event_with_encoded_body() {
        let event: InvocationEvent = serde_json::from_value(json!({
            "resource": "/blogs",
            "httpMethod": "POST",
            "headers": {"content-type": "application/json"},
            "body": "{\"blog_topic\": \"tide pools\"}",
            "isBase64Encoded": false
        }))
        .unwrap();

        assert_eq!(event, InvocationEvent::encoded("{\"blog_topic\": \"tide pools\"}"));
        assert_eq!(event.blog_request().unwrap().topic(), Some("tide pools"));
    }

    #[test]
    fn test_direct_event_with_structured_body() {
        let event: InvocationEvent = serde_json::from_value(json!({"body": {"blog_topic": "tide pools"}})).unwrap();

        assert_eq!(event.blog_request().unwrap().topic(), Some("tide pools"));
    }

    #[test]
    fn test_missing_or_null_body_is_empty_request() {
        let missing: InvocationEvent = serde_json::from_value(json!({})).unwrap();
        assert_eq!(missing.blog_request().unwrap(), BlogRequest::default());

        let null: InvocationEvent = serde_json::from_value(json!({"body": null})).unwrap();
        assert_eq!(null.blog_request().unwrap(), BlogRequest::default());
    }

    #[test]
    fn test_non_object_body_is_rejected() {
        for body in [json!(["tide pools"]), json!(42), json!(true)] {
            let result = InvocationEvent::structured(body.clone()).blog_request();
            assert!(result.is_err(), "body {body} should be rejected");
        }

        assert!(InvocationEvent::encoded("null").blog_request().is_err());
        assert!(InvocationEvent::encoded("{not json").blog_request().is_err());
    }

    #[test]
    fn test_topic_must_be_non_blank_string() {
        let blank = InvocationEvent::structured(json!({"blog_topic": "   "}));
        assert_eq!(blank.blog_request().unwrap().topic(), None);

        let number = InvocationEvent::structured(json!({"blog_topic": 7}));
        assert_eq!(number.blog_request().unwrap().topic(), None);

        let padded = InvocationEvent::structured(json!({"blog_topic": "  tide pools\n"}));
        assert_eq!(padded.blog_request().unwrap().topic(), Some("tide pools"));
    }

    #[test]
    fn test_response_uses_proxy_field_names() {
        let response = HandlerResponse::message(StatusCode::BAD_REQUEST, "blog_topic is required");

        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({"statusCode": 400, "body": "\"blog_topic is required\""})
        );
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
