//! Local HTTP transport for development.
//!
//! `POST /blogs` takes the request object (`{"blog_topic": "..."}`) as its body and answers with
//! the same status code and JSON body a Lambda invocation would produce.

use axum::{
    Router,
    body::Bytes,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::event::{HandlerResponse, InvocationEvent};
use crate::handler::BlogService;

pub fn build_router(service: BlogService) -> Router {
    Router::new()
        .route("/blogs", post(create_blog))
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}

#[tracing::instrument(skip_all)]
async fn create_blog(State(service): State<BlogService>, body: Bytes) -> HandlerResponse {
    // An empty POST is a request without a body, not a malformed one
    let event = if body.is_empty() {
        InvocationEvent::default()
    } else {
        InvocationEvent::encoded(String::from_utf8_lossy(&body))
    };
    service.handle(event).await
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

impl IntoResponse for HandlerResponse {
    fn into_response(self) -> Response {
        (self.status(), [(header::CONTENT_TYPE, "application/json")], self.body).into_response()
    }
}
