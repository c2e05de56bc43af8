//! AWS Lambda transport.
//!
//! The payload is deserialised straight into an [`InvocationEvent`]; only a payload that is not an
//! event at all reaches the runtime's error path; everything else becomes a [`HandlerResponse`].

use lambda_runtime::{LambdaEvent, service_fn};
use tracing::instrument;

use crate::event::{HandlerResponse, InvocationEvent};
use crate::handler::BlogService;

/// Poll the Lambda runtime API until the execution environment is shut down.
pub async fn run(service: BlogService) -> Result<(), lambda_runtime::Error> {
    lambda_runtime::run(service_fn(move |event: LambdaEvent<InvocationEvent>| {
        let service = service.clone();
        async move { Ok::<_, lambda_runtime::Error>(handle(&service, event).await) }
    }))
    .await
}

#[instrument(skip_all, fields(request_id = %event.context.request_id))]
async fn handle(service: &BlogService, event: LambdaEvent<InvocationEvent>) -> HandlerResponse {
    let response = service.handle(event.payload).await;
    tracing::info!(status = response.status_code, "Invocation finished");
    response
}
