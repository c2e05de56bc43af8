use axum::http::StatusCode;
use thiserror::Error as ThisError;

use crate::event::HandlerResponse;
use crate::generation::GenerationError;
use crate::storage::StorageError;

#[derive(ThisError, Debug)]
pub enum Error {
    /// Invalid request data, e.g. a missing topic
    #[error("{message}")]
    BadRequest { message: String },

    /// The request body could not be decoded
    #[error("Invalid request body: {message}")]
    InvalidBody { message: String },

    /// The model failed or returned nothing
    #[error("Failed to generate blog content")]
    Generation { source: Option<GenerationError> },

    /// The generated post could not be stored
    #[error("Failed to store blog content")]
    Storage(#[from] StorageError),

    /// Configuration rejected at start-up
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Error::InvalidBody { .. }
            | Error::Generation { .. }
            | Error::Storage(_)
            | Error::InvalidConfig { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns a user-safe error message, without leaking internal implementation details
    pub fn user_message(&self) -> String {
        match self {
            Error::BadRequest { message } => message.clone(),
            Error::InvalidBody { message } => format!("An error occurred: {message}"),
            Error::Generation { .. } => "Failed to generate blog content".to_string(),
            Error::Storage(_) => "Failed to store blog content".to_string(),
            Error::InvalidConfig { .. } => "An error occurred: Internal server error".to_string(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::InvalidBody { message: err.to_string() }
    }
}

impl From<Error> for HandlerResponse {
    fn from(err: Error) -> Self {
        // Log full error details for debugging - different log levels based on severity
        match &err {
            Error::Generation { source: Some(source) } => {
                tracing::error!("Error generating the blog: {:#}", source);
            }
            Error::Generation { source: None } => {
                tracing::warn!("Model returned an empty completion");
            }
            Error::Storage(_) | Error::InvalidConfig { .. } => {
                tracing::error!("Internal service error: {:#}", err);
            }
            Error::InvalidBody { .. } => {
                tracing::warn!("Undecodable request: {}", err);
            }
            Error::BadRequest { .. } => {
                tracing::debug!("Client error: {}", err);
            }
        }

        HandlerResponse::message(err.status_code(), &err.user_message())
    }
}

/// Type alias for service operation results
pub type Result<T> = std::result::Result<T, Error>;
