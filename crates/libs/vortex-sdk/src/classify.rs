use crate::error::{ApiError, ErrorCategory, StatusCode};
use crate::transport::TransportError;
use std::sync::Arc;

/// Anything that can go wrong below the facade, before normalization.
#[derive(Debug)]
pub enum Failure {
    Api(ApiError),
    Transport(TransportError),
    Other(Box<dyn std::error::Error + Send + Sync + 'static>),
    Message(String),
}

impl From<ApiError> for Failure {
    fn from(error: ApiError) -> Self {
        Failure::Api(error)
    }
}

impl From<TransportError> for Failure {
    fn from(error: TransportError) -> Self {
        Failure::Transport(error)
    }
}

impl From<Box<dyn std::error::Error + Send + Sync + 'static>> for Failure {
    fn from(error: Box<dyn std::error::Error + Send + Sync + 'static>) -> Self {
        Failure::Other(error)
    }
}

impl From<String> for Failure {
    fn from(message: String) -> Self {
        Failure::Message(message)
    }
}

impl From<&str> for Failure {
    fn from(message: &str) -> Self {
        Failure::Message(message.to_owned())
    }
}

/// Normalizes any failure into an [`ApiError`].
///
/// Already-classified errors pass through untouched, so classifying twice
/// never loses a status code or the client-timeout flag.
pub fn classify(failure: impl Into<Failure>) -> ApiError {
    match failure.into() {
        Failure::Api(error) => error,
        Failure::Transport(error) => classify_transport(error),
        Failure::Other(error) => {
            let message = error.to_string();
            ApiError::new(StatusCode::Unknown, message)
                .with_category(ErrorCategory::Internal)
                .with_cause(Arc::from(error))
        }
        Failure::Message(message) => {
            ApiError::new(StatusCode::Unknown, message).with_category(ErrorCategory::Internal)
        }
    }
}

fn classify_transport(error: TransportError) -> ApiError {
    let status = StatusCode::from_code(error.code);
    let mut classified = ApiError::new(status.unwrap_or_default(), error.message.clone());
    match (error.details.as_deref(), status) {
        (Some(details), _) => classified = classified.with_details(details),
        (None, None) => {
            classified = classified.with_details(format!("unrecognized status code {}", error.code))
        }
        (None, Some(_)) => {}
    }
    classified.with_cause(Arc::new(error))
}

impl From<TransportError> for ApiError {
    fn from(error: TransportError) -> Self {
        classify(error)
    }
}
