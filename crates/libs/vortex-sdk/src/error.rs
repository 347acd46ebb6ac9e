use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Canonical remote status codes, numbered as on the wire.
#[derive(
    Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", try_from = "StatusCodeRepr")]
pub enum StatusCode {
    Ok,
    Cancelled,
    #[default]
    Unknown,
    InvalidArgument,
    DeadlineExceeded,
    NotFound,
    AlreadyExists,
    PermissionDenied,
    ResourceExhausted,
    FailedPrecondition,
    Aborted,
    OutOfRange,
    Unimplemented,
    Internal,
    Unavailable,
    DataLoss,
    Unauthenticated,
}

impl StatusCode {
    pub const ALL: [StatusCode; 17] = [
        StatusCode::Ok,
        StatusCode::Cancelled,
        StatusCode::Unknown,
        StatusCode::InvalidArgument,
        StatusCode::DeadlineExceeded,
        StatusCode::NotFound,
        StatusCode::AlreadyExists,
        StatusCode::PermissionDenied,
        StatusCode::ResourceExhausted,
        StatusCode::FailedPrecondition,
        StatusCode::Aborted,
        StatusCode::OutOfRange,
        StatusCode::Unimplemented,
        StatusCode::Internal,
        StatusCode::Unavailable,
        StatusCode::DataLoss,
        StatusCode::Unauthenticated,
    ];

    /// Maps a raw wire code onto the finite set. Codes outside it yield `None`.
    pub fn from_code(code: i32) -> Option<Self> {
        usize::try_from(code).ok().and_then(|index| Self::ALL.get(index).copied())
    }

    pub fn code(self) -> i32 {
        self as i32
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::Cancelled => "CANCELLED",
            StatusCode::Unknown => "UNKNOWN",
            StatusCode::InvalidArgument => "INVALID_ARGUMENT",
            StatusCode::DeadlineExceeded => "DEADLINE_EXCEEDED",
            StatusCode::NotFound => "NOT_FOUND",
            StatusCode::AlreadyExists => "ALREADY_EXISTS",
            StatusCode::PermissionDenied => "PERMISSION_DENIED",
            StatusCode::ResourceExhausted => "RESOURCE_EXHAUSTED",
            StatusCode::FailedPrecondition => "FAILED_PRECONDITION",
            StatusCode::Aborted => "ABORTED",
            StatusCode::OutOfRange => "OUT_OF_RANGE",
            StatusCode::Unimplemented => "UNIMPLEMENTED",
            StatusCode::Internal => "INTERNAL",
            StatusCode::Unavailable => "UNAVAILABLE",
            StatusCode::DataLoss => "DATA_LOSS",
            StatusCode::Unauthenticated => "UNAUTHENTICATED",
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatusCode {
    type Err = ApiError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        if let Ok(code) = trimmed.parse::<i32>() {
            return Self::from_code(code)
                .ok_or_else(|| ApiError::config(format!("unknown status code '{trimmed}'")));
        }
        Self::ALL
            .iter()
            .copied()
            .find(|status| status.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ApiError::config(format!("unknown status code '{trimmed}'")))
    }
}

/// Accepted spellings of a status code in configuration: a name in any case
/// or its wire number.
#[derive(Deserialize)]
#[serde(untagged)]
enum StatusCodeRepr {
    Code(i64),
    Name(String),
}

impl TryFrom<StatusCodeRepr> for StatusCode {
    type Error = ApiError;

    fn try_from(repr: StatusCodeRepr) -> Result<Self, Self::Error> {
        match repr {
            StatusCodeRepr::Code(code) => i32::try_from(code)
                .ok()
                .and_then(Self::from_code)
                .ok_or_else(|| ApiError::config(format!("unknown status code '{code}'"))),
            StatusCodeRepr::Name(name) => name.parse(),
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
#[non_exhaustive]
pub enum ErrorCategory {
    Config,
    Validation,
    Transport,
    Timeout,
    Connection,
    Rejection,
    Decode,
    Internal,
}

impl ErrorCategory {
    pub(crate) fn for_status(status: StatusCode) -> Self {
        match status {
            StatusCode::DeadlineExceeded => ErrorCategory::Timeout,
            _ => ErrorCategory::Transport,
        }
    }
}

/// Diagnostic source attached to an [`ApiError`].
pub type ErrorCause = Arc<dyn std::error::Error + Send + Sync + 'static>;

/// The single error shape every SDK operation surfaces.
///
/// Built once where a failure is classified and read-only afterwards: the
/// `with_*` builders consume the value, and only getters are exposed.
#[derive(Clone, Debug, Error)]
#[error("{message} (status {status_code})")]
#[non_exhaustive]
pub struct ApiError {
    message: String,
    status_code: StatusCode,
    category: ErrorCategory,
    details: Option<String>,
    is_client_timeout: bool,
    attempts: Option<u32>,
    #[source]
    cause: Option<ErrorCause>,
}

impl ApiError {
    pub fn new(status_code: StatusCode, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status_code,
            category: ErrorCategory::for_status(status_code),
            details: None,
            is_client_timeout: false,
            attempts: None,
            cause: None,
        }
    }

    pub fn with_category(mut self, category: ErrorCategory) -> Self {
        self.category = category;
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_cause(mut self, cause: ErrorCause) -> Self {
        self.cause = Some(cause);
        self
    }

    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    pub fn status_code(&self) -> StatusCode {
        self.status_code
    }

    pub fn category(&self) -> ErrorCategory {
        self.category
    }

    pub fn details(&self) -> Option<&str> {
        self.details.as_deref()
    }

    pub fn is_client_timeout(&self) -> bool {
        self.is_client_timeout
    }

    /// Physical attempts made before the operation gave up, when it ran at all.
    pub fn attempts(&self) -> Option<u32> {
        self.attempts
    }

    pub fn cause(&self) -> Option<&ErrorCause> {
        self.cause.as_ref()
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(StatusCode::InvalidArgument, message).with_category(ErrorCategory::Config)
    }

    pub fn invalid_argument(field: &'static str, message: impl Into<String>) -> Self {
        Self::new(StatusCode::InvalidArgument, message)
            .with_category(ErrorCategory::Validation)
            .with_details(format!("field '{field}'"))
    }

    pub fn not_connected() -> Self {
        Self::new(StatusCode::Unavailable, "client is not connected")
            .with_category(ErrorCategory::Connection)
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self::new(StatusCode::Unknown, message).with_category(ErrorCategory::Rejection)
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(StatusCode::Internal, message).with_category(ErrorCategory::Decode)
    }

    /// The only constructor that marks an error as a client-side timeout.
    pub(crate) fn client_timeout(limit: Duration) -> Self {
        Self {
            is_client_timeout: true,
            ..Self::new(StatusCode::Cancelled, "Deadline exceeded on client side")
                .with_category(ErrorCategory::Timeout)
                .with_details(format!(
                    "Request timed out client-side after {}ms",
                    limit.as_millis()
                ))
        }
    }

    /// Wraps the last failure of a logical operation, keeping its classification.
    pub(crate) fn after_attempts(operation: &str, attempts: u32, last: ApiError) -> Self {
        let noun = if attempts == 1 { "attempt" } else { "attempts" };
        Self {
            message: format!("Failed to {operation} after {attempts} {noun}: {}", last.message),
            status_code: last.status_code,
            category: last.category,
            details: last.details.clone(),
            is_client_timeout: last.is_client_timeout,
            attempts: Some(attempts),
            cause: Some(Arc::new(last)),
        }
    }
}

impl PartialEq for ApiError {
    fn eq(&self, other: &Self) -> bool {
        self.message == other.message
            && self.status_code == other.status_code
            && self.category == other.category
            && self.details == other.details
            && self.is_client_timeout == other.is_client_timeout
            && self.attempts == other.attempts
    }
}
