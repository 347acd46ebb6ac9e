#![allow(clippy::result_large_err)]

mod attempt;
mod classify;
mod client;
pub mod convert;
pub mod domain;
mod error;
pub mod retry;
#[cfg(test)]
mod testing;
pub mod transport;
pub mod types;
pub mod value;
pub mod wire;

pub use attempt::CallTimeouts;
pub use classify::{classify, Failure};
pub use client::Client;
pub use domain::{
    CollectionDescription, CollectionInfo, CollectionStatus, DistanceMetric, Filter, HnswConfig,
    Payload, PointOperationStatus, PointStatus, PointStruct, PointsQuery, ScoredPoint,
    SearchParams, SearchQuery, Vector,
};
pub use error::{ApiError, ErrorCategory, ErrorCause, StatusCode};
pub use retry::{spawn_with_callback, RetryOrchestrator, RetryPolicy};
pub use transport::{
    CallHandle, CallOptions, Completion, Metadata, NoopCallHandle, TransportError,
    TransportResult, UnaryTransport,
};
pub use types::{ClientConfig, ClientOptions, CredentialMaterial};
pub use value::DynamicValue;

/// Sent as `user-agent` on every call.
pub const USER_AGENT: &str = concat!("vortex-sdk-rust/", env!("CARGO_PKG_VERSION"));
