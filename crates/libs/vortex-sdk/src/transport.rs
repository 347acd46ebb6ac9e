//! The boundary to the connection layer.
//!
//! The SDK never opens sockets itself. A transport implements
//! [`UnaryTransport`], receives a fully built [`WireRequest`], and reports the
//! outcome exactly once through the [`Completion`] it was handed. Everything
//! above this boundary (deadlines, client timeouts, retries, classification)
//! lives in the SDK core.

use crate::wire::{WireRequest, WireResponse};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;
use tokio::sync::oneshot;
use tokio::time::Instant;

pub const USER_AGENT_KEY: &str = "user-agent";
pub const AUTHORIZATION_KEY: &str = "authorization";

/// Error reported by a transport, carrying the raw status code it observed.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Error)]
#[error("transport status {code}: {message}")]
pub struct TransportError {
    pub code: i32,
    pub message: String,
    pub details: Option<String>,
}

impl TransportError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self { code, message: message.into(), details: None }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

pub type TransportResult = Result<WireResponse, TransportError>;

/// Key to string-list association sent alongside every call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Metadata {
    entries: BTreeMap<String, Vec<String>>,
}

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a value under `key`. Keys are case-insensitive and stored lowercase.
    pub fn append(&mut self, key: &str, value: impl Into<String>) {
        self.entries.entry(key.to_ascii_lowercase()).or_default().push(value.into());
    }

    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.entries.get(&key.to_ascii_lowercase()).map(Vec::as_slice)
    }

    pub fn get_first(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(|values| values.first()).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries.iter().map(|(key, values)| (key.as_str(), values.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CallOptions {
    /// Absolute bound the remote side should apply to this attempt.
    pub deadline: Option<Instant>,
}

/// Single-use completion for one invocation.
///
/// Completing after the SDK stopped waiting (client-side timeout, caller
/// dropped the operation) is harmless: the result is discarded and
/// [`Completion::complete`] returns `false`.
#[derive(Debug)]
pub struct Completion {
    sender: oneshot::Sender<TransportResult>,
}

impl Completion {
    pub(crate) fn channel() -> (Self, oneshot::Receiver<TransportResult>) {
        let (sender, receiver) = oneshot::channel();
        (Self { sender }, receiver)
    }

    pub fn complete(self, result: TransportResult) -> bool {
        self.sender.send(result).is_ok()
    }

    pub fn succeed(self, response: WireResponse) -> bool {
        self.complete(Ok(response))
    }

    pub fn fail(self, error: TransportError) -> bool {
        self.complete(Err(error))
    }

    /// True once nobody is waiting for this call any more.
    pub fn is_abandoned(&self) -> bool {
        self.sender.is_closed()
    }
}

/// Handle to one in-flight invocation.
pub trait CallHandle: Send {
    /// Best-effort cancellation. Must tolerate calls after the invocation finished.
    fn cancel(&self);
}

/// Handle for transports that cannot cancel anything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopCallHandle;

impl CallHandle for NoopCallHandle {
    fn cancel(&self) {}
}

/// Per-service unary invoke primitive.
pub trait UnaryTransport: Send + Sync {
    fn invoke(
        &self,
        request: WireRequest,
        metadata: Metadata,
        options: CallOptions,
        completion: Completion,
    ) -> Box<dyn CallHandle>;

    /// Releases channel resources. Called at most once, by `Client::close`.
    fn close(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::{ListCollectionsResponse, WireResponse};

    #[test]
    fn metadata_keys_are_case_insensitive_lists() {
        let mut metadata = Metadata::new();
        metadata.append("User-Agent", "vortex-sdk-rust/0.1.0");
        metadata.append("x-trace", "a");
        metadata.append("X-Trace", "b");
        assert_eq!(metadata.get_first("user-agent"), Some("vortex-sdk-rust/0.1.0"));
        assert_eq!(metadata.get("x-trace"), Some(&["a".to_owned(), "b".to_owned()][..]));
        assert_eq!(metadata.iter().count(), 2);
    }

    #[test]
    fn completing_after_receiver_dropped_is_ignored() {
        let (completion, receiver) = Completion::channel();
        drop(receiver);
        assert!(completion.is_abandoned());
        let response = WireResponse::ListCollections(ListCollectionsResponse::default());
        assert!(!completion.succeed(response));
    }

    #[tokio::test]
    async fn completion_delivers_exactly_one_result() {
        let (completion, receiver) = Completion::channel();
        assert!(completion.fail(TransportError::new(14, "unavailable")));
        let delivered = receiver.await.expect("sender completed");
        assert_eq!(delivered, Err(TransportError::new(14, "unavailable")));
    }
}
