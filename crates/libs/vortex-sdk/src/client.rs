use crate::attempt::run_attempt;
use crate::convert;
use crate::domain::{
    CollectionDescription, CollectionInfo, DistanceMetric, HnswConfig, PointOperationStatus,
    PointStruct, PointsQuery, ScoredPoint, SearchQuery,
};
use crate::error::ApiError;
use crate::retry::{spawn_with_callback, RetryOrchestrator};
use crate::transport::{Metadata, UnaryTransport, AUTHORIZATION_KEY, USER_AGENT_KEY};
use crate::types::{ClientConfig, ClientOptions};
use crate::wire::{WireRequest, WireResponse};
use crate::USER_AGENT;
use std::fmt;
use std::sync::{Arc, RwLock};
use tokio::task::JoinHandle;

mod collections;
mod points;

/// Handle to a Vortex deployment. Cloning is cheap and clones share the
/// same transport, so closing one closes all of them.
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    options: ClientOptions,
    orchestrator: RetryOrchestrator,
    metadata: Metadata,
    transport: RwLock<Option<Arc<dyn UnaryTransport>>>,
}

impl Client {
    pub fn new(options: ClientOptions, transport: Arc<dyn UnaryTransport>) -> Self {
        let mut metadata = Metadata::new();
        metadata.append(USER_AGENT_KEY, USER_AGENT);
        if let Some(api_key) = options.api_key() {
            metadata.append(AUTHORIZATION_KEY, format!("Bearer {api_key}"));
        }
        log::debug!(
            "client({}): created (secure={}, retries={})",
            options.endpoint(),
            options.secure(),
            options.retry_policy().enabled
        );
        Self {
            inner: Arc::new(ClientInner {
                orchestrator: RetryOrchestrator::new(options.retry_policy().clone()),
                options,
                metadata,
                transport: RwLock::new(Some(transport)),
            }),
        }
    }

    pub fn from_config(
        config: ClientConfig,
        transport: Arc<dyn UnaryTransport>,
    ) -> Result<Self, ApiError> {
        Ok(Self::new(config.build()?, transport))
    }

    pub fn options(&self) -> &ClientOptions {
        &self.inner.options
    }

    pub fn is_connected(&self) -> bool {
        match self.inner.transport.read() {
            Ok(slot) => slot.is_some(),
            Err(poisoned) => poisoned.into_inner().is_some(),
        }
    }

    /// Releases the transport. Safe to call any number of times; only the
    /// first call reaches [`UnaryTransport::close`].
    pub fn close(&self) {
        let taken = match self.inner.transport.write() {
            Ok(mut slot) => slot.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(transport) = taken {
            log::debug!("client({}): closing transport", self.inner.options.endpoint());
            transport.close();
        }
    }

    fn transport(&self) -> Result<Arc<dyn UnaryTransport>, ApiError> {
        let slot = match self.inner.transport.read() {
            Ok(slot) => slot,
            Err(poisoned) => poisoned.into_inner(),
        };
        slot.as_ref().map(Arc::clone).ok_or_else(ApiError::not_connected)
    }

    /// Runs one logical remote operation through the retry engine.
    ///
    /// The transport slot is read again before every attempt, so a `close()`
    /// during backoff ends the operation instead of reaching a closed channel.
    async fn call(&self, operation: &str, request: WireRequest) -> Result<WireResponse, ApiError> {
        self.transport()?;
        let timeouts = self.inner.options.timeouts();
        self.inner
            .orchestrator
            .execute(operation, move |index| {
                let transport = self.transport();
                let request = request.clone();
                let metadata = self.inner.metadata.clone();
                async move {
                    let transport = transport?;
                    run_attempt(transport.as_ref(), request, metadata, timeouts, index).await
                }
            })
            .await
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("endpoint", &self.inner.options.endpoint())
            .field("connected", &self.is_connected())
            .finish()
    }
}

fn validate_collection_name(name: &str) -> Result<(), ApiError> {
    if name.trim().is_empty() {
        return Err(ApiError::invalid_argument(
            "collection_name",
            "collection name must not be empty",
        ));
    }
    Ok(())
}

fn unexpected_response(expected: &str, actual: &WireResponse) -> ApiError {
    ApiError::decode(format!("expected {expected} response, got {}", actual.rpc_name()))
}

/// Batch responses fail as a whole when the server reports an overall error.
fn reject_overall_error(action: &str, overall_error: Option<String>) -> Result<(), ApiError> {
    match overall_error.filter(|message| !message.is_empty()) {
        Some(message) => {
            Err(ApiError::rejected(format!("Overall error during {action}: {message}")))
        }
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests;
