//! One physical attempt, raced against the client-side timer.

use crate::classify::classify;
use crate::error::{ApiError, StatusCode};
use crate::transport::{CallHandle, CallOptions, Completion, Metadata, UnaryTransport};
use crate::wire::{WireRequest, WireResponse};
use std::time::Duration;
use tokio::time::Instant;

/// The two independent bounds applied to every attempt.
///
/// `per_call_deadline` is handed to the transport and enforced by the remote
/// side. `client_side_timeout` is enforced locally and wins even when the
/// transport never answers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CallTimeouts {
    pub per_call_deadline: Option<Duration>,
    pub client_side_timeout: Option<Duration>,
}

/// A started invocation that has not produced an outcome yet.
///
/// Dropping it before [`OperationAttempt::settle`] cancels the transport
/// handle, which is what happens when the caller drops an operation future.
pub(crate) struct OperationAttempt {
    index: u32,
    handle: Box<dyn CallHandle>,
    settled: bool,
}

impl OperationAttempt {
    fn new(index: u32, handle: Box<dyn CallHandle>) -> Self {
        Self { index, handle, settled: false }
    }

    fn settle(&mut self) {
        self.settled = true;
    }

    /// Settles the attempt and cancels the call still in flight.
    fn abandon(&mut self) {
        if !self.settled {
            self.settled = true;
            self.handle.cancel();
        }
    }
}

impl Drop for OperationAttempt {
    fn drop(&mut self) {
        if !self.settled {
            log::debug!("rpc: attempt {} dropped in flight, cancelling", self.index);
            self.handle.cancel();
        }
    }
}

/// Runs attempt number `index` (1-based) and resolves exactly once.
pub(crate) async fn run_attempt(
    transport: &dyn UnaryTransport,
    request: WireRequest,
    metadata: Metadata,
    timeouts: CallTimeouts,
    index: u32,
) -> Result<WireResponse, ApiError> {
    let method = request.method();
    let options = CallOptions {
        deadline: timeouts.per_call_deadline.map(|deadline| Instant::now() + deadline),
    };
    let timer = timeouts
        .client_side_timeout
        .map(|limit| (limit, Box::pin(tokio::time::sleep(limit))));

    let (completion, receiver) = Completion::channel();
    log::trace!("rpc({method}): attempt {index} invoking");
    let handle = transport.invoke(request, metadata, options, completion);
    let mut attempt = OperationAttempt::new(index, handle);

    let delivered = match timer {
        Some((limit, sleep)) => {
            tokio::select! {
                biased;
                delivered = receiver => delivered,
                _ = sleep => {
                    attempt.abandon();
                    log::warn!(
                        "rpc({method}): attempt {index} timed out client-side after {}ms",
                        limit.as_millis()
                    );
                    return Err(ApiError::client_timeout(limit));
                }
            }
        }
        None => receiver.await,
    };
    attempt.settle();

    match delivered {
        Ok(Ok(response)) => Ok(response),
        Ok(Err(error)) => Err(classify(error)),
        Err(_) => Err(ApiError::new(StatusCode::Unknown, "transport dropped the call")),
    }
}
