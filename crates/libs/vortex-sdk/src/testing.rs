//! Scripted transport shared by the unit test suites.

use crate::transport::{
    CallHandle, CallOptions, Completion, Metadata, TransportError, TransportResult, UnaryTransport,
};
use crate::wire::WireRequest;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub(crate) enum Step {
    /// Completes after `delay`; zero completes inside `invoke`.
    Respond { delay: Duration, result: TransportResult },
    /// Holds the completion and never answers.
    Hang,
    /// Drops the completion without answering.
    Drop,
}

impl Step {
    pub(crate) fn respond(result: TransportResult) -> Self {
        Step::Respond { delay: Duration::ZERO, result }
    }

    pub(crate) fn respond_after(delay: Duration, result: TransportResult) -> Self {
        Step::Respond { delay, result }
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Invocation {
    pub(crate) method: String,
    pub(crate) request: WireRequest,
    pub(crate) metadata: Metadata,
    pub(crate) options: CallOptions,
}

pub(crate) struct ScriptedTransport {
    steps: Mutex<VecDeque<Step>>,
    invocations: Mutex<Vec<Invocation>>,
    hanging: Mutex<Vec<Completion>>,
    late_deliveries: Arc<Mutex<Vec<bool>>>,
    cancels: Arc<AtomicUsize>,
    closes: AtomicUsize,
}

struct ScriptedHandle {
    cancels: Arc<AtomicUsize>,
}

impl CallHandle for ScriptedHandle {
    fn cancel(&self) {
        self.cancels.fetch_add(1, Ordering::SeqCst);
    }
}

impl ScriptedTransport {
    pub(crate) fn new(steps: impl IntoIterator<Item = Step>) -> Self {
        Self {
            steps: Mutex::new(steps.into_iter().collect()),
            invocations: Mutex::new(Vec::new()),
            hanging: Mutex::new(Vec::new()),
            late_deliveries: Arc::new(Mutex::new(Vec::new())),
            cancels: Arc::new(AtomicUsize::new(0)),
            closes: AtomicUsize::new(0),
        }
    }

    pub(crate) fn invocations(&self) -> Vec<Invocation> {
        self.invocations.lock().expect("invocations mutex poisoned").clone()
    }

    pub(crate) fn invocation_count(&self) -> usize {
        self.invocations.lock().expect("invocations mutex poisoned").len()
    }

    pub(crate) fn cancel_count(&self) -> usize {
        self.cancels.load(Ordering::SeqCst)
    }

    pub(crate) fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    /// Return values of `Completion::complete` for delayed steps, in completion order.
    pub(crate) fn late_deliveries(&self) -> Vec<bool> {
        self.late_deliveries.lock().expect("late_deliveries mutex poisoned").clone()
    }
}

impl UnaryTransport for ScriptedTransport {
    fn invoke(
        &self,
        request: WireRequest,
        metadata: Metadata,
        options: CallOptions,
        completion: Completion,
    ) -> Box<dyn CallHandle> {
        self.invocations.lock().expect("invocations mutex poisoned").push(Invocation {
            method: request.method(),
            request,
            metadata,
            options,
        });
        let step = self.steps.lock().expect("steps mutex poisoned").pop_front();
        match step {
            Some(Step::Respond { delay, result }) if delay.is_zero() => {
                completion.complete(result);
            }
            Some(Step::Respond { delay, result }) => {
                let late_deliveries = Arc::clone(&self.late_deliveries);
                tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    let delivered = completion.complete(result);
                    late_deliveries.lock().expect("late_deliveries mutex poisoned").push(delivered);
                });
            }
            Some(Step::Hang) => {
                self.hanging.lock().expect("hanging mutex poisoned").push(completion);
            }
            Some(Step::Drop) => drop(completion),
            None => {
                completion.fail(TransportError::new(13, "no scripted response left"));
            }
        }
        Box::new(ScriptedHandle { cancels: Arc::clone(&self.cancels) })
    }

    fn close(&self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}
