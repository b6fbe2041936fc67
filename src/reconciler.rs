//! Folding concurrent fetch outcomes into a single screen state
//!
//! A screen issues a fixed set of fetches at once and shows one
//! [`ScreenState`] for all of them. [`ResultReconciler`] awaits every
//! tracked fetch concurrently and applies outcomes in the order they
//! complete:
//!
//! - a success runs the fetch's callback against the screen's accumulator,
//!   then moves the state to `Idle` (if it isn't already)
//! - a failure moves the state to `Error` (if it isn't already)
//!
//! The last fetch to complete therefore decides the terminal state. An
//! earlier failure is masked by a later success and vice versa.

use futures::future::BoxFuture;
use futures::stream::{FuturesUnordered, StreamExt};
use futures::FutureExt;
use std::future::Future;
use tokio::sync::watch;

use crate::model::{ErrorCause, FetchedResource, ScreenState};

type Apply<'a, A> = Box<dyn FnOnce(&mut A) + Send + 'a>;

enum Completion<'a, A> {
    Success(Apply<'a, A>),
    Failure(ErrorCause),
}

/// Counts from one finished reconciliation cycle
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub succeeded: usize,
    pub failed: usize,
    /// Number of times the published state actually changed
    pub transitions: usize,
}

/// One reconciliation cycle over a fixed set of fetches.
///
/// `A` is the accumulator successful fetches write into. Callbacks receive
/// it by `&mut` one at a time, so they never need locking.
pub struct ResultReconciler<'a, A> {
    error_message: &'static str,
    fetches: Vec<BoxFuture<'a, Completion<'a, A>>>,
}

impl<'a, A: Send + 'a> ResultReconciler<'a, A> {
    /// `error_message` is the text published with `ScreenState::Error`.
    pub fn new(error_message: &'static str) -> Self {
        Self {
            error_message,
            fetches: Vec::new(),
        }
    }

    /// Register a fetch. `on_success` runs inside [`run`](Self::run) if and
    /// when the fetch succeeds.
    pub fn track<T, Fut, F>(&mut self, fetch: Fut, on_success: F) -> &mut Self
    where
        T: Send + 'a,
        Fut: Future<Output = FetchedResource<T>> + Send + 'a,
        F: FnOnce(&mut A, T) + Send + 'a,
    {
        let completion = async move {
            match fetch.await {
                FetchedResource::Success { data } => {
                    Completion::Success(Box::new(move |acc: &mut A| on_success(acc, data)) as Apply<'a, A>)
                }
                FetchedResource::Failure { cause } => Completion::Failure(cause),
            }
        };
        self.fetches.push(completion.boxed());
        self
    }

    pub fn len(&self) -> usize {
        self.fetches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fetches.is_empty()
    }

    /// Await every tracked fetch and publish state transitions to `state`.
    ///
    /// The state is `Loading` until the first completion. A cycle with no
    /// fetches settles on `Idle` immediately.
    pub async fn run(self, state: &watch::Sender<ScreenState>, acc: &mut A) -> CycleReport {
        let mut report = CycleReport::default();
        let error_message = self.error_message;

        if publish(state, ScreenState::Loading) {
            report.transitions += 1;
        }

        let mut pending: FuturesUnordered<_> = self
            .fetches
            .into_iter()
            .enumerate()
            .map(|(index, fetch)| fetch.map(move |completion| (index, completion)))
            .collect();

        if pending.is_empty() {
            if publish(state, ScreenState::Idle) {
                report.transitions += 1;
            }
            return report;
        }

        while let Some((index, completion)) = pending.next().await {
            let changed = match completion {
                Completion::Success(apply) => {
                    tracing::debug!(fetch = index, "Fetch succeeded");
                    apply(acc);
                    report.succeeded += 1;
                    publish(state, ScreenState::Idle)
                }
                Completion::Failure(cause) => {
                    tracing::debug!(fetch = index, cause = ?cause, "Fetch failed");
                    report.failed += 1;
                    state.send_if_modified(|current| {
                        if current.is_error() {
                            return false;
                        }
                        *current = ScreenState::Error {
                            message: error_message,
                            cause,
                        };
                        true
                    })
                }
            };
            if changed {
                report.transitions += 1;
            }
        }

        let settled = state.borrow().clone();
        tracing::info!(
            succeeded = report.succeeded,
            failed = report.failed,
            state = ?settled,
            "Reconciliation cycle finished"
        );
        report
    }
}

/// Replace the state unless it already equals `next`. Returns whether
/// watchers were notified.
fn publish(state: &watch::Sender<ScreenState>, next: ScreenState) -> bool {
    state.send_if_modified(|current| {
        if *current == next {
            return false;
        }
        *current = next;
        true
    })
}
