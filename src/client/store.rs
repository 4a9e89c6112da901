//! # Shared Fetch State Store
//!
//! Single-flight cache for one logical probe (client-server discovery,
//! support info, federation report) scoped to exactly one target at a time.
//!
//! ## Behavior
//!
//! - **Single flight**: a `request` for the target currently in flight joins
//!   the pending result instead of starting a second sequence.
//! - **Cache**: a completed result for the same target is returned
//!   immediately until it is older than `max_age` (if set).
//! - **Supersession**: a request for a different target resets the state to
//!   loading for the new target. The superseded sequence keeps running but
//!   nothing it produces is published.
//!
//! ## Ownership
//!
//! Only the store's own sequence runner mutates the state. Callers get
//! snapshots through [`ProbeStore::state`], a broadcast of every published
//! snapshot through [`ProbeStore::subscribe`], and the final state of the
//! sequence they started or joined from [`ProbeStore::request`].
//!
//! Stores are plain values: create one per UI session, never a global.

use crate::shared::{ErrorKind, ProbeFailure, ProbeStep};
use chrono::{DateTime, Utc};
use futures_util::future::{BoxFuture, FutureExt, Shared};
use serde::Serialize;
use std::any::Any;
use std::collections::BTreeMap;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::{Duration, Instant};
use tokio::sync::broadcast;

/// Capacity of the snapshot broadcast channel
const UPDATE_CHANNEL_CAPACITY: usize = 64;

/// Derived lifecycle status of a [`ProbeState`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchStatus {
    Idle,
    Loading,
    Success,
    Failed,
}

/// Published state of one probe
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeState<D> {
    /// Result data, possibly partial when a later step failed
    pub data: Option<D>,
    /// Failures keyed by the step that produced them
    pub errors: BTreeMap<ProbeStep, ProbeFailure>,
    pub loading: bool,
    /// Target this state belongs to
    pub target: Option<String>,
    pub fetched_at: Option<DateTime<Utc>>,
}

impl<D> Default for ProbeState<D> {
    fn default() -> Self {
        Self {
            data: None,
            errors: BTreeMap::new(),
            loading: false,
            target: None,
            fetched_at: None,
        }
    }
}

impl<D> ProbeState<D> {
    fn loading(target: &str) -> Self {
        Self {
            loading: true,
            target: Some(target.to_string()),
            ..Self::default()
        }
    }

    pub fn status(&self) -> FetchStatus {
        if self.loading {
            FetchStatus::Loading
        } else if self.target.is_none() {
            FetchStatus::Idle
        } else if self.errors.values().any(|failure| !failure.is_warning()) {
            FetchStatus::Failed
        } else {
            FetchStatus::Success
        }
    }

    pub fn error(&self, step: ProbeStep) -> Option<&ProbeFailure> {
        self.errors.get(&step)
    }

    /// First non-warning failure, in step order
    pub fn first_failure(&self) -> Option<(ProbeStep, &ProbeFailure)> {
        self.errors
            .iter()
            .find(|(_, failure)| !failure.is_warning())
            .map(|(step, failure)| (*step, failure))
    }
}

/// What a sequence produced so far
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceOutcome<D> {
    pub data: Option<D>,
    pub errors: BTreeMap<ProbeStep, ProbeFailure>,
}

impl<D> Default for SequenceOutcome<D> {
    fn default() -> Self {
        Self {
            data: None,
            errors: BTreeMap::new(),
        }
    }
}

impl<D> SequenceOutcome<D> {
    pub fn with_data(data: D) -> Self {
        Self {
            data: Some(data),
            errors: BTreeMap::new(),
        }
    }

    pub fn record(&mut self, step: ProbeStep, failure: ProbeFailure) {
        self.errors.insert(step, failure);
    }
}

/// A multi-step probe the store can run for a target
pub trait ProbeSequence: Send + Sync + 'static {
    type Data: Clone + Send + Sync + 'static;

    /// Run every step for `target`, publishing intermediate results through
    /// `reporter`, and return the final outcome.
    fn run(
        self: Arc<Self>,
        target: String,
        reporter: StepReporter<Self::Data>,
    ) -> BoxFuture<'static, SequenceOutcome<Self::Data>>;
}

/// Store tuning
#[derive(Debug, Clone, Copy, Default)]
pub struct StoreOptions {
    /// Completed results older than this are refetched
    pub max_age: Option<Duration>,
}

struct InFlight<D> {
    target: String,
    result: Shared<BoxFuture<'static, ProbeState<D>>>,
}

struct StoreInner<D> {
    state: ProbeState<D>,
    generation: u64,
    completed_at: Option<Instant>,
    in_flight: Option<InFlight<D>>,
}

/// State shared between the store handle, its running sequence and its
/// reporters
struct StateCell<D> {
    inner: Mutex<StoreInner<D>>,
    updates: broadcast::Sender<ProbeState<D>>,
}

impl<D: Clone> StateCell<D> {
    fn lock(&self) -> MutexGuard<'_, StoreInner<D>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, state: &ProbeState<D>) {
        // No subscribers is fine
        let _ = self.updates.send(state.clone());
    }

    fn publish_partial(&self, generation: u64, outcome: SequenceOutcome<D>) {
        let mut inner = self.lock();
        if inner.generation != generation {
            return;
        }
        inner.state.data = outcome.data;
        inner.state.errors = outcome.errors;
        self.publish(&inner.state);
    }

    fn finish(&self, generation: u64, target: String, outcome: SequenceOutcome<D>) -> ProbeState<D> {
        let state = ProbeState {
            data: outcome.data,
            errors: outcome.errors,
            loading: false,
            target: Some(target),
            fetched_at: Some(Utc::now()),
        };

        let mut inner = self.lock();
        if inner.generation == generation {
            tracing::info!(
                target_id = state.target.as_deref().unwrap_or_default(),
                status = ?state.status(),
                failed_step = ?state.first_failure().map(|(step, _)| step),
                "Probe sequence finished"
            );
            inner.state = state.clone();
            inner.completed_at = Some(Instant::now());
            inner.in_flight = None;
            self.publish(&inner.state);
        } else {
            tracing::debug!(
                "Discarding result for superseded target {:?}",
                state.target
            );
        }
        state
    }
}

/// Handle a running sequence uses to publish intermediate results
pub struct StepReporter<D> {
    cell: Weak<StateCell<D>>,
    generation: u64,
}

impl<D: Clone> StepReporter<D> {
    /// Publish the outcome so far; ignored once the sequence is superseded
    pub fn publish(&self, outcome: &SequenceOutcome<D>) {
        if let Some(cell) = self.cell.upgrade() {
            cell.publish_partial(self.generation, outcome.clone());
        }
    }

    /// A reporter attached to nothing (for running sequences standalone)
    pub fn detached() -> Self {
        Self {
            cell: Weak::new(),
            generation: 0,
        }
    }
}

/// Single-flight store for one probe sequence
pub struct ProbeStore<S: ProbeSequence> {
    sequence: Arc<S>,
    options: StoreOptions,
    cell: Arc<StateCell<S::Data>>,
}

impl<S: ProbeSequence> Clone for ProbeStore<S> {
    fn clone(&self) -> Self {
        Self {
            sequence: Arc::clone(&self.sequence),
            options: self.options,
            cell: Arc::clone(&self.cell),
        }
    }
}

impl<S: ProbeSequence> ProbeStore<S> {
    pub fn new(sequence: S) -> Self {
        Self::with_options(sequence, StoreOptions::default())
    }

    pub fn with_options(sequence: S, options: StoreOptions) -> Self {
        let (updates, _) = broadcast::channel(UPDATE_CHANNEL_CAPACITY);
        Self {
            sequence: Arc::new(sequence),
            options,
            cell: Arc::new(StateCell {
                inner: Mutex::new(StoreInner {
                    state: ProbeState::default(),
                    generation: 0,
                    completed_at: None,
                    in_flight: None,
                }),
                updates,
            }),
        }
    }

    /// Snapshot of the current state
    pub fn state(&self) -> ProbeState<S::Data> {
        self.cell.lock().state.clone()
    }

    /// Receive every snapshot published from now on
    pub fn subscribe(&self) -> broadcast::Receiver<ProbeState<S::Data>> {
        self.cell.updates.subscribe()
    }

    /// Result for `target`: joins an in-flight sequence, returns a fresh
    /// cached result, or starts a new sequence.
    pub async fn request(&self, target: &str) -> ProbeState<S::Data> {
        let pending = {
            let mut inner = self.cell.lock();
            if let Some(joined) = Self::join_in_flight(&inner, target) {
                joined
            } else if inner.state.target.as_deref() == Some(target)
                && !inner.state.loading
                && !self.is_stale(inner.completed_at)
            {
                tracing::debug!("Serving cached probe state for {}", target);
                return inner.state.clone();
            } else {
                self.start(&mut inner, target)
            }
        };
        pending.await
    }

    /// Like [`request`](Self::request) but ignores any cached result
    pub async fn refresh(&self, target: &str) -> ProbeState<S::Data> {
        let pending = {
            let mut inner = self.cell.lock();
            match Self::join_in_flight(&inner, target) {
                Some(joined) => joined,
                None => self.start(&mut inner, target),
            }
        };
        pending.await
    }

    fn join_in_flight(
        inner: &StoreInner<S::Data>,
        target: &str,
    ) -> Option<Shared<BoxFuture<'static, ProbeState<S::Data>>>> {
        inner
            .in_flight
            .as_ref()
            .filter(|in_flight| in_flight.target == target)
            .map(|in_flight| {
                tracing::debug!("Joining in-flight probe for {}", target);
                in_flight.result.clone()
            })
    }

    fn is_stale(&self, completed_at: Option<Instant>) -> bool {
        match (self.options.max_age, completed_at) {
            (Some(max_age), Some(at)) => at.elapsed() > max_age,
            (_, None) => true,
            (None, Some(_)) => false,
        }
    }

    fn start(
        &self,
        inner: &mut StoreInner<S::Data>,
        target: &str,
    ) -> Shared<BoxFuture<'static, ProbeState<S::Data>>> {
        if let Some(previous) = &inner.in_flight {
            tracing::debug!("Superseding in-flight probe for {} with {}", previous.target, target);
        }

        inner.generation += 1;
        let generation = inner.generation;
        inner.state = ProbeState::loading(target);
        inner.completed_at = None;
        self.cell.publish(&inner.state);

        let reporter = StepReporter {
            cell: Arc::downgrade(&self.cell),
            generation,
        };
        let sequence = Arc::clone(&self.sequence);
        let cell = Arc::clone(&self.cell);
        let owned_target = target.to_string();

        let handle = tokio::spawn(async move {
            let run = sequence.run(owned_target.clone(), reporter);
            let outcome = match AssertUnwindSafe(run).catch_unwind().await {
                Ok(outcome) => outcome,
                Err(payload) => {
                    let details = panic_message(payload.as_ref());
                    tracing::error!("Probe sequence for {} panicked: {}", owned_target, details);
                    aborted_outcome(details)
                }
            };
            cell.finish(generation, owned_target, outcome)
        });

        // Only reached when the runtime cancels the task
        let fallback_cell = Arc::clone(&self.cell);
        let fallback_target = target.to_string();
        let result = async move {
            match handle.await {
                Ok(state) => state,
                Err(err) => {
                    tracing::error!("Probe sequence for {} aborted: {}", fallback_target, err);
                    fallback_cell.finish(generation, fallback_target, aborted_outcome(&err.to_string()))
                }
            }
        }
        .boxed()
        .shared();

        inner.in_flight = Some(InFlight {
            target: target.to_string(),
            result: result.clone(),
        });
        result
    }
}

/// Outcome recorded when a sequence never produced one
fn aborted_outcome<D>(details: &str) -> SequenceOutcome<D> {
    let mut outcome = SequenceOutcome::default();
    outcome.record(
        ProbeStep::WellKnown,
        ProbeFailure::new(ErrorKind::Unknown, "errors.unknown").with_details(details),
    );
    outcome
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else {
        "unknown panic payload"
    }
}
