//! # Host Notification
//!
//! The store never assumes how the host displays state. After every
//! mutation it hands the host a [`StateUpdate`] (the ordered list of
//! [`Mutation`]s it just applied to its canonical state) and, optionally,
//! a [`Continuation`] the host must run once that update is visible.
//!
//! ## Provided notifiers
//!
//! - [`ImmediateNotifier`]: for hosts with no displayed state. Runs
//!   continuations on the spot.
//! - [`QueuedNotifier`]: queues updates until [`QueuedNotifier::flush`],
//!   which applies them to a [`HostMirror`] and only then runs the
//!   continuations.
//! - Any `FnMut(StateUpdate, Option<Continuation>)` closure.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use vprop_core::{FieldKey, Value};

use crate::mirror::HostMirror;

/// One change to one field state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Mutation {
    /// The field's value was replaced.
    SetValue {
        /// Field addressed.
        key: FieldKey,
        /// New value.
        value: Value,
    },
    /// The field's error list was replaced.
    SetErrors {
        /// Field addressed.
        key: FieldKey,
        /// New errors (empty after a passing validation or a clean).
        errors: Vec<String>,
    },
}

impl Mutation {
    /// The field this mutation addresses.
    pub fn key(&self) -> &FieldKey {
        match self {
            Self::SetValue { key, .. } | Self::SetErrors { key, .. } => key,
        }
    }
}

/// Ordered batch of mutations delivered in one notification.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StateUpdate {
    mutations: Vec<Mutation>,
}

impl StateUpdate {
    /// Empty batch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Batch holding a single mutation.
    pub fn single(mutation: Mutation) -> Self {
        Self {
            mutations: vec![mutation],
        }
    }

    /// Append a mutation.
    pub fn push(&mut self, mutation: Mutation) {
        self.mutations.push(mutation);
    }

    /// Mutations in application order.
    pub fn mutations(&self) -> &[Mutation] {
        &self.mutations
    }

    /// Number of mutations.
    pub fn len(&self) -> usize {
        self.mutations.len()
    }

    /// Whether the batch is empty.
    pub fn is_empty(&self) -> bool {
        self.mutations.is_empty()
    }
}

/// Work the host runs once a notified update is visible.
pub type Continuation = Box<dyn FnOnce()>;

/// The engine → host notification contract.
pub trait Notifier {
    /// Apply `update` to the host's own state representation, then run
    /// `continuation` (if any) once the update is visible.
    fn notify(&mut self, update: StateUpdate, continuation: Option<Continuation>);
}

impl<F> Notifier for F
where
    F: FnMut(StateUpdate, Option<Continuation>),
{
    fn notify(&mut self, update: StateUpdate, continuation: Option<Continuation>) {
        self(update, continuation)
    }
}

/// Notifier for hosts without displayed state.
#[derive(Debug, Default)]
pub struct ImmediateNotifier {
    notifications: usize,
}

impl ImmediateNotifier {
    /// New notifier.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of notifications received so far.
    pub fn notifications(&self) -> usize {
        self.notifications
    }
}

impl Notifier for ImmediateNotifier {
    fn notify(&mut self, _update: StateUpdate, continuation: Option<Continuation>) {
        self.notifications += 1;
        if let Some(continuation) = continuation {
            continuation();
        }
    }
}

/// Notifier that defers application until the host flushes.
///
/// Models a host whose displayed copy lags the store: updates queue up,
/// and [`flush`](Self::flush) applies all of them to the mirror before
/// running any continuation.
#[derive(Default)]
pub struct QueuedNotifier {
    mirror: HostMirror,
    pending: VecDeque<(StateUpdate, Option<Continuation>)>,
    received: usize,
}

impl std::fmt::Debug for QueuedNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueuedNotifier")
            .field("mirror", &self.mirror)
            .field("pending", &self.pending.len())
            .field("received", &self.received)
            .finish()
    }
}

impl QueuedNotifier {
    /// Queue on top of an initial mirror, typically built from a snapshot.
    pub fn new(mirror: HostMirror) -> Self {
        Self {
            mirror,
            pending: VecDeque::new(),
            received: 0,
        }
    }

    /// The host's displayed copy.
    pub fn mirror(&self) -> &HostMirror {
        &self.mirror
    }

    /// Replace the displayed copy, e.g. with a fresh snapshot.
    pub fn reset_mirror(&mut self, mirror: HostMirror) {
        self.mirror = mirror;
    }

    /// Updates waiting to be applied.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Total notifications received.
    pub fn received(&self) -> usize {
        self.received
    }

    /// Apply every queued update to the mirror, then run their
    /// continuations in the order they were queued. Returns the number of
    /// updates applied.
    pub fn flush(&mut self) -> usize {
        let mut continuations = Vec::new();
        let mut applied = 0;
        while let Some((update, continuation)) = self.pending.pop_front() {
            self.mirror.apply(&update);
            applied += 1;
            continuations.extend(continuation);
        }
        tracing::debug!(applied, continuations = continuations.len(), "host flushed queued updates");
        for continuation in continuations {
            continuation();
        }
        applied
    }
}

impl Notifier for QueuedNotifier {
    fn notify(&mut self, update: StateUpdate, continuation: Option<Continuation>) {
        self.received += 1;
        self.pending.push_back((update, continuation));
    }
}
