//! # Host Mirror
//!
//! The host's displayed copy of the field states. It starts from a
//! snapshot and only changes when the host applies a [`StateUpdate`], so it
//! may lag the store's canonical state until the host catches up.

use std::collections::BTreeMap;

use vprop_core::{FieldKey, Value};

use crate::notify::{Mutation, StateUpdate};
use crate::snapshot::{FieldView, StoreSnapshot};

/// Displayed field states, keyed like the store addresses them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HostMirror {
    views: BTreeMap<FieldKey, FieldView>,
    updates_applied: usize,
}

impl HostMirror {
    /// Empty mirror.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mirror seeded from a snapshot.
    pub fn from_snapshot(snapshot: &StoreSnapshot) -> Self {
        Self {
            views: snapshot.views().into_iter().collect(),
            updates_applied: 0,
        }
    }

    /// Apply one update, mutation by mutation. Keys the mirror has never
    /// seen are added.
    pub fn apply(&mut self, update: &StateUpdate) {
        for mutation in update.mutations() {
            let view = self.views.entry(mutation.key().clone()).or_default();
            match mutation {
                Mutation::SetValue { value, .. } => view.value = value.clone(),
                Mutation::SetErrors { errors, .. } => view.errors = errors.clone(),
            }
        }
        self.updates_applied += 1;
    }

    /// Displayed value.
    pub fn value(&self, key: impl Into<FieldKey>) -> Option<&Value> {
        self.views.get(&key.into()).map(|view| &view.value)
    }

    /// Displayed errors.
    pub fn errors(&self, key: impl Into<FieldKey>) -> Option<&[String]> {
        self.views.get(&key.into()).map(|view| view.errors.as_slice())
    }

    /// Sum of displayed error-list lengths.
    pub fn errors_count(&self) -> usize {
        self.views.values().map(|view| view.errors.len()).sum()
    }

    /// Number of updates applied since the mirror was seeded.
    pub fn updates_applied(&self) -> usize {
        self.updates_applied
    }
}
