//! # Field Handles
//!
//! A [`FieldHandle`] binds the per-field operations to one key, so the host
//! can hand a single field's `value`/`change`/`validate`/`clean_errors` to
//! whatever displays that field without passing the name around.

use vprop_core::{FieldError, FieldKey, ValidationOutcome, Value};
use vprop_schema::FieldStatus;

use crate::notify::Notifier;
use crate::store::Store;

/// Per-field operations bound to one key of a [`Store`].
pub struct FieldHandle<'s, N: Notifier> {
    store: &'s mut Store<N>,
    key: FieldKey,
}

impl<N: Notifier> std::fmt::Debug for FieldHandle<'_, N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldHandle")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

impl<'s, N: Notifier> FieldHandle<'s, N> {
    pub(crate) fn new(store: &'s mut Store<N>, key: FieldKey) -> Self {
        Self { store, key }
    }

    /// The bound key.
    pub fn key(&self) -> &FieldKey {
        &self.key
    }

    /// See [`Store::value`].
    pub fn value(&self) -> Result<&Value, FieldError> {
        self.store.value(&self.key)
    }

    /// See [`Store::errors`].
    pub fn errors(&self) -> Result<&[String], FieldError> {
        self.store.errors(&self.key)
    }

    /// See [`Store::status`].
    pub fn status(&self) -> Result<FieldStatus, FieldError> {
        self.store.status(&self.key)
    }

    /// See [`Store::change`].
    pub fn change(&mut self, value: impl Into<Value>) -> Result<(), FieldError> {
        self.store.change(&self.key, value)
    }

    /// See [`Store::validate`].
    pub fn validate(&mut self) -> Result<ValidationOutcome, FieldError> {
        self.store.validate(&self.key)
    }

    /// See [`Store::clean_errors`].
    pub fn clean_errors(&mut self) -> Result<(), FieldError> {
        self.store.clean_errors(&self.key)
    }
}
