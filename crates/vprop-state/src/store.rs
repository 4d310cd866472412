//! # Validation State Store
//!
//! [`Store`] exclusively owns the canonical [`FieldSet`] and is the only
//! place field state changes. Every mutation is applied synchronously and
//! then reported to the host through the injected [`Notifier`], so the
//! canonical state is always current while the host's displayed copy may
//! lag.
//!
//! ## Operations
//!
//! | Operation          | Mutates       | Notifications            |
//! |--------------------|---------------|--------------------------|
//! | `change`           | value         | 1 (none for external)    |
//! | `validate`         | errors        | 1                        |
//! | `clean_errors`     | errors        | 1                        |
//! | `validate_all`     | every errors  | 1, batched               |
//! | `update_input`     | synced values | 1 batched, or 0          |
//!
//! ## Failure semantics
//!
//! Validator predicates are called synchronously and are not guarded. A
//! panicking predicate unwinds to the caller. Outcomes are computed before
//! anything is applied, so an aborted `validate` or `validate_all` leaves
//! the canonical state untouched.

use std::collections::HashMap;
use std::sync::Arc;

use vprop_core::{ErrorMap, FieldError, FieldKey, ValidateAllResult, ValidationOutcome, Value};
use vprop_schema::{
    resolve_with_generator, DocumentError, FieldDeclaration, FieldSet, FieldStatus, FormDocument,
    Generator,
};

use crate::handle::FieldHandle;
use crate::notify::{Continuation, ImmediateNotifier, Mutation, Notifier, StateUpdate};
use crate::snapshot::StoreSnapshot;

/// Host callback receiving the requested value of an external field.
pub type ChangeHandler = Box<dyn FnMut(Value)>;

/// The validation state store.
pub struct Store<N: Notifier = ImmediateNotifier> {
    fields: FieldSet,
    input: Value,
    handlers: HashMap<String, ChangeHandler>,
    notifier: N,
}

impl<N: Notifier + std::fmt::Debug> std::fmt::Debug for Store<N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut handlers: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        handlers.sort_unstable();
        f.debug_struct("Store")
            .field("fields", &self.fields)
            .field("input", &self.input)
            .field("handlers", &handlers)
            .field("notifier", &self.notifier)
            .finish()
    }
}

impl<N: Notifier> Store<N> {
    // ── Per-field reads ─────────────────────────────────────────────

    /// Current value of a field.
    pub fn value(&self, key: impl Into<FieldKey>) -> Result<&Value, FieldError> {
        Ok(self.fields.state(&key.into())?.value())
    }

    /// Current errors of a field.
    pub fn errors(&self, key: impl Into<FieldKey>) -> Result<&[String], FieldError> {
        Ok(self.fields.state(&key.into())?.errors())
    }

    /// Whether a field currently carries errors.
    pub fn status(&self, key: impl Into<FieldKey>) -> Result<FieldStatus, FieldError> {
        Ok(self.fields.state(&key.into())?.status())
    }

    // ── Per-field mutations ─────────────────────────────────────────

    /// Set a field's value. Errors are left as they are.
    ///
    /// For an external field the host owns the value: the registered
    /// change handler receives `value` and the store is not touched. The
    /// new value arrives later through [`update_input`](Self::update_input).
    ///
    /// # Errors
    ///
    /// Returns [`FieldError::MisconfiguredExternalField`] when the field is
    /// external and the host registered no handler under its name, or an
    /// addressing error for an unknown key.
    pub fn change(&mut self, key: impl Into<FieldKey>, value: impl Into<Value>) -> Result<(), FieldError> {
        let key = key.into();
        let value = value.into();

        let state = self.fields.state(&key)?;
        if let Some(binding) = state.external() {
            let handler_name = binding.change_handler.clone();
            let handler = self.handlers.get_mut(&handler_name).ok_or_else(|| {
                FieldError::MisconfiguredExternalField {
                    field: key.to_string(),
                    handler: handler_name.clone(),
                }
            })?;
            tracing::debug!(field = %key, handler = %handler_name, "change delegated to host");
            handler(value);
            return Ok(());
        }

        self.fields.state_mut(&key)?.set_value(value.clone());
        tracing::debug!(field = %key, "value changed");
        self.notifier
            .notify(StateUpdate::single(Mutation::SetValue { key, value }), None);
        Ok(())
    }

    /// Run a field's validators against its current value and the current
    /// field set, and replace its errors with the result.
    pub fn validate(&mut self, key: impl Into<FieldKey>) -> Result<ValidationOutcome, FieldError> {
        let key = key.into();
        let errors = self.fields.state(&key)?.evaluate(&self.fields);
        let outcome = ValidationOutcome::from_errors(errors.clone());

        self.fields.state_mut(&key)?.set_errors(errors.clone());
        tracing::debug!(field = %key, is_valid = outcome.is_valid, "field validated");
        self.notifier
            .notify(StateUpdate::single(Mutation::SetErrors { key, errors }), None);
        Ok(outcome)
    }

    /// Clear a field's errors.
    pub fn clean_errors(&mut self, key: impl Into<FieldKey>) -> Result<(), FieldError> {
        let key = key.into();
        self.fields.state_mut(&key)?.set_errors(Vec::new());
        tracing::debug!(field = %key, "errors cleaned");
        self.notifier.notify(
            StateUpdate::single(Mutation::SetErrors {
                key,
                errors: Vec::new(),
            }),
            None,
        );
        Ok(())
    }

    /// Handle bound to one field.
    pub fn field(&mut self, key: impl Into<FieldKey>) -> Result<FieldHandle<'_, N>, FieldError> {
        let key = key.into();
        self.fields.state(&key)?;
        Ok(FieldHandle::new(self, key))
    }

    // ── Whole-tree operations ───────────────────────────────────────

    /// Validate every field, items of indexed fields included, and report
    /// the result to the host as a single update.
    pub fn validate_all(&mut self) -> ValidateAllResult {
        self.run_validate_all(|_| None)
    }

    /// Like [`validate_all`](Self::validate_all), and hand `callback` to the
    /// host as the continuation of the batched update: it runs only once
    /// the host has applied the new errors.
    pub fn validate_all_then<F>(&mut self, callback: F) -> ValidateAllResult
    where
        F: FnOnce(&ValidateAllResult) + 'static,
    {
        self.run_validate_all(move |result| {
            let result = result.clone();
            Some(Box::new(move || callback(&result)) as Continuation)
        })
    }

    fn run_validate_all<C>(&mut self, continuation: C) -> ValidateAllResult
    where
        C: FnOnce(&ValidateAllResult) -> Option<Continuation>,
    {
        let evaluated: Vec<Vec<String>> = self
            .fields
            .states()
            .map(|state| state.evaluate(&self.fields))
            .collect();

        let mut failures = ErrorMap::new();
        let mut update = StateUpdate::new();
        for (state, errors) in self.fields.states_mut().zip(evaluated) {
            if !errors.is_empty() {
                failures.insert(state.name().to_string(), errors.clone());
            }
            update.push(Mutation::SetErrors {
                key: state.key().clone(),
                errors: errors.clone(),
            });
            state.set_errors(errors);
        }

        let result = ValidateAllResult::from_failures(failures);
        tracing::debug!(
            is_valid = result.is_valid,
            failing = result.failing_fields().len(),
            mutations = update.len(),
            "all fields validated"
        );
        let continuation = continuation(&result);
        self.notifier.notify(update, continuation);
        result
    }

    /// Sum of every current error-list length.
    pub fn errors_count(&self) -> usize {
        self.fields.errors_count()
    }

    // ── Host input ──────────────────────────────────────────────────

    /// Reconcile with new host input.
    ///
    /// Every field with a sync source is looked up against both the old and
    /// the new input; when the two differ the new value is force-set and
    /// errors are left alone. External fields are re-read from the new
    /// input. All resulting changes reach the host as one update, or none
    /// when nothing changed.
    pub fn update_input(&mut self, input: Value) {
        let mut update = StateUpdate::new();
        for state in self.fields.states_mut() {
            let next = if state.external().is_some() {
                let current = state.path().lookup(&input);
                (current != *state.value()).then_some(current)
            } else if let Some(source) = state.sync_source() {
                let before = source.derive(state.path(), &self.input);
                let after = source.derive(state.path(), &input);
                (before != after).then_some(after)
            } else {
                None
            };

            if let Some(value) = next {
                tracing::debug!(field = %state.name(), "value synced from input");
                state.set_value(value.clone());
                update.push(Mutation::SetValue {
                    key: state.key().clone(),
                    value,
                });
            }
        }
        self.input = input;

        if update.is_empty() {
            tracing::trace!("input updated, nothing to sync");
        } else {
            self.notifier.notify(update, None);
        }
    }

    // ── Accessors ───────────────────────────────────────────────────

    /// Fresh, detached copy of the current state.
    pub fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot::capture(&self.fields)
    }

    /// The canonical field set.
    pub fn fields(&self) -> &FieldSet {
        &self.fields
    }

    /// The current host input.
    pub fn input(&self) -> &Value {
        &self.input
    }

    /// The host notifier.
    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// The host notifier, mutably (e.g. to flush a queue).
    pub fn notifier_mut(&mut self) -> &mut N {
        &mut self.notifier
    }
}

/// Assembles a [`Store`] from declarations, host input and handlers.
#[derive(Default)]
pub struct StoreBuilder {
    declarations: Vec<FieldDeclaration>,
    generator: Option<Generator>,
    input: Value,
    handlers: HashMap<String, ChangeHandler>,
}

impl std::fmt::Debug for StoreBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreBuilder")
            .field("declarations", &self.declarations.len())
            .field("generator", &self.generator.is_some())
            .field("input", &self.input)
            .field("handlers", &self.handlers.len())
            .finish_non_exhaustive()
    }
}

impl StoreBuilder {
    /// Empty builder with `Value::Null` input.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one declaration.
    pub fn declare(mut self, declaration: FieldDeclaration) -> Self {
        self.declarations.push(declaration);
        self
    }

    /// Add several declarations, in order.
    pub fn declarations(mut self, declarations: impl IntoIterator<Item = FieldDeclaration>) -> Self {
        self.declarations.extend(declarations);
        self
    }

    /// Add every field of a form document.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::InvalidField`] for entries that do not
    /// compile into a declaration.
    pub fn document(self, document: &FormDocument) -> Result<Self, DocumentError> {
        Ok(self.declarations(document.to_declarations()?))
    }

    /// Generator of extra declarations, called once with the host input at
    /// build time. Its declarations follow the static ones.
    pub fn generator<F>(mut self, generator: F) -> Self
    where
        F: Fn(&Value) -> Vec<FieldDeclaration> + Send + Sync + 'static,
    {
        self.generator = Some(Arc::new(generator));
        self
    }

    /// Initial host input.
    pub fn input(mut self, input: Value) -> Self {
        self.input = input;
        self
    }

    /// Register the host handler external fields bound to `name` delegate
    /// their changes to.
    pub fn change_handler<F>(mut self, name: impl Into<String>, handler: F) -> Self
    where
        F: FnMut(Value) + 'static,
    {
        self.handlers.insert(name.into(), Box::new(handler));
        self
    }

    /// Resolve the declarations against the input and hand the result to a
    /// store reporting to `notifier`.
    pub fn build<N: Notifier>(self, notifier: N) -> Store<N> {
        let fields = resolve_with_generator(&self.declarations, self.generator.as_ref(), &self.input);
        for state in fields.states() {
            if let Some(binding) = state.external() {
                if !self.handlers.contains_key(&binding.change_handler) {
                    tracing::warn!(
                        field = %state.name(),
                        handler = %binding.change_handler,
                        "external field has no change handler; changes will fail"
                    );
                }
            }
        }
        tracing::debug!(fields = fields.len(), "store built");
        Store {
            fields,
            input: self.input,
            handlers: self.handlers,
            notifier,
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────
