//! # Field States
//!
//! The live, per-field state produced by the resolver and owned by the
//! store. A [`FieldSet`] is the ordered mapping from field name to
//! [`FieldEntry`]; validator predicates receive it by shared reference so
//! cross-field rules read sibling values as they are right now.
//!
//! ## Per-field lifecycle
//!
//! ```text
//! Clean ──change──▶ Clean            (value updated, errors untouched)
//! Clean ──validate(fail)──▶ Invalid
//! Invalid ──validate(pass)──▶ Clean
//! Invalid ──clean_errors──▶ Clean
//! ```
//!
//! No state is terminal. A field lives as long as the store that owns it.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use vprop_core::{FieldError, FieldKey, FieldPath, Value};

use crate::declaration::{ExternalBinding, FieldDeclaration, Validator, ValueSource};

/// Whether a field currently carries errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldStatus {
    /// Error list is empty.
    Clean,
    /// Last validation produced at least one error.
    Invalid,
}

impl std::fmt::Display for FieldStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Clean => "CLEAN",
            Self::Invalid => "INVALID",
        };
        f.write_str(s)
    }
}

/// State of one field, or of one item of an indexed field.
#[derive(Debug, Clone)]
pub struct FieldState {
    key: FieldKey,
    name: String,
    path: FieldPath,
    value: Value,
    errors: Vec<String>,
    validators: Vec<Validator>,
    fallback_error: Option<String>,
    sync_source: Option<ValueSource>,
    external: Option<ExternalBinding>,
}

impl FieldState {
    pub(crate) fn from_declaration(
        decl: &FieldDeclaration,
        key: FieldKey,
        path: FieldPath,
        value: Value,
    ) -> Self {
        Self {
            name: key.to_string(),
            key,
            path,
            value,
            errors: Vec::new(),
            validators: decl.validators.clone(),
            fallback_error: decl.fallback_error.clone(),
            sync_source: decl.sync_source.clone(),
            external: decl.external.clone(),
        }
    }

    pub(crate) fn without_external(mut self) -> Self {
        self.external = None;
        self
    }

    /// Address of this state in its set.
    pub fn key(&self) -> &FieldKey {
        &self.key
    }

    /// Display name: the declared name, or `name[i]` for an item.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parsed declared name, used for host-input lookups.
    pub fn path(&self) -> &FieldPath {
        &self.path
    }

    /// Current value.
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Current errors, in validator order.
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Declared validators.
    pub fn validators(&self) -> &[Validator] {
        &self.validators
    }

    /// Message used when a failing validator has none.
    pub fn fallback_error(&self) -> Option<&str> {
        self.fallback_error.as_deref()
    }

    /// Sync rule applied on host-input updates.
    pub fn sync_source(&self) -> Option<&ValueSource> {
        self.sync_source.as_ref()
    }

    /// External binding, if the host owns this value.
    pub fn external(&self) -> Option<&ExternalBinding> {
        self.external.as_ref()
    }

    /// Clean or invalid.
    pub fn status(&self) -> FieldStatus {
        if self.errors.is_empty() {
            FieldStatus::Clean
        } else {
            FieldStatus::Invalid
        }
    }

    /// Run every validator against the current value and `fields`, without
    /// touching this state. One message per failing validator.
    pub fn evaluate(&self, fields: &FieldSet) -> Vec<String> {
        let mut errors = Vec::new();
        for (position, validator) in self.validators.iter().enumerate() {
            let passed = validator.check(&self.value, fields);
            tracing::trace!(field = %self.name, position, passed, "validator evaluated");
            if !passed {
                let message = validator
                    .error()
                    .or(self.fallback_error.as_deref())
                    .unwrap_or_default();
                errors.push(message.to_string());
            }
        }
        errors
    }

    /// Replace the value. Errors are left as they are.
    pub fn set_value(&mut self, value: Value) {
        self.value = value;
    }

    /// Replace the error list.
    pub fn set_errors(&mut self, errors: Vec<String>) {
        self.errors = errors;
    }
}

/// A field in the set: one state, or one state per item.
#[derive(Debug, Clone)]
pub enum FieldEntry {
    /// Scalar field.
    Scalar(FieldState),
    /// Indexed field with a fixed number of items.
    Indexed(Vec<FieldState>),
}

impl FieldEntry {
    /// All states of this entry: one for a scalar, one per item otherwise.
    pub fn states(&self) -> &[FieldState] {
        match self {
            Self::Scalar(state) => std::slice::from_ref(state),
            Self::Indexed(items) => items,
        }
    }

    /// Mutable view of [`states`](Self::states).
    pub fn states_mut(&mut self) -> &mut [FieldState] {
        match self {
            Self::Scalar(state) => std::slice::from_mut(state),
            Self::Indexed(items) => items,
        }
    }

    /// Whether this is an indexed field.
    pub fn is_indexed(&self) -> bool {
        matches!(self, Self::Indexed(_))
    }

    /// Total number of current errors across all states.
    pub fn errors_count(&self) -> usize {
        self.states().iter().map(|s| s.errors().len()).sum()
    }
}

/// Ordered mapping from field name to entry. Insertion order is declaration
/// order; the set never shrinks.
#[derive(Debug, Clone, Default)]
pub struct FieldSet {
    entries: Vec<(String, FieldEntry)>,
    positions: HashMap<String, usize>,
}

impl FieldSet {
    /// Empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry, or replace an existing one in place. Returns true
    /// when a previous entry of the same name was replaced.
    pub(crate) fn upsert(&mut self, name: String, entry: FieldEntry) -> bool {
        if let Some(&position) = self.positions.get(&name) {
            self.entries[position].1 = entry;
            return true;
        }
        self.positions.insert(name.clone(), self.entries.len());
        self.entries.push((name, entry));
        false
    }

    /// Number of declared fields (an indexed field counts once).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no field is declared.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Field names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// Entries in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldEntry)> {
        self.entries.iter().map(|(name, entry)| (name.as_str(), entry))
    }

    /// Every state, items of indexed fields included, in order.
    pub fn states(&self) -> impl Iterator<Item = &FieldState> {
        self.entries.iter().flat_map(|(_, entry)| entry.states())
    }

    /// Mutable view of [`states`](Self::states).
    pub fn states_mut(&mut self) -> impl Iterator<Item = &mut FieldState> {
        self.entries
            .iter_mut()
            .flat_map(|(_, entry)| entry.states_mut().iter_mut())
    }

    /// Look up an entry by name.
    pub fn entry(&self, name: &str) -> Option<&FieldEntry> {
        self.positions.get(name).map(|&p| &self.entries[p].1)
    }

    /// Current value of a scalar field. `None` for unknown or indexed names.
    pub fn value(&self, name: &str) -> Option<&Value> {
        match self.entry(name)? {
            FieldEntry::Scalar(state) => Some(state.value()),
            FieldEntry::Indexed(_) => None,
        }
    }

    /// Current value of one item of an indexed field.
    pub fn item_value(&self, name: &str, index: usize) -> Option<&Value> {
        match self.entry(name)? {
            FieldEntry::Indexed(items) => items.get(index).map(FieldState::value),
            FieldEntry::Scalar(_) => None,
        }
    }

    /// Resolve a key to its state.
    pub fn state(&self, key: &FieldKey) -> Result<&FieldState, FieldError> {
        let (position, item) = self.locate(key)?;
        Ok(&self.entries[position].1.states()[item])
    }

    /// Resolve a key to its state, mutably.
    pub fn state_mut(&mut self, key: &FieldKey) -> Result<&mut FieldState, FieldError> {
        let (position, item) = self.locate(key)?;
        Ok(&mut self.entries[position].1.states_mut()[item])
    }

    /// Every key in the set, items expanded, in order.
    pub fn keys(&self) -> Vec<FieldKey> {
        self.states().map(|state| state.key().clone()).collect()
    }

    /// Sum of all current error-list lengths.
    pub fn errors_count(&self) -> usize {
        self.entries.iter().map(|(_, entry)| entry.errors_count()).sum()
    }

    fn locate(&self, key: &FieldKey) -> Result<(usize, usize), FieldError> {
        let name = key.name();
        let position = *self
            .positions
            .get(name)
            .ok_or_else(|| FieldError::UnknownField {
                name: name.to_string(),
            })?;

        match (&self.entries[position].1, key.index()) {
            (FieldEntry::Scalar(_), None) => Ok((position, 0)),
            (FieldEntry::Scalar(_), Some(_)) => Err(FieldError::NotIndexed {
                name: name.to_string(),
            }),
            (FieldEntry::Indexed(_), None) => Err(FieldError::NotScalar {
                name: name.to_string(),
            }),
            (FieldEntry::Indexed(items), Some(index)) if index < items.len() => {
                Ok((position, index))
            }
            (FieldEntry::Indexed(items), Some(index)) => Err(FieldError::IndexOutOfRange {
                name: name.to_string(),
                index,
                len: items.len(),
            }),
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::resolve;
    use serde_json::json;

    fn sample_set() -> FieldSet {
        resolve(
            &[
                FieldDeclaration::new("name").value("ada"),
                FieldDeclaration::new("tags").value("t").indexed(2),
            ],
            &Value::Null,
        )
    }

    #[test]
    fn test_state_lookup_scalar_and_item() {
        let set = sample_set();
        assert_eq!(set.state(&"name".into()).unwrap().value(), &json!("ada"));
        let item = set.state(&FieldKey::item("tags", 1)).unwrap();
        assert_eq!(item.name(), "tags[1]");
        assert_eq!(item.path().as_str(), "tags");
    }

    #[test]
    fn test_state_lookup_errors() {
        let set = sample_set();
        assert_eq!(
            set.state(&"nope".into()).unwrap_err(),
            FieldError::UnknownField { name: "nope".into() }
        );
        assert_eq!(
            set.state(&FieldKey::item("name", 0)).unwrap_err(),
            FieldError::NotIndexed { name: "name".into() }
        );
        assert_eq!(
            set.state(&"tags".into()).unwrap_err(),
            FieldError::NotScalar { name: "tags".into() }
        );
        assert_eq!(
            set.state(&FieldKey::item("tags", 2)).unwrap_err(),
            FieldError::IndexOutOfRange {
                name: "tags".into(),
                index: 2,
                len: 2
            }
        );
    }

    #[test]
    fn test_keys_expand_items() {
        let keys: Vec<String> = sample_set().keys().iter().map(ToString::to_string).collect();
        assert_eq!(keys, vec!["name", "tags[0]", "tags[1]"]);
    }

    #[test]
    fn test_value_accessors() {
        let set = sample_set();
        assert_eq!(set.value("name"), Some(&json!("ada")));
        assert_eq!(set.value("tags"), None);
        assert_eq!(set.item_value("tags", 0), Some(&json!("t")));
        assert_eq!(set.item_value("name", 0), None);
    }

    #[test]
    fn test_status_and_errors_count() {
        let mut set = sample_set();
        assert_eq!(set.errors_count(), 0);
        set.state_mut(&FieldKey::item("tags", 0))
            .unwrap()
            .set_errors(vec!["a".into(), "b".into()]);
        set.state_mut(&"name".into()).unwrap().set_errors(vec!["c".into()]);
        assert_eq!(set.errors_count(), 3);
        assert_eq!(
            set.state(&"name".into()).unwrap().status(),
            FieldStatus::Invalid
        );
        assert_eq!(
            set.state(&FieldKey::item("tags", 1)).unwrap().status(),
            FieldStatus::Clean
        );
    }

    #[test]
    fn test_evaluate_uses_fallback_then_empty() {
        let decl = FieldDeclaration::new("x")
            .validator(Validator::on_value(|_| false).with_error("own"))
            .validator(Validator::on_value(|_| false));
        let set = resolve(&[decl.clone()], &Value::Null);
        let state = set.state(&"x".into()).unwrap();
        assert_eq!(state.evaluate(&set), vec!["own".to_string(), String::new()]);

        let set = resolve(&[decl.fallback_error("fallback")], &Value::Null);
        let state = set.state(&"x".into()).unwrap();
        assert_eq!(state.evaluate(&set), vec!["own", "fallback"]);
    }
}
