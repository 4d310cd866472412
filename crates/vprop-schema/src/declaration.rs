//! # Field Declarations
//!
//! Static description of a field before a live store exists: its name,
//! where its initial value comes from, whether host-input updates re-derive
//! it, and the ordered validators that gate it.
//!
//! Declarations are cheap to clone. Predicates and derivations are shared
//! behind `Arc`, so an indexed field can hand the same validators to every
//! item.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use vprop_core::{FieldPath, Value};

use crate::field::FieldSet;

/// Validator predicate: `(value, all field states) -> passed`.
pub type Predicate = Arc<dyn Fn(&Value, &FieldSet) -> bool + Send + Sync>;

/// Custom derivation of a value from host input.
pub type Derivation = Arc<dyn Fn(&Value) -> Value + Send + Sync>;

/// Produces additional declarations from the construction-time host input.
pub type Generator = Arc<dyn Fn(&Value) -> Vec<FieldDeclaration> + Send + Sync>;

/// A predicate plus the message reported when it fails.
#[derive(Clone)]
pub struct Validator {
    predicate: Predicate,
    error: Option<String>,
}

impl std::fmt::Debug for Validator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Validator")
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}

impl Validator {
    /// Validator whose predicate may read sibling fields.
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&Value, &FieldSet) -> bool + Send + Sync + 'static,
    {
        Self {
            predicate: Arc::new(predicate),
            error: None,
        }
    }

    /// Validator that only looks at the field's own value.
    pub fn on_value<F>(predicate: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        Self::new(move |value, _| predicate(value))
    }

    /// Attach the message reported when this validator fails.
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    /// The validator's own message, if any.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Run the predicate.
    pub fn check(&self, value: &Value, fields: &FieldSet) -> bool {
        (self.predicate)(value, fields)
    }
}

/// Where a value is derived from when it comes from host input.
#[derive(Clone)]
pub enum ValueSource {
    /// Look up the host input at the dot-path equal to the field name.
    ///
    /// A dotted name is always walked segment by segment, so an input
    /// object holding the literal key `"a.b"` does not supply the field
    /// `a.b`. Hosts that use such keys should derive with
    /// [`ValueSource::ByFn`].
    ByName,
    /// Apply a custom function to the whole host input.
    ByFn(Derivation),
}

impl std::fmt::Debug for ValueSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ByName => f.write_str("ByName"),
            Self::ByFn(_) => f.write_str("ByFn(..)"),
        }
    }
}

impl ValueSource {
    /// Wrap a derivation function.
    pub fn from_fn<F>(derive: F) -> Self
    where
        F: Fn(&Value) -> Value + Send + Sync + 'static,
    {
        Self::ByFn(Arc::new(derive))
    }

    /// Derive the value for the field at `path` from `input`. Missing paths
    /// yield `Value::Null`.
    pub fn derive(&self, path: &FieldPath, input: &Value) -> Value {
        match self {
            Self::ByName => path.lookup(input),
            Self::ByFn(derive) => derive(input),
        }
    }
}

/// Binds a field to host input: its value is read by name from the input,
/// and changes are delegated to the host's handler of the given name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExternalBinding {
    /// Name of the host change handler.
    pub change_handler: String,
}

/// Scalar field or fixed-length list of independently validated items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FieldShape {
    /// One value.
    #[default]
    Scalar,
    /// `len` items, each with its own value and errors.
    Indexed {
        /// Number of items.
        len: usize,
    },
}

/// Static description of one field.
#[derive(Debug, Clone)]
pub struct FieldDeclaration {
    /// Unique field name; may be a dot-path into the host input.
    pub name: String,
    /// Literal initial value. `None` falls back to the empty string.
    pub initial_value: Option<Value>,
    /// Derive the initial value from host input instead of the literal.
    pub initial_value_source: Option<ValueSource>,
    /// Re-derive the value whenever the host input changes.
    pub sync_source: Option<ValueSource>,
    /// Validators, run in order.
    pub validators: Vec<Validator>,
    /// Message used when a failing validator has none.
    pub fallback_error: Option<String>,
    /// Scalar or indexed.
    pub shape: FieldShape,
    /// Host-owned value with a delegated change handler.
    pub external: Option<ExternalBinding>,
}

impl FieldDeclaration {
    /// Declare a scalar field with no validators and the default value.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            initial_value: None,
            initial_value_source: None,
            sync_source: None,
            validators: Vec::new(),
            fallback_error: None,
            shape: FieldShape::Scalar,
            external: None,
        }
    }

    /// Literal initial value.
    pub fn value(mut self, value: impl Into<Value>) -> Self {
        self.initial_value = Some(value.into());
        self
    }

    /// Initial value looked up in the host input by field name.
    pub fn initial_from_input(mut self) -> Self {
        self.initial_value_source = Some(ValueSource::ByName);
        self
    }

    /// Initial value computed from the host input.
    pub fn initial_from<F>(mut self, derive: F) -> Self
    where
        F: Fn(&Value) -> Value + Send + Sync + 'static,
    {
        self.initial_value_source = Some(ValueSource::from_fn(derive));
        self
    }

    /// Keep the value in sync with the host input, by field name.
    pub fn sync_from_input(mut self) -> Self {
        self.sync_source = Some(ValueSource::ByName);
        self
    }

    /// Keep the value in sync with a derivation of the host input.
    pub fn sync_from<F>(mut self, derive: F) -> Self
    where
        F: Fn(&Value) -> Value + Send + Sync + 'static,
    {
        self.sync_source = Some(ValueSource::from_fn(derive));
        self
    }

    /// Append a validator.
    pub fn validator(mut self, validator: Validator) -> Self {
        self.validators.push(validator);
        self
    }

    /// Append several validators, keeping their order.
    pub fn validators(mut self, validators: impl IntoIterator<Item = Validator>) -> Self {
        self.validators.extend(validators);
        self
    }

    /// Message used when a failing validator supplies none.
    pub fn fallback_error(mut self, error: impl Into<String>) -> Self {
        self.fallback_error = Some(error.into());
        self
    }

    /// Expand into `len` independently validated items.
    pub fn indexed(mut self, len: usize) -> Self {
        self.shape = FieldShape::Indexed { len };
        self
    }

    /// Make the field host-owned, delegating changes to `change_handler`.
    pub fn external(mut self, change_handler: impl Into<String>) -> Self {
        self.external = Some(ExternalBinding {
            change_handler: change_handler.into(),
        });
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builder_defaults() {
        let decl = FieldDeclaration::new("age");
        assert_eq!(decl.name, "age");
        assert!(decl.initial_value.is_none());
        assert!(decl.validators.is_empty());
        assert_eq!(decl.shape, FieldShape::Scalar);
        assert!(decl.external.is_none());
    }

    #[test]
    fn test_builder_chain() {
        let decl = FieldDeclaration::new("tags")
            .value("x")
            .indexed(3)
            .validator(Validator::on_value(|v| v.is_string()).with_error("string"))
            .fallback_error("bad");
        assert_eq!(decl.initial_value, Some(json!("x")));
        assert_eq!(decl.shape, FieldShape::Indexed { len: 3 });
        assert_eq!(decl.validators.len(), 1);
        assert_eq!(decl.validators[0].error(), Some("string"));
        assert_eq!(decl.fallback_error.as_deref(), Some("bad"));
    }

    #[test]
    fn test_value_source_by_name_and_fn() {
        let input = json!({"profile": {"age": 41}});
        let path = FieldPath::parse("profile.age");
        assert_eq!(ValueSource::ByName.derive(&path, &input), json!(41));

        let doubled = ValueSource::from_fn(|input| {
            json!(input["profile"]["age"].as_i64().unwrap_or(0) * 2)
        });
        assert_eq!(doubled.derive(&path, &input), json!(82));
    }

    #[test]
    fn test_on_value_ignores_siblings() {
        let validator = Validator::on_value(|v| v.as_i64() == Some(1));
        let fields = FieldSet::default();
        assert!(validator.check(&json!(1), &fields));
        assert!(!validator.check(&json!(2), &fields));
    }
}
