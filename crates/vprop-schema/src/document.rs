//! # Form Documents
//!
//! Declarative form definitions in YAML or JSON, compiled into
//! [`FieldDeclaration`]s with validators drawn from the built-in
//! [`rules`](crate::rules).
//!
//! ```yaml
//! fields:
//!   - name: user.email
//!     initial_from_input: true
//!     error: "invalid e-mail"
//!     rules:
//!       - { rule: required, error: "e-mail is required" }
//!       - { rule: min_length, min: 3 }
//!   - name: tags
//!     list: 3
//!     rules:
//!       - { rule: max_length, max: 16 }
//! ```
//!
//! Documents only describe fields. Custom derivations and predicates that
//! need code are attached programmatically after loading.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use vprop_core::Value;

use crate::declaration::{FieldDeclaration, Validator};
use crate::rules;

/// Error while loading or compiling a form document.
#[derive(Error, Debug)]
pub enum DocumentError {
    /// The text is not a well-formed document.
    #[error("cannot parse {format} form document: {reason}")]
    Parse {
        /// `yaml` or `json`.
        format: &'static str,
        /// Parser message.
        reason: String,
    },

    /// The document file could not be read.
    #[error("cannot read form document '{path}': {source}")]
    Io {
        /// Path that failed to load.
        path: String,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// A field entry is well-formed but contradictory.
    #[error("invalid field '{name}': {reason}")]
    InvalidField {
        /// Field name as written in the document.
        name: String,
        /// What is wrong with it.
        reason: String,
    },
}

/// Root of a form document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FormDocument {
    /// Field entries, in declaration order.
    pub fields: Vec<FieldSpec>,
}

/// One field entry of a form document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldSpec {
    /// Field name; may be a dot-path.
    pub name: String,
    /// Literal initial value. An explicit `null` is kept as `null`.
    #[serde(default, deserialize_with = "present_value", skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    /// Take the initial value from the host input by name.
    #[serde(default)]
    pub initial_from_input: bool,
    /// Re-derive the value from the host input on every update.
    #[serde(default)]
    pub sync_from_input: bool,
    /// Number of items when the field is a list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list: Option<usize>,
    /// Host change handler for an external field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external: Option<String>,
    /// Fallback error message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Validation rules, in order.
    #[serde(default)]
    pub rules: Vec<RuleSpec>,
}

/// A built-in rule with its parameters and optional message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum RuleSpec {
    /// See [`rules::required`].
    Required {
        #[serde(default)]
        error: Option<String>,
    },
    /// See [`rules::min_length`].
    MinLength {
        min: usize,
        #[serde(default)]
        error: Option<String>,
    },
    /// See [`rules::max_length`].
    MaxLength {
        max: usize,
        #[serde(default)]
        error: Option<String>,
    },
    /// See [`rules::min`].
    Min {
        value: f64,
        #[serde(default)]
        error: Option<String>,
    },
    /// See [`rules::max`].
    Max {
        value: f64,
        #[serde(default)]
        error: Option<String>,
    },
    /// See [`rules::equals_field`].
    EqualsField {
        field: String,
        #[serde(default)]
        error: Option<String>,
    },
    /// See [`rules::one_of`].
    OneOf {
        values: Vec<Value>,
        #[serde(default)]
        error: Option<String>,
    },
}

fn present_value<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl RuleSpec {
    /// Build the validator this rule describes.
    pub fn to_validator(&self) -> Validator {
        let (validator, error) = match self {
            Self::Required { error } => (rules::required(), error),
            Self::MinLength { min, error } => (rules::min_length(*min), error),
            Self::MaxLength { max, error } => (rules::max_length(*max), error),
            Self::Min { value, error } => (rules::min(*value), error),
            Self::Max { value, error } => (rules::max(*value), error),
            Self::EqualsField { field, error } => (rules::equals_field(field.as_str()), error),
            Self::OneOf { values, error } => (rules::one_of(values.clone()), error),
        };
        match error {
            Some(message) => validator.with_error(message.as_str()),
            None => validator,
        }
    }
}

impl FieldSpec {
    /// Compile this entry into a declaration.
    pub fn to_declaration(&self) -> Result<FieldDeclaration, DocumentError> {
        if self.name.trim().is_empty() {
            return Err(self.invalid("field name must not be empty"));
        }
        if self.external.is_some() && self.list.is_some() {
            return Err(self.invalid("a list field cannot be external"));
        }
        if self.external.is_some() && self.sync_from_input {
            return Err(self.invalid("an external field is always read from input; drop sync_from_input"));
        }

        let mut decl = FieldDeclaration::new(self.name.as_str())
            .validators(self.rules.iter().map(RuleSpec::to_validator));
        decl.initial_value = self.value.clone();
        if self.initial_from_input {
            decl = decl.initial_from_input();
        }
        if self.sync_from_input {
            decl = decl.sync_from_input();
        }
        if let Some(len) = self.list {
            decl = decl.indexed(len);
        }
        if let Some(handler) = &self.external {
            decl = decl.external(handler.as_str());
        }
        if let Some(error) = &self.error {
            decl = decl.fallback_error(error.as_str());
        }
        Ok(decl)
    }

    fn invalid(&self, reason: &str) -> DocumentError {
        DocumentError::InvalidField {
            name: self.name.clone(),
            reason: reason.to_string(),
        }
    }
}

impl FormDocument {
    /// Parse a YAML document.
    pub fn from_yaml_str(text: &str) -> Result<Self, DocumentError> {
        serde_yaml::from_str(text).map_err(|e| DocumentError::Parse {
            format: "yaml",
            reason: e.to_string(),
        })
    }

    /// Parse a JSON document.
    pub fn from_json_str(text: &str) -> Result<Self, DocumentError> {
        serde_json::from_str(text).map_err(|e| DocumentError::Parse {
            format: "json",
            reason: e.to_string(),
        })
    }

    /// Load a document from disk. `.json` files are parsed as JSON,
    /// everything else as YAML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DocumentError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| DocumentError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        tracing::debug!(path = %path.display(), is_json, "loading form document");
        if is_json {
            Self::from_json_str(&text)
        } else {
            Self::from_yaml_str(&text)
        }
    }

    /// Compile every entry, rejecting duplicate names.
    pub fn to_declarations(&self) -> Result<Vec<FieldDeclaration>, DocumentError> {
        let mut seen = HashSet::new();
        self.fields
            .iter()
            .map(|spec| {
                if !seen.insert(spec.name.as_str()) {
                    return Err(spec.invalid("declared more than once"));
                }
                spec.to_declaration()
            })
            .collect()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::declaration::FieldShape;
    use crate::resolve::resolve;
    use serde_json::json;
    use std::io::Write;

    const SIGNUP_YAML: &str = r#"
fields:
  - name: user.email
    initial_from_input: true
    error: "invalid e-mail"
    rules:
      - { rule: required, error: "e-mail is required" }
      - { rule: min_length, min: 3 }
  - name: age
    value: 0
    rules:
      - { rule: min, value: 18, error: "must be an adult" }
  - name: nickname
    value: null
  - name: tags
    list: 2
    value: ""
  - name: country
    external: onCountryChange
"#;

    #[test]
    fn test_parse_yaml_document() {
        let doc = FormDocument::from_yaml_str(SIGNUP_YAML).unwrap();
        assert_eq!(doc.fields.len(), 5);
        assert_eq!(doc.fields[0].rules.len(), 2);
        assert_eq!(
            doc.fields[1].rules[0],
            RuleSpec::Min {
                value: 18.0,
                error: Some("must be an adult".into())
            }
        );
        assert_eq!(doc.fields[2].value, Some(Value::Null));
        assert_eq!(doc.fields[4].value, None);
    }

    #[test]
    fn test_compile_and_resolve() {
        let doc = FormDocument::from_yaml_str(SIGNUP_YAML).unwrap();
        let decls = doc.to_declarations().unwrap();
        assert_eq!(decls[3].shape, FieldShape::Indexed { len: 2 });
        assert_eq!(
            decls[4].external.as_ref().map(|b| b.change_handler.as_str()),
            Some("onCountryChange")
        );

        let input = json!({"user": {"email": "ab"}, "country": "NO"});
        let fields = resolve(&decls, &input);
        assert_eq!(fields.value("user.email"), Some(&json!("ab")));
        assert_eq!(fields.value("nickname"), Some(&Value::Null));
        assert_eq!(fields.value("country"), Some(&json!("NO")));

        let email = fields.state(&"user.email".into()).unwrap();
        assert_eq!(email.evaluate(&fields), vec!["invalid e-mail"]);
        let age = fields.state(&"age".into()).unwrap();
        assert_eq!(age.evaluate(&fields), vec!["must be an adult"]);
    }

    #[test]
    fn test_parse_json_document() {
        let doc = FormDocument::from_json_str(
            r#"{"fields": [{"name": "confirm", "rules": [{"rule": "equals_field", "field": "password"}]}]}"#,
        )
        .unwrap();
        assert_eq!(
            doc.fields[0].rules[0],
            RuleSpec::EqualsField {
                field: "password".into(),
                error: None
            }
        );
    }

    #[test]
    fn test_unknown_rule_is_parse_error() {
        let err = FormDocument::from_yaml_str("fields:\n  - name: a\n    rules:\n      - { rule: regex }\n")
            .unwrap_err();
        assert!(matches!(err, DocumentError::Parse { format: "yaml", .. }));
    }

    #[test]
    fn test_unknown_field_key_is_parse_error() {
        let err = FormDocument::from_json_str(r#"{"fields": [{"name": "a", "colour": 1}]}"#)
            .unwrap_err();
        assert!(matches!(err, DocumentError::Parse { format: "json", .. }));
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let doc = FormDocument::from_yaml_str("fields:\n  - name: a\n  - name: a\n").unwrap();
        let err = doc.to_declarations().unwrap_err();
        assert!(matches!(err, DocumentError::InvalidField { ref name, .. } if name == "a"));
    }

    #[test]
    fn test_external_list_rejected() {
        let doc =
            FormDocument::from_yaml_str("fields:\n  - name: a\n    list: 2\n    external: h\n")
                .unwrap();
        assert!(doc.to_declarations().is_err());
    }

    #[test]
    fn test_load_by_extension() {
        let dir = tempfile::tempdir().unwrap();

        let yaml_path = dir.path().join("form.yaml");
        std::fs::File::create(&yaml_path)
            .unwrap()
            .write_all(SIGNUP_YAML.as_bytes())
            .unwrap();
        assert_eq!(FormDocument::load(&yaml_path).unwrap().fields.len(), 5);

        let json_path = dir.path().join("form.JSON");
        std::fs::write(&json_path, r#"{"fields": [{"name": "a"}]}"#).unwrap();
        assert_eq!(FormDocument::load(&json_path).unwrap().fields.len(), 1);
    }

    #[test]
    fn test_load_missing_file() {
        let err = FormDocument::load("/definitely/not/here.yaml").unwrap_err();
        assert!(matches!(err, DocumentError::Io { .. }));
    }
}
