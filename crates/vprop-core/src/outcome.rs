//! # Validation Outcomes
//!
//! The data returned by `validate` and `validate_all`. Expected failures
//! travel here, never through `Result::Err`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Failing fields and their error lists, keyed by field name (`name[i]`
/// for items of indexed fields). Keys iterate and serialize in sorted
/// order, not in declaration order.
pub type ErrorMap = BTreeMap<String, Vec<String>>;

/// Result of validating one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationOutcome {
    /// True when no validator failed.
    pub is_valid: bool,
    /// The produced messages, in validator order. `None` when valid.
    pub errors: Option<Vec<String>>,
}

impl ValidationOutcome {
    /// Outcome of a pass with no failures.
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            errors: None,
        }
    }

    /// Build an outcome from the messages produced by a validation pass.
    pub fn from_errors(errors: Vec<String>) -> Self {
        if errors.is_empty() {
            Self::valid()
        } else {
            Self {
                is_valid: false,
                errors: Some(errors),
            }
        }
    }

    /// The produced messages; empty when valid.
    pub fn messages(&self) -> &[String] {
        self.errors.as_deref().unwrap_or(&[])
    }
}

/// Aggregate result of validating every field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidateAllResult {
    /// Logical AND of every field outcome.
    pub is_valid: bool,
    /// Failing fields only. `None` when everything passed.
    pub errors: Option<ErrorMap>,
}

impl ValidateAllResult {
    /// Build the aggregate from the failures collected during a pass.
    pub fn from_failures(failures: ErrorMap) -> Self {
        if failures.is_empty() {
            Self {
                is_valid: true,
                errors: None,
            }
        } else {
            Self {
                is_valid: false,
                errors: Some(failures),
            }
        }
    }

    /// Names of the failing fields, sorted by name regardless of the order
    /// the fields were declared in.
    pub fn failing_fields(&self) -> Vec<&str> {
        self.errors
            .iter()
            .flat_map(|errors| errors.keys().map(String::as_str))
            .collect()
    }

    /// Errors recorded for one failing field.
    pub fn errors_for(&self, name: &str) -> Option<&[String]> {
        self.errors
            .as_ref()
            .and_then(|errors| errors.get(name))
            .map(Vec::as_slice)
    }
}
