//! # Error Types
//!
//! Field-level errors shared by every crate that addresses fields. All
//! errors use `thiserror` for derive-based `Display` and `Error`.
//!
//! ## Design
//!
//! - A failing validator is never an error. It is returned as data.
//! - Addressing mistakes (unknown name, wrong shape, bad index) are errors
//!   the host can recover from.
//! - A missing external change handler is a wiring defect in the host and
//!   is reported instead of silently ignoring the change.

use thiserror::Error;

/// Error raised when a field operation cannot be carried out.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    /// No field with this name exists in the store.
    #[error("unknown field '{name}'")]
    UnknownField {
        /// The requested field name.
        name: String,
    },

    /// An item index was given for a scalar field.
    #[error("field '{name}' is not indexed")]
    NotIndexed {
        /// The scalar field name.
        name: String,
    },

    /// An indexed field was addressed without an item index.
    #[error("field '{name}' is indexed; address one of its items")]
    NotScalar {
        /// The indexed field name.
        name: String,
    },

    /// The item index is past the end of an indexed field.
    #[error("index {index} out of range for field '{name}' with {len} items")]
    IndexOutOfRange {
        /// The indexed field name.
        name: String,
        /// The requested item index.
        index: usize,
        /// Number of items in the field.
        len: usize,
    },

    /// An external field was changed but the host never registered the
    /// change handler the field is bound to.
    #[error("external field '{field}' has no change handler '{handler}' registered by the host")]
    MisconfiguredExternalField {
        /// The external field name.
        field: String,
        /// The handler name the declaration expects.
        handler: String,
    },
}

impl FieldError {
    /// Name of the field the error refers to.
    pub fn field_name(&self) -> &str {
        match self {
            Self::UnknownField { name }
            | Self::NotIndexed { name }
            | Self::NotScalar { name }
            | Self::IndexOutOfRange { name, .. } => name,
            Self::MisconfiguredExternalField { field, .. } => field,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = FieldError::UnknownField { name: "age".into() };
        assert_eq!(err.to_string(), "unknown field 'age'");

        let err = FieldError::IndexOutOfRange {
            name: "tags".into(),
            index: 4,
            len: 3,
        };
        assert_eq!(
            err.to_string(),
            "index 4 out of range for field 'tags' with 3 items"
        );
    }

    #[test]
    fn test_field_name() {
        let err = FieldError::MisconfiguredExternalField {
            field: "email".into(),
            handler: "onEmailChange".into(),
        };
        assert_eq!(err.field_name(), "email");
        assert!(err.to_string().contains("onEmailChange"));
    }
}
