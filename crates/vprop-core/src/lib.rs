//! # vprop-core — Foundational Types for the Validation Engine
//!
//! This crate is the leaf of the vprop workspace. It defines the primitives
//! shared by the schema resolver (`vprop-schema`) and the state store
//! (`vprop-state`); it depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Explicit key kinds.** Every field name is classified once as
//!    [`KeyKind::Flat`] or [`KeyKind::Path`]. Lookups and nested rendering
//!    branch on that classification, never on a failed attempt.
//!
//! 2. **Addressing is a value.** [`FieldKey`] names either a scalar field or
//!    one item of an indexed field. No string parsing at call sites.
//!
//! 3. **Validation results are data.** [`ValidationOutcome`] and
//!    [`ValidateAllResult`] carry pass/fail; only misconfiguration and bad
//!    addressing surface as [`FieldError`].
//!
//! ## Crate Policy
//!
//! - No dependencies on other `vprop-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod error;
pub mod key;
pub mod outcome;
pub mod path;

pub use error::FieldError;
pub use key::FieldKey;
pub use outcome::{ErrorMap, ValidateAllResult, ValidationOutcome};
pub use path::{FieldPath, KeyKind, PathSegment, MAX_INSERT_INDEX};

/// Host input and field values are plain JSON values. `Value::Null` plays
/// the role of the absent/unit value.
pub use serde_json::Value;
