//! # vprop-schema — Property Schema Resolution
//!
//! Turns a static list of field declarations, plus an optional generator of
//! dynamic declarations, into the concrete [`FieldSet`] a store starts from.
//!
//! ## Declarations (`declaration`)
//!
//! [`FieldDeclaration`] describes one field: a literal initial value or a
//! [`ValueSource`] deriving it from host input, an optional sync source,
//! ordered [`Validator`]s, a fallback error message, the field's shape
//! (scalar or indexed) and an optional [`ExternalBinding`].
//!
//! ## Resolution (`resolve`)
//!
//! - [`resolve`]: declarations × host input → [`FieldSet`].
//! - [`resolve_with_generator`]: same, with generated declarations
//!   appended after the static ones. The generator runs once.
//!
//! Resolution is pure. A missing lookup path is not an error; it yields
//! `Value::Null`.
//!
//! ## Rules and documents
//!
//! [`rules`] holds ready-made validators. [`FormDocument`] loads field
//! declarations from YAML or JSON and compiles them against those rules.
//!
//! ## Crate Policy
//!
//! - Depends only on `vprop-core` internally.
//! - Predicates are opaque closures; this crate never inspects them.

pub mod declaration;
pub mod document;
pub mod field;
pub mod resolve;
pub mod rules;

pub use declaration::{
    Derivation, ExternalBinding, FieldDeclaration, FieldShape, Generator, Predicate, Validator,
    ValueSource,
};
pub use document::{DocumentError, FieldSpec, FormDocument, RuleSpec};
pub use field::{FieldEntry, FieldSet, FieldState, FieldStatus};
pub use resolve::{default_value, dynamic_declarations, initial_value, resolve, resolve_with_generator};
