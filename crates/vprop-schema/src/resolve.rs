//! # Schema Resolution
//!
//! Turns declarations plus the host input into the initial [`FieldSet`].
//!
//! ## Initial value rules
//!
//! 1. External scalar fields always read the host input by name.
//! 2. `initial_value_source = ByName` looks up the input at the dot-path
//!    equal to the field name; a missing path gives `Null`.
//! 3. `initial_value_source = ByFn(f)` gives `f(input)`.
//! 4. Otherwise the literal `initial_value`, or `""` when it is unset.
//!
//! Resolution is pure and cannot fail.

use vprop_core::{FieldKey, FieldPath, Value};

use crate::declaration::{FieldDeclaration, FieldShape, Generator};
use crate::field::{FieldEntry, FieldSet, FieldState};

/// Value used when a declaration sets neither a literal nor a source.
///
/// This is the empty string regardless of the field's intended type.
pub fn default_value() -> Value {
    Value::String(String::new())
}

/// Resolve static declarations against the host input.
pub fn resolve(declarations: &[FieldDeclaration], input: &Value) -> FieldSet {
    let mut fields = FieldSet::new();
    for decl in declarations {
        resolve_into(&mut fields, decl, input);
    }
    fields
}

/// Resolve static declarations followed by the generator's declarations.
///
/// The generator runs exactly once, with the same input.
pub fn resolve_with_generator(
    declarations: &[FieldDeclaration],
    generator: Option<&Generator>,
    input: &Value,
) -> FieldSet {
    let mut fields = resolve(declarations, input);
    for decl in &dynamic_declarations(generator, input) {
        resolve_into(&mut fields, decl, input);
    }
    fields
}

/// Declarations produced by an optional generator; empty when absent.
pub fn dynamic_declarations(generator: Option<&Generator>, input: &Value) -> Vec<FieldDeclaration> {
    match generator {
        Some(generate) => {
            let generated = generate(input);
            tracing::debug!(count = generated.len(), "generated dynamic declarations");
            generated
        }
        None => Vec::new(),
    }
}

/// Initial value of a declaration at `path` for the given input.
pub fn initial_value(decl: &FieldDeclaration, path: &FieldPath, input: &Value) -> Value {
    if decl.external.is_some() && matches!(decl.shape, FieldShape::Scalar) {
        return path.lookup(input);
    }
    match &decl.initial_value_source {
        Some(source) => source.derive(path, input),
        None => decl.initial_value.clone().unwrap_or_else(default_value),
    }
}

fn resolve_into(fields: &mut FieldSet, decl: &FieldDeclaration, input: &Value) {
    let path = FieldPath::parse(&decl.name);
    let value = initial_value(decl, &path, input);

    let entry = match decl.shape {
        FieldShape::Scalar => {
            let key = FieldKey::new(decl.name.as_str());
            FieldEntry::Scalar(FieldState::from_declaration(decl, key, path, value))
        }
        FieldShape::Indexed { len } => {
            if decl.external.is_some() {
                tracing::warn!(field = %decl.name, "external binding ignored on indexed field");
            }
            let items = (0..len)
                .map(|index| {
                    let key = FieldKey::item(decl.name.as_str(), index);
                    FieldState::from_declaration(decl, key, path.clone(), value.clone())
                        .without_external()
                })
                .collect();
            FieldEntry::Indexed(items)
        }
    };

    if fields.upsert(decl.name.clone(), entry) {
        tracing::warn!(field = %decl.name, "duplicate declaration replaced earlier one");
    }
}

// ─── Tests ───────────────────────────────────────────────────────────
