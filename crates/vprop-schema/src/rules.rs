//! # Built-in Rules
//!
//! Ready-made validators for the common cases, so declarations and form
//! documents can gate fields without hand-written closures. Every rule
//! returns a plain [`Validator`]; attach a message with
//! [`Validator::with_error`].

use vprop_core::Value;

use crate::declaration::Validator;

/// Whether a value counts as filled in. `Null`, `""`, `false`, empty arrays
/// and empty objects do not.
pub fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
        Value::Number(_) => true,
    }
}

/// Character count of a string or item count of an array.
pub fn length_of(value: &Value) -> Option<usize> {
    match value {
        Value::String(s) => Some(s.chars().count()),
        Value::Array(items) => Some(items.len()),
        _ => None,
    }
}

/// Fails unless the value [`is_present`].
pub fn required() -> Validator {
    Validator::on_value(is_present)
}

/// Fails unless the string/array length is at least `min`.
pub fn min_length(min: usize) -> Validator {
    Validator::on_value(move |value| length_of(value).is_some_and(|len| len >= min))
}

/// Fails unless the string/array length is at most `max`.
pub fn max_length(max: usize) -> Validator {
    Validator::on_value(move |value| length_of(value).is_some_and(|len| len <= max))
}

/// Fails unless the value is a number no smaller than `bound`.
pub fn min(bound: f64) -> Validator {
    Validator::on_value(move |value| value.as_f64().is_some_and(|n| n >= bound))
}

/// Fails unless the value is a number no larger than `bound`.
pub fn max(bound: f64) -> Validator {
    Validator::on_value(move |value| value.as_f64().is_some_and(|n| n <= bound))
}

/// Fails unless the value equals the current value of the scalar field
/// `other`. An unknown or indexed `other` fails.
pub fn equals_field(other: impl Into<String>) -> Validator {
    let other = other.into();
    Validator::new(move |value, fields| fields.value(&other) == Some(value))
}

/// Fails unless the value is one of `allowed`.
pub fn one_of(allowed: Vec<Value>) -> Validator {
    Validator::on_value(move |value| allowed.contains(value))
}
