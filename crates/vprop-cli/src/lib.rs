//! # vprop-cli — Command-Line Host for the Validation Engine
//!
//! A host in the engine's sense: it loads a form document, supplies the
//! host input, drives the store and prints what the store reports. The
//! engine crates know nothing about files or terminals; everything of that
//! kind lives here.
//!
//! ## Subcommands
//!
//! - `vprop check`: apply `--set` assignments, validate every field,
//!   print the aggregate result. Exit code 2 when invalid.
//! - `vprop inspect`: print the store snapshot, optionally after a
//!   validation pass.
//!
//! ```bash
//! vprop check signup.yaml --input host.json --set email=a@b --set 'tags[0]=rust'
//! vprop inspect signup.yaml --input host.json --validate
//! ```

pub mod check;
pub mod inspect;

use std::path::Path;

use anyhow::{bail, Context, Result};
use vprop_core::{FieldKey, FieldPath, Value};
use vprop_schema::{FieldEntry, FieldSet, FormDocument};
use vprop_state::{ImmediateNotifier, Store, StoreBuilder};

/// Exit code for a run whose form did not validate.
pub const EXIT_INVALID: u8 = 2;

/// Read host input from a JSON file, or `Value::Null` when none is given.
pub fn read_input(path: Option<&Path>) -> Result<Value> {
    let Some(path) = path else {
        return Ok(Value::Null);
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading host input: {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing host input JSON: {}", path.display()))
}

/// Load a form document and build a store over `input`.
///
/// External fields get a change handler that only logs the request: this
/// host applies external values by rewriting its input instead (see
/// [`apply_assignment`]).
pub fn load_store(schema: &Path, input: Value) -> Result<Store> {
    let document = FormDocument::load(schema)
        .with_context(|| format!("loading form document: {}", schema.display()))?;

    let mut builder = StoreBuilder::new().input(input);
    for spec in &document.fields {
        if let Some(handler) = &spec.external {
            let field = spec.name.clone();
            builder = builder.change_handler(handler.as_str(), move |value| {
                tracing::info!(%field, %value, "external change requested");
            });
        }
    }
    let builder = builder.document(&document)?;
    Ok(builder.build(ImmediateNotifier::new()))
}

/// Split `name=value`. The value is parsed as JSON when possible and taken
/// as a plain string otherwise, so `age=3` sets a number and `name=ada` a
/// string.
pub fn parse_assignment(raw: &str) -> Result<(String, Value)> {
    let Some((name, value)) = raw.split_once('=') else {
        bail!("expected NAME=VALUE, got '{raw}'");
    };
    let name = name.trim();
    if name.is_empty() {
        bail!("empty field name in '{raw}'");
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((name.to_string(), value))
}

/// Turn a command-line field reference into a key. A declared name always
/// wins; otherwise a trailing `[i]` addresses an item of an indexed field.
pub fn resolve_key(fields: &FieldSet, raw: &str) -> Result<FieldKey> {
    if fields.entry(raw).is_some() {
        return Ok(FieldKey::new(raw));
    }
    if let Some((name, index)) = split_item(raw) {
        if let Some(FieldEntry::Indexed(_)) = fields.entry(name) {
            return Ok(FieldKey::item(name, index));
        }
    }
    bail!("unknown field '{raw}'")
}

fn split_item(raw: &str) -> Option<(&str, usize)> {
    let open = raw.rfind('[')?;
    let index = raw.strip_suffix(']')?.get(open + 1..)?.parse().ok()?;
    Some((&raw[..open], index))
}

/// Apply one assignment the way a host would: local fields through
/// `change`, external fields by rewriting the host input and handing it to
/// `update_input`.
pub fn apply_assignment(store: &mut Store, name: &str, value: Value) -> Result<()> {
    let key = resolve_key(store.fields(), name)?;
    let external = store.fields().state(&key)?.external().is_some();
    if external {
        let mut input = store.input().clone();
        FieldPath::parse(key.name()).insert(&mut input, value);
        store.update_input(input);
    } else {
        store.change(key, value)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use vprop_schema::{resolve, FieldDeclaration};

    #[test]
    fn parse_assignment_json_and_string() {
        assert_eq!(parse_assignment("age=3").unwrap(), ("age".to_string(), json!(3)));
        assert_eq!(parse_assignment("ok=true").unwrap().1, json!(true));
        assert_eq!(parse_assignment("name=ada").unwrap().1, json!("ada"));
        assert_eq!(parse_assignment("name=").unwrap().1, json!(""));
        assert_eq!(parse_assignment("expr=a=b").unwrap().1, json!("a=b"));
    }

    #[test]
    fn parse_assignment_rejects_malformed() {
        assert!(parse_assignment("novalue").is_err());
        assert!(parse_assignment("=3").is_err());
    }

    #[test]
    fn resolve_key_prefers_declared_names() {
        let fields = resolve(
            &[
                FieldDeclaration::new("a[0].b"),
                FieldDeclaration::new("tags").indexed(2),
                FieldDeclaration::new("name"),
            ],
            &Value::Null,
        );
        assert_eq!(resolve_key(&fields, "a[0].b").unwrap(), FieldKey::new("a[0].b"));
        assert_eq!(resolve_key(&fields, "tags[1]").unwrap(), FieldKey::item("tags", 1));
        assert_eq!(resolve_key(&fields, "tags").unwrap(), FieldKey::new("tags"));
        assert!(resolve_key(&fields, "name[0]").is_err());
        assert!(resolve_key(&fields, "missing").is_err());
    }

    #[test]
    fn read_input_defaults_to_null() {
        assert_eq!(read_input(None).unwrap(), Value::Null);
    }

    #[test]
    fn external_assignment_rewrites_input() {
        let dir = tempfile::tempdir().unwrap();
        let schema = dir.path().join("form.yaml");
        std::fs::write(
            &schema,
            "fields:\n  - name: profile.title\n    external: onTitle\n  - name: note\n",
        )
        .unwrap();

        let mut store = load_store(&schema, json!({"profile": {"title": "old"}})).unwrap();
        apply_assignment(&mut store, "profile.title", json!("new")).unwrap();
        apply_assignment(&mut store, "note", json!("n")).unwrap();

        assert_eq!(store.input(), &json!({"profile": {"title": "new"}}));
        assert_eq!(store.value("profile.title").unwrap(), &json!("new"));
        assert_eq!(store.value("note").unwrap(), &json!("n"));
    }

    #[test]
    fn external_assignment_with_huge_index() {
        let dir = tempfile::tempdir().unwrap();
        let schema = dir.path().join("form.yaml");
        std::fs::write(&schema, "fields:\n  - name: slot[99999999999]\n    external: onSlot\n").unwrap();

        let mut store = load_store(&schema, Value::Null).unwrap();
        apply_assignment(&mut store, "slot[99999999999]", json!("far")).unwrap();

        assert_eq!(store.input(), &json!({"slot": {"99999999999": "far"}}));
        assert_eq!(store.value("slot[99999999999]").unwrap(), &json!("far"));
        assert_eq!(store.snapshot().to_value()["slot"]["99999999999"]["value"], json!("far"));
    }
}
