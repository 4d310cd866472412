//! Integration test: every form document under `tests/forms/` loads,
//! compiles and resolves against a representative host input.

use std::path::{Path, PathBuf};

use serde_json::json;
use vprop_core::{FieldKey, Value};
use vprop_schema::{resolve, FieldEntry, FormDocument};

fn forms_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests").join("forms")
}

fn find_forms(dir: &Path) -> Vec<PathBuf> {
    let mut forms: Vec<PathBuf> = std::fs::read_dir(dir)
        .map(|entries| {
            entries
                .flatten()
                .map(|entry| entry.path())
                .filter(|path| {
                    path.extension()
                        .is_some_and(|ext| ext == "yaml" || ext == "json")
                })
                .collect()
        })
        .unwrap_or_default();
    forms.sort();
    forms
}

#[test]
fn test_discover_bundled_forms() {
    assert_eq!(find_forms(&forms_dir()).len(), 2);
}

#[test]
fn test_all_bundled_forms_compile() {
    let mut failures = Vec::new();
    for path in find_forms(&forms_dir()) {
        let result = FormDocument::load(&path).and_then(|doc| doc.to_declarations());
        if let Err(e) = result {
            failures.push(format!("{}: {e}", path.display()));
        }
    }
    assert!(failures.is_empty(), "forms failed to compile:\n{}", failures.join("\n"));
}

#[test]
fn test_signup_resolves_against_input() {
    let doc = FormDocument::load(forms_dir().join("signup.yaml")).unwrap();
    let fields = resolve(
        &doc.to_declarations().unwrap(),
        &json!({"user": {"email": "ada@example.com"}, "nickname": "ada"}),
    );

    let names: Vec<&str> = fields.names().collect();
    assert_eq!(
        names,
        vec!["user.email", "password", "confirm_password", "age", "plan", "nickname"]
    );
    assert_eq!(fields.value("user.email"), Some(&json!("ada@example.com")));
    assert_eq!(fields.value("age"), Some(&json!(0)));
    assert_eq!(fields.value("nickname"), Some(&json!("ada")));
    assert!(fields.state(&"nickname".into()).unwrap().external().is_some());

    let age = fields.state(&"age".into()).unwrap();
    assert_eq!(age.evaluate(&fields), vec!["must be an adult"]);
    let plan = fields.state(&"plan".into()).unwrap();
    assert!(plan.evaluate(&fields).is_empty());
}

#[test]
fn test_contacts_expands_list_items() {
    let doc = FormDocument::load(forms_dir().join("contacts.json")).unwrap();
    let fields = resolve(&doc.to_declarations().unwrap(), &Value::Null);

    assert!(matches!(fields.entry("phones"), Some(FieldEntry::Indexed(items)) if items.len() == 3));
    assert_eq!(fields.value("owner"), Some(&Value::Null));
    assert_eq!(fields.value("note"), Some(&Value::Null));

    let item = fields.state(&FieldKey::item("phones", 2)).unwrap();
    assert_eq!(item.name(), "phones[2]");
    assert_eq!(item.evaluate(&fields), vec!["invalid phone"]);
}
