//! # State Snapshots
//!
//! A [`StoreSnapshot`] is a fresh, detached copy of the canonical state
//! handed to the host for display. Every entry is explicitly tagged: a
//! field entry ([`SnapshotEntry::Field`]) or the aggregate validator entry
//! ([`SnapshotEntry::Validator`]), so the host never has to guess which is
//! which from the shape of the data.
//!
//! When one field name is a path prefix of another (`user` and
//! `user.name`), nesting both would lose one of them. Such names are
//! rendered flat under their raw name instead.

use serde::{Deserialize, Serialize};
use serde_json::Map;
use vprop_core::{FieldKey, FieldPath, Value};
use vprop_schema::{FieldEntry, FieldSet, FieldState};

/// Name of the aggregate validator entry.
pub const VALIDATOR_ENTRY: &str = "validator";

/// Displayable part of one field state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldView {
    /// Current value.
    pub value: Value,
    /// Current errors.
    pub errors: Vec<String>,
}

impl From<&FieldState> for FieldView {
    fn from(state: &FieldState) -> Self {
        Self {
            value: state.value().clone(),
            errors: state.errors().to_vec(),
        }
    }
}

/// Snapshot of one declared field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldSnapshot {
    /// Scalar field.
    Scalar(FieldView),
    /// Indexed field, one view per item.
    Indexed(Vec<FieldView>),
}

impl From<&FieldEntry> for FieldSnapshot {
    fn from(entry: &FieldEntry) -> Self {
        match entry {
            FieldEntry::Scalar(state) => Self::Scalar(state.into()),
            FieldEntry::Indexed(items) => Self::Indexed(items.iter().map(FieldView::from).collect()),
        }
    }
}

/// The aggregate validator entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorSnapshot {
    /// Sum of all current error-list lengths at snapshot time.
    pub errors_count: usize,
}

/// One entry of a snapshot.
#[derive(Debug, Clone, PartialEq)]
pub enum SnapshotEntry {
    /// A declared field.
    Field {
        /// Where the field renders in [`StoreSnapshot::to_value`]. Path-kind
        /// names nest unless they overlap another field's path.
        path: FieldPath,
        /// Field contents.
        field: FieldSnapshot,
    },
    /// The aggregate validator entry.
    Validator(ValidatorSnapshot),
}

/// Detached copy of the store's state, fields in declaration order followed
/// by the validator entry.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreSnapshot {
    entries: Vec<(String, SnapshotEntry)>,
}

impl StoreSnapshot {
    /// Capture `fields`.
    pub fn capture(fields: &FieldSet) -> Self {
        let paths: Vec<FieldPath> = fields.names().map(FieldPath::parse).collect();
        let mut entries: Vec<(String, SnapshotEntry)> = fields
            .iter()
            .enumerate()
            .map(|(position, (name, entry))| {
                let overlapping = paths
                    .iter()
                    .enumerate()
                    .any(|(other, path)| other != position && path.overlaps(&paths[position]));
                let path = if overlapping {
                    tracing::debug!(field = %name, "overlapping field path rendered flat");
                    FieldPath::literal(name)
                } else {
                    paths[position].clone()
                };
                (
                    name.to_string(),
                    SnapshotEntry::Field {
                        path,
                        field: entry.into(),
                    },
                )
            })
            .collect();
        entries.push((
            VALIDATOR_ENTRY.to_string(),
            SnapshotEntry::Validator(ValidatorSnapshot {
                errors_count: fields.errors_count(),
            }),
        ));
        Self { entries }
    }

    /// Entries in order.
    pub fn entries(&self) -> &[(String, SnapshotEntry)] {
        &self.entries
    }

    /// Look up a field entry by declared name.
    pub fn field(&self, name: &str) -> Option<&FieldSnapshot> {
        self.entries.iter().find_map(|(entry_name, entry)| match entry {
            SnapshotEntry::Field { field, .. } if entry_name == name => Some(field),
            _ => None,
        })
    }

    /// The validator entry.
    pub fn validator(&self) -> ValidatorSnapshot {
        self.entries
            .iter()
            .find_map(|(_, entry)| match entry {
                SnapshotEntry::Validator(validator) => Some(*validator),
                SnapshotEntry::Field { .. } => None,
            })
            .unwrap_or_default()
    }

    /// Shorthand for `validator().errors_count`.
    pub fn errors_count(&self) -> usize {
        self.validator().errors_count
    }

    /// Flatten to one view per state, keyed like the store addresses them.
    pub fn views(&self) -> Vec<(FieldKey, FieldView)> {
        let mut views = Vec::new();
        for (name, entry) in &self.entries {
            match entry {
                SnapshotEntry::Field {
                    field: FieldSnapshot::Scalar(view),
                    ..
                } => views.push((FieldKey::new(name.as_str()), view.clone())),
                SnapshotEntry::Field {
                    field: FieldSnapshot::Indexed(items),
                    ..
                } => views.extend(
                    items
                        .iter()
                        .enumerate()
                        .map(|(index, view)| (FieldKey::item(name.as_str(), index), view.clone())),
                ),
                SnapshotEntry::Validator(_) => {}
            }
        }
        views
    }

    /// Render as JSON. Path-kind names nest (`user.email` becomes
    /// `{"user": {"email": ...}}`); the validator entry is written last.
    pub fn to_value(&self) -> Value {
        let mut root = Value::Object(Map::new());
        let mut validator = None;
        for (_, entry) in &self.entries {
            match entry {
                SnapshotEntry::Field { path, field } => {
                    let rendered = serde_json::to_value(field).unwrap_or(Value::Null);
                    path.insert(&mut root, rendered);
                }
                SnapshotEntry::Validator(snapshot) => validator = Some(*snapshot),
            }
        }
        if let (Some(snapshot), Value::Object(map)) = (validator, &mut root) {
            map.insert(
                VALIDATOR_ENTRY.to_string(),
                serde_json::json!({ "errors_count": snapshot.errors_count }),
            );
        }
        root
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use vprop_schema::{resolve, FieldDeclaration};

    fn sample() -> FieldSet {
        resolve(
            &[
                FieldDeclaration::new("email").value("a@b"),
                FieldDeclaration::new("user.name").value("ada"),
                FieldDeclaration::new("tags").value("t").indexed(2),
            ],
            &Value::Null,
        )
    }

    #[test]
    fn test_capture_tags_entries() {
        let mut fields = sample();
        fields
            .state_mut(&FieldKey::item("tags", 1))
            .unwrap()
            .set_errors(vec!["bad".into()]);
        let snapshot = StoreSnapshot::capture(&fields);

        assert_eq!(snapshot.entries().len(), 4);
        assert_eq!(snapshot.entries()[3].0, VALIDATOR_ENTRY);
        assert_eq!(snapshot.errors_count(), 1);
        assert_eq!(
            snapshot.field("email"),
            Some(&FieldSnapshot::Scalar(FieldView {
                value: json!("a@b"),
                errors: vec![],
            }))
        );
        assert!(matches!(snapshot.field("tags"), Some(FieldSnapshot::Indexed(items)) if items.len() == 2));
        assert_eq!(snapshot.field(VALIDATOR_ENTRY), None);
    }

    #[test]
    fn test_views_expand_items() {
        let snapshot = StoreSnapshot::capture(&sample());
        let keys: Vec<String> = snapshot.views().iter().map(|(k, _)| k.to_string()).collect();
        assert_eq!(keys, vec!["email", "user.name", "tags[0]", "tags[1]"]);
    }

    #[test]
    fn test_to_value_nests_path_names() {
        let snapshot = StoreSnapshot::capture(&sample());
        let value = snapshot.to_value();
        assert_eq!(value["email"], json!({"value": "a@b", "errors": []}));
        assert_eq!(value["user"]["name"]["value"], json!("ada"));
        assert_eq!(value["tags"][1]["value"], json!("t"));
        assert_eq!(value["validator"], json!({"errors_count": 0}));
    }

    #[test]
    fn test_overlapping_names_render_flat() {
        for declarations in [
            vec![
                FieldDeclaration::new("user.name").value("ada"),
                FieldDeclaration::new("user").value("u"),
            ],
            vec![
                FieldDeclaration::new("user").value("u"),
                FieldDeclaration::new("user.name").value("ada"),
            ],
        ] {
            let fields = resolve(&declarations, &Value::Null);
            let value = StoreSnapshot::capture(&fields).to_value();
            assert_eq!(value["user"], json!({"value": "u", "errors": []}));
            assert_eq!(value["user.name"]["value"], json!("ada"));
        }
    }

    #[test]
    fn test_out_of_range_index_renders_as_key() {
        let fields = resolve(
            &[FieldDeclaration::new("x[18446744073709551615]").value(1)],
            &Value::Null,
        );
        let value = StoreSnapshot::capture(&fields).to_value();
        assert_eq!(value["x"]["18446744073709551615"]["value"], json!(1));
    }

    #[test]
    fn test_overlap_leaves_other_paths_nested() {
        let fields = resolve(
            &[
                FieldDeclaration::new("tags").indexed(1),
                FieldDeclaration::new("tags[0]").value("x"),
                FieldDeclaration::new("user.email").value("a@b"),
            ],
            &Value::Null,
        );
        let value = StoreSnapshot::capture(&fields).to_value();
        assert!(value["tags"].is_array());
        assert_eq!(value["tags[0]"]["value"], json!("x"));
        assert_eq!(value["user"]["email"]["value"], json!("a@b"));
    }

    #[test]
    fn test_snapshot_is_detached() {
        let mut fields = sample();
        let snapshot = StoreSnapshot::capture(&fields);
        fields.state_mut(&"email".into()).unwrap().set_value(json!("changed"));
        assert_eq!(snapshot.to_value()["email"]["value"], json!("a@b"));
    }
}
