//! # Field Keys
//!
//! Addresses a field in the store. A scalar field is addressed by name; an
//! item of an indexed field by name plus item index.

use serde::{Deserialize, Serialize};

/// Address of a scalar field or of one item of an indexed field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FieldKey {
    name: String,
    index: Option<usize>,
}

impl FieldKey {
    /// Address a scalar field.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            index: None,
        }
    }

    /// Address one item of an indexed field.
    pub fn item(name: impl Into<String>, index: usize) -> Self {
        Self {
            name: name.into(),
            index: Some(index),
        }
    }

    /// The declared field name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The item index, if this key addresses an item.
    pub fn index(&self) -> Option<usize> {
        self.index
    }

    /// Whether this key addresses an item of an indexed field.
    pub fn is_item(&self) -> bool {
        self.index.is_some()
    }
}

impl std::fmt::Display for FieldKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.index {
            Some(index) => write!(f, "{}[{index}]", self.name),
            None => f.write_str(&self.name),
        }
    }
}

impl From<&str> for FieldKey {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for FieldKey {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

impl From<&String> for FieldKey {
    fn from(name: &String) -> Self {
        Self::new(name.as_str())
    }
}

impl From<(&str, usize)> for FieldKey {
    fn from((name, index): (&str, usize)) -> Self {
        Self::item(name, index)
    }
}

impl From<&FieldKey> for FieldKey {
    fn from(key: &FieldKey) -> Self {
        key.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_key() {
        let key = FieldKey::from("password");
        assert_eq!(key.name(), "password");
        assert_eq!(key.index(), None);
        assert!(!key.is_item());
        assert_eq!(key.to_string(), "password");
    }

    #[test]
    fn test_item_key_display() {
        let key = FieldKey::from(("tags", 2));
        assert!(key.is_item());
        assert_eq!(key.to_string(), "tags[2]");
    }

    #[test]
    fn test_keys_order_by_name_then_index() {
        let mut keys = vec![
            FieldKey::item("b", 1),
            FieldKey::new("a"),
            FieldKey::item("b", 0),
        ];
        keys.sort();
        let rendered: Vec<String> = keys.iter().map(ToString::to_string).collect();
        assert_eq!(rendered, vec!["a", "b[0]", "b[1]"]);
    }
}
