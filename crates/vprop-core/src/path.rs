//! # Field Paths
//!
//! Field names double as lookup paths into the host input. A name is
//! classified exactly once, when its declaration is resolved:
//!
//! - [`KeyKind::Flat`]: a plain key (`"email"`), looked up directly.
//! - [`KeyKind::Path`]: a dotted or indexed path (`"user.addresses[0].city"`),
//!   walked segment by segment.
//!
//! Lookups never fail. A segment that does not resolve yields `Value::Null`.
//! A path-kind name is only ever walked: an input object carrying the
//! literal key `"a.b"` does not match the name `a.b`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Largest array index [`FieldPath::insert`] grows an array to. Past it the
/// index is written as an object key.
pub const MAX_INSERT_INDEX: usize = 1024;

/// Classification of a field name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyKind {
    /// No `.` or `[` in the name; the name is a single object key.
    Flat,
    /// The name is a path of object keys and array indices.
    Path,
}

/// One step of a [`FieldPath`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// Object member.
    Key(String),
    /// Array element (`[3]`).
    Index(usize),
}

/// A field name together with its key kind and parsed segments.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldPath {
    raw: String,
    kind: KeyKind,
    segments: Vec<PathSegment>,
}

impl FieldPath {
    /// Classify and parse a field name.
    ///
    /// Accepts `a.b.c`, `a[0].b` and quoted bracket keys (`a['b.c']`).
    /// Empty segments (`a..b`) are skipped; an unterminated bracket takes
    /// the rest of the name as a key.
    pub fn parse(name: &str) -> Self {
        if !name.contains(|c: char| c == '.' || c == '[') {
            return Self {
                raw: name.to_string(),
                kind: KeyKind::Flat,
                segments: vec![PathSegment::Key(name.to_string())],
            };
        }

        let mut segments = Vec::new();
        let mut current = String::new();
        let mut chars = name.chars();

        while let Some(c) = chars.next() {
            match c {
                '.' => push_key(&mut current, &mut segments),
                '[' => {
                    push_key(&mut current, &mut segments);
                    let inner: String = chars.by_ref().take_while(|c| *c != ']').collect();
                    segments.push(bracket_segment(&inner));
                }
                _ => current.push(c),
            }
        }
        push_key(&mut current, &mut segments);

        Self {
            raw: name.to_string(),
            kind: KeyKind::Path,
            segments,
        }
    }

    /// The original field name.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Flat or path.
    pub fn kind(&self) -> KeyKind {
        self.kind
    }

    /// Parsed segments. A flat key has exactly one `Key` segment.
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Borrow the value at this path, if every segment resolves.
    pub fn get<'a>(&self, input: &'a Value) -> Option<&'a Value> {
        match self.kind {
            KeyKind::Flat => input.get(self.raw.as_str()),
            KeyKind::Path => self
                .segments
                .iter()
                .try_fold(input, |node, segment| step(node, segment)),
        }
    }

    /// Clone the value at this path, or `Value::Null` when it is missing.
    pub fn lookup(&self, input: &Value) -> Value {
        self.get(input).cloned().unwrap_or(Value::Null)
    }

    /// A path holding `name` as its single key, without splitting it.
    pub fn literal(name: &str) -> Self {
        Self {
            raw: name.to_string(),
            kind: KeyKind::Flat,
            segments: vec![PathSegment::Key(name.to_string())],
        }
    }

    /// True when one path is a prefix of the other, so inserting both into
    /// the same tree would make one overwrite or nest inside the other.
    /// `[3]` and `.3` address the same node.
    pub fn overlaps(&self, other: &FieldPath) -> bool {
        self.segments
            .iter()
            .zip(&other.segments)
            .all(|(a, b)| segment_text(a) == segment_text(b))
    }

    /// Write `value` at this path inside `target`, creating intermediate
    /// objects and arrays as needed. Non-container nodes in the way are
    /// replaced. An index above [`MAX_INSERT_INDEX`], or one that meets an
    /// existing object, becomes an object key.
    pub fn insert(&self, target: &mut Value, value: Value) {
        insert_at(target, &self.segments, value);
    }
}

impl std::fmt::Display for FieldPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}

fn push_key(current: &mut String, segments: &mut Vec<PathSegment>) {
    if !current.is_empty() {
        segments.push(PathSegment::Key(std::mem::take(current)));
    }
}

fn bracket_segment(inner: &str) -> PathSegment {
    let trimmed = inner.trim();
    for quote in ['\'', '"'] {
        if let Some(unquoted) = trimmed
            .strip_prefix(quote)
            .and_then(|s| s.strip_suffix(quote))
        {
            return PathSegment::Key(unquoted.to_string());
        }
    }
    match trimmed.parse::<usize>() {
        Ok(index) => PathSegment::Index(index),
        Err(_) => PathSegment::Key(trimmed.to_string()),
    }
}

fn segment_text(segment: &PathSegment) -> std::borrow::Cow<'_, str> {
    match segment {
        PathSegment::Key(key) => std::borrow::Cow::Borrowed(key.as_str()),
        PathSegment::Index(index) => std::borrow::Cow::Owned(index.to_string()),
    }
}

fn step<'a>(node: &'a Value, segment: &PathSegment) -> Option<&'a Value> {
    match (node, segment) {
        (Value::Object(map), PathSegment::Key(key)) => map.get(key),
        (Value::Object(map), PathSegment::Index(index)) => map.get(&index.to_string()),
        (Value::Array(items), PathSegment::Index(index)) => items.get(*index),
        (Value::Array(items), PathSegment::Key(key)) => {
            key.parse::<usize>().ok().and_then(|i| items.get(i))
        }
        _ => None,
    }
}

fn insert_at(target: &mut Value, segments: &[PathSegment], value: Value) {
    let Some((head, rest)) = segments.split_first() else {
        *target = value;
        return;
    };

    match head {
        PathSegment::Index(index) if *index <= MAX_INSERT_INDEX && !target.is_object() => {
            if !target.is_array() {
                *target = Value::Array(Vec::new());
            }
            if let Value::Array(items) = target {
                if items.len() <= *index {
                    items.resize(index + 1, Value::Null);
                }
                if let Some(slot) = items.get_mut(*index) {
                    insert_at(slot, rest, value);
                }
            }
        }
        segment => {
            if !target.is_object() {
                *target = Value::Object(Map::new());
            }
            if let Value::Object(map) = target {
                let slot = map
                    .entry(segment_text(segment).into_owned())
                    .or_insert(Value::Null);
                insert_at(slot, rest, value);
            }
        }
    }
}
