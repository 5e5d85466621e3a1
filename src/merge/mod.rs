//! Deep-merge engine for state documents.
//!
//! Updates are an ordered set of field-level operations. On the wire an
//! update is plain JSON where a `{"$append": item}` or `{"$remove": target}`
//! object marks a list mutation, a plain object means "merge recursively",
//! and any other value means "replace". Internally the vocabulary is an
//! explicit tagged union ([`UpdateOp`]) so callers can build updates without
//! magic keys; [`UpdateSet::from_value`] and [`UpdateSet::to_value`] convert
//! to and from the wire form.

use std::fmt;

use serde_json::{Map, Value};

/// Wire marker for list append.
pub const APPEND_KEY: &str = "$append";
/// Wire marker for list removal.
pub const REMOVE_KEY: &str = "$remove";

/// A single field-level mutation.
///
/// There is no explicit "Set" marker on the wire because a plain value
/// already means "replace".
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOp {
    /// Replace the field outright (last-writer-wins).
    Replace(Value),
    /// Append an item to the field, coercing it into a list first.
    Append(Value),
    /// Remove matching items from the field if it is a list.
    Remove(Value),
    /// Recursively merge into the field when both sides are objects.
    MergeObject(UpdateSet),
}

/// An ordered set of field updates to fold into a document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateSet {
    ops: Vec<(String, UpdateOp)>,
}

/// Error type for parsing wire-form updates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeError {
    /// The top-level update payload was not a JSON object.
    NotAnObject,
}

impl fmt::Display for MergeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MergeError::NotAnObject => write!(f, "update payload must be a JSON object"),
        }
    }
}

impl std::error::Error for MergeError {}

impl UpdateSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace `key` with `value`.
    pub fn set(mut self, key: impl Into<String>, value: Value) -> Self {
        self.ops.push((key.into(), UpdateOp::Replace(value)));
        self
    }

    /// Append `item` to the list at `key`.
    pub fn append(mut self, key: impl Into<String>, item: Value) -> Self {
        self.ops.push((key.into(), UpdateOp::Append(item)));
        self
    }

    /// Remove items matching `target` from the list at `key`.
    pub fn remove(mut self, key: impl Into<String>, target: Value) -> Self {
        self.ops.push((key.into(), UpdateOp::Remove(target)));
        self
    }

    /// Merge `updates` into the object at `key`.
    pub fn merge_object(mut self, key: impl Into<String>, updates: UpdateSet) -> Self {
        self.ops.push((key.into(), UpdateOp::MergeObject(updates)));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Iterate over the operations in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &UpdateOp)> {
        self.ops.iter().map(|(k, op)| (k.as_str(), op))
    }

    /// Parse an update payload from its wire form.
    pub fn from_value(value: &Value) -> Result<Self, MergeError> {
        match value {
            Value::Object(map) => Ok(Self::from_map(map)),
            _ => Err(MergeError::NotAnObject),
        }
    }

    fn from_map(map: &Map<String, Value>) -> Self {
        let mut set = Self::new();
        for (key, value) in map {
            let op = match value {
                Value::Object(inner) => {
                    if let Some(item) = inner.get(APPEND_KEY) {
                        UpdateOp::Append(item.clone())
                    } else if let Some(target) = inner.get(REMOVE_KEY) {
                        UpdateOp::Remove(target.clone())
                    } else {
                        UpdateOp::MergeObject(Self::from_map(inner))
                    }
                }
                other => UpdateOp::Replace(other.clone()),
            };
            set.ops.push((key.clone(), op));
        }
        set
    }

    /// Reproduce the wire form of this update set.
    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        for (key, op) in &self.ops {
            let value = match op {
                UpdateOp::Replace(v) => v.clone(),
                UpdateOp::Append(item) => {
                    let mut marker = Map::new();
                    marker.insert(APPEND_KEY.to_string(), item.clone());
                    Value::Object(marker)
                }
                UpdateOp::Remove(target) => {
                    let mut marker = Map::new();
                    marker.insert(REMOVE_KEY.to_string(), target.clone());
                    Value::Object(marker)
                }
                UpdateOp::MergeObject(set) => set.to_value(),
            };
            map.insert(key.clone(), value);
        }
        Value::Object(map)
    }

    /// Fold this update set into `target`.
    pub fn apply(&self, target: &mut Map<String, Value>) {
        for (key, op) in &self.ops {
            match op {
                UpdateOp::Replace(value) => {
                    target.insert(key.clone(), value.clone());
                }
                UpdateOp::Append(item) => {
                    let mut list = match target.remove(key) {
                        Some(Value::Array(existing)) => existing,
                        // A non-list value becomes a singleton list before the append.
                        Some(scalar) => vec![scalar],
                        None => Vec::new(),
                    };
                    list.push(item.clone());
                    target.insert(key.clone(), Value::Array(list));
                }
                UpdateOp::Remove(wanted) => {
                    // No-op unless the field holds a list.
                    if let Some(Value::Array(list)) = target.get_mut(key) {
                        match wanted.get("id") {
                            Some(id) => list.retain(|item| item.get("id") != Some(id)),
                            None => list.retain(|item| item != wanted),
                        }
                    }
                }
                UpdateOp::MergeObject(updates) => match target.get_mut(key) {
                    Some(Value::Object(existing)) => updates.apply(existing),
                    // Either side not an object: replace outright, markers and all.
                    _ => {
                        target.insert(key.clone(), updates.to_value());
                    }
                },
            }
        }
    }
}

/// Apply `updates` to a copy of `current` and return the merged document.
///
/// A non-object `current` is treated as an empty document.
pub fn merge(current: &Value, updates: &UpdateSet) -> Value {
    let mut map = match current {
        Value::Object(map) => map.clone(),
        _ => Map::new(),
    };
    updates.apply(&mut map);
    Value::Object(map)
}
