//! Structural diff between two JSON values.
//!
//! Depth-first and pre-order. Object keys are visited in sorted order, array
//! elements by index. Arrays are compared positionally: there is no move or
//! reorder detection, so swapping two elements reports two `changed` items.
//!
//! Equal subtrees below the root contribute nothing. Only a root that is
//! equal as a whole yields a single `unchanged` item, with an empty path.

use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffKind {
    Added,
    Removed,
    Changed,
    Unchanged,
}

/// One addressed difference.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffItem {
    /// Dot/bracket path, e.g. `user.addresses[2].city`. Empty for the root.
    pub path: String,
    pub kind: DiffKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_value: Option<Value>,
}

impl DiffItem {
    fn added(path: String, value: &Value) -> Self {
        Self {
            path,
            kind: DiffKind::Added,
            old_value: None,
            new_value: Some(value.clone()),
        }
    }

    fn removed(path: String, value: &Value) -> Self {
        Self {
            path,
            kind: DiffKind::Removed,
            old_value: Some(value.clone()),
            new_value: None,
        }
    }

    fn changed(path: String, old: &Value, new: &Value) -> Self {
        Self {
            path,
            kind: DiffKind::Changed,
            old_value: Some(old.clone()),
            new_value: Some(new.clone()),
        }
    }

    fn unchanged(path: String, value: &Value) -> Self {
        Self {
            path,
            kind: DiffKind::Unchanged,
            old_value: Some(value.clone()),
            new_value: Some(value.clone()),
        }
    }
}

/// Per-kind counts over a diff.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DiffSummary {
    pub added: usize,
    pub removed: usize,
    pub changed: usize,
    pub unchanged: usize,
}

impl DiffSummary {
    pub fn from_items(items: &[DiffItem]) -> Self {
        items.iter().fold(Self::default(), |mut s, item| {
            match item.kind {
                DiffKind::Added => s.added += 1,
                DiffKind::Removed => s.removed += 1,
                DiffKind::Changed => s.changed += 1,
                DiffKind::Unchanged => s.unchanged += 1,
            }
            s
        })
    }

    /// Number of real differences, not counting `unchanged`.
    pub fn total_changes(&self) -> usize {
        self.added + self.removed + self.changed
    }
}

/// Computes the differences from `previous` to `current`.
pub fn diff(previous: &Value, current: &Value) -> Vec<DiffItem> {
    if values_equal(previous, current) {
        return vec![DiffItem::unchanged(String::new(), current)];
    }

    let mut items = Vec::new();
    diff_into(previous, current, "", &mut items);
    items
}

fn diff_into(previous: &Value, current: &Value, path: &str, items: &mut Vec<DiffItem>) {
    match (previous, current) {
        (Value::Object(old), Value::Object(new)) => diff_objects(old, new, path, items),
        (Value::Array(old), Value::Array(new)) => diff_arrays(old, new, path, items),
        _ => items.push(DiffItem::changed(path.to_string(), previous, current)),
    }
}

fn diff_objects(
    old: &Map<String, Value>,
    new: &Map<String, Value>,
    path: &str,
    items: &mut Vec<DiffItem>,
) {
    let keys: BTreeSet<&String> = old.keys().chain(new.keys()).collect();

    for key in keys {
        let child = key_path(path, key);
        match (old.get(key), new.get(key)) {
            (None, Some(added)) => items.push(DiffItem::added(child, added)),
            (Some(removed), None) => items.push(DiffItem::removed(child, removed)),
            (Some(a), Some(b)) if !values_equal(a, b) => diff_into(a, b, &child, items),
            _ => {}
        }
    }
}

fn diff_arrays(old: &[Value], new: &[Value], path: &str, items: &mut Vec<DiffItem>) {
    for i in 0..old.len().max(new.len()) {
        let child = index_path(path, i);
        match (old.get(i), new.get(i)) {
            (None, Some(added)) => items.push(DiffItem::added(child, added)),
            (Some(removed), None) => items.push(DiffItem::removed(child, removed)),
            (Some(a), Some(b)) if !values_equal(a, b) => diff_into(a, b, &child, items),
            _ => {}
        }
    }
}

/// Deep equality where numbers compare by value, so `1` equals `1.0`.
fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) if x.is_f64() || y.is_f64() => {
            x.as_f64() == y.as_f64()
        }
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(a, b)| values_equal(a, b))
        }
        (Value::Object(x), Value::Object(y)) => {
            x.len() == y.len()
                && x.iter()
                    .all(|(k, v)| y.get(k).is_some_and(|w| values_equal(v, w)))
        }
        _ => a == b,
    }
}

fn key_path(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", parent, key)
    }
}

fn index_path(parent: &str, index: usize) -> String {
    format!("{}[{}]", parent, index)
}
