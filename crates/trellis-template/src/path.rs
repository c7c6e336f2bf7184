//! Dot/bracket path resolution into nested JSON values.
//!
//! Paths use dot notation with optional array indices:
//!
//! - `contact.first_name`
//! - `contact.company.name`
//! - `items[0].email` (normalized to `items.0.email`)
//!
//! Index segments address arrays, but a digit segment also matches an object
//! key of the same text, so callers never need to know which backing store
//! holds the data.

use serde_json::{Map, Value};

/// Normalize a template path by rewriting `[N]` as `.N`.
///
/// `"items[0].email"` → `"items.0.email"`
pub fn normalize(path: &str) -> String {
    let mut out = String::with_capacity(path.len() + 2);
    let mut chars = path.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '[' if !out.is_empty() => out.push('.'),
            '[' => {}
            ']' => {
                if let Some(&next) = chars.peek()
                    && next != '.'
                    && next != '['
                {
                    out.push('.');
                }
            }
            other => out.push(other),
        }
    }

    out
}

/// Split a path into its normalized segments.
pub fn segments(path: &str) -> Vec<String> {
    normalize(path).split('.').map(str::to_string).collect()
}

/// Look up the value stored at `path` inside `root`.
///
/// Returns `None` as soon as any segment is missing or an intermediate value
/// is null or a scalar. Never fails.
pub fn get<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = root;
    for segment in segments(path) {
        current = step(current, &segment)?;
    }
    Some(current)
}

/// Navigate one segment from a container value.
fn step<'a>(value: &'a Value, segment: &str) -> Option<&'a Value> {
    match value {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    }
}

/// Assign `value` at `path` inside `root`, creating intermediate maps.
///
/// Intermediate nodes that are missing or not containers are replaced with
/// empty maps. Array nodes are indexed when the segment is numeric (padding
/// with nulls past the end); a non-numeric segment on an array replaces the
/// array with a map.
pub fn set(root: &mut Value, path: &str, value: Value) {
    let segments = segments(path);
    let Some((last, parents)) = segments.split_last() else {
        return;
    };

    if !is_container(root) {
        *root = Value::Object(Map::new());
    }

    let mut current = root;
    for segment in parents {
        let child = child_slot(current, segment);
        if !is_container(child) {
            *child = Value::Object(Map::new());
        }
        current = child;
    }

    *child_slot(current, last) = value;
}

fn is_container(value: &Value) -> bool {
    matches!(value, Value::Object(_) | Value::Array(_))
}

/// Get a mutable slot for `segment` under a container, creating it as null.
fn child_slot<'a>(container: &'a mut Value, segment: &str) -> &'a mut Value {
    let index = segment.parse::<usize>().ok();
    let addressable = container.is_object() || (container.is_array() && index.is_some());
    if !addressable {
        *container = Value::Object(Map::new());
    }

    match (container, index) {
        (Value::Array(items), Some(index)) => {
            if items.len() <= index {
                items.resize(index + 1, Value::Null);
            }
            &mut items[index]
        }
        (Value::Object(map), _) => map.entry(segment.to_string()).or_insert(Value::Null),
        _ => unreachable!("container is an object or an indexable array"),
    }
}
