//! Change summaries for audit entries

use serde_json::{Map, Value};

/// Bookkeeping fields that change on every write and say nothing about intent
const IGNORED_FIELDS: [&str; 2] = ["created_at", "updated_at"];

/// Summarize top-level field changes between two serialized rows
///
/// Returns `None` when nothing but bookkeeping fields changed.
pub fn summarize_changes(before: &Value, after: &Value) -> Option<String> {
    let empty = Map::new();
    let (before_obj, after_obj) = match (before, after) {
        (Value::Object(b), Value::Object(a)) => (b, a),
        (Value::Object(b), Value::Null) => (b, &empty),
        (Value::Null, Value::Object(a)) => (&empty, a),
        _ if before == after => return None,
        _ => return Some(format!("{} -> {}", render(before), render(after))),
    };

    let mut keys: Vec<&String> = before_obj.keys().chain(after_obj.keys()).collect();
    keys.sort();
    keys.dedup();

    let changes: Vec<String> = keys
        .into_iter()
        .filter(|key| !IGNORED_FIELDS.contains(&key.as_str()))
        .filter_map(|key| {
            let old = before_obj.get(key).unwrap_or(&Value::Null);
            let new = after_obj.get(key).unwrap_or(&Value::Null);
            (old != new).then(|| format!("{}: {} -> {}", key, render(old), render(new)))
        })
        .collect();

    if changes.is_empty() {
        None
    } else {
        Some(changes.join(", "))
    }
}

fn render(value: &Value) -> String {
    match value {
        Value::Null => "none".to_string(),
        Value::String(s) if s.chars().count() > 40 => {
            let head: String = s.chars().take(37).collect();
            format!("\"{}...\"", head)
        }
        Value::String(s) => format!("\"{}\"", s),
        Value::Array(items) => format!("[{} items]", items.len()),
        Value::Object(fields) => format!("{{{} fields}}", fields.len()),
        other => other.to_string(),
    }
}
