//! Flattening of nested plugin error payloads.
//!
//! A backend reports failures as a tree keyed by field name:
//!
//! ```json
//! {"config": {"add": {"headers": {"0": "invalid value: nokey"}}},
//!  "@entity": ["at least one of these fields must be non-empty: 'config.a'"]}
//! ```
//!
//! Flattening turns each leaf into a field detail addressed by a dotted path
//! with bracketed indexes (`config.add.headers[0]`). `@entity` collects
//! cross-field messages for its parent (the entity itself at the top level)
//! and a top-level `name` means the plugin schema does not exist.

use gatecp_schema::detail::DetailSet;
use gatecp_schema::ValidationError;
use serde_json::{Map, Value};

/// Key holding cross-field messages.
pub const ENTITY_KEY: &str = "@entity";
/// Top-level key reporting an unknown plugin.
pub const NAME_KEY: &str = "name";

/// Flatten a backend payload for the plugin `plugin_name`.
pub fn flatten(payload: &Value, plugin_name: &str) -> ValidationError {
    let mut details = DetailSet::new();
    match payload {
        Value::Object(map) => {
            for (key, value) in map {
                if key == NAME_KEY {
                    details.push_field(NAME_KEY, format!("plugin({plugin_name}) does not exist"));
                } else {
                    visit(&mut details, "", key, value);
                }
            }
        }
        Value::Null => {}
        other => push_messages(&mut details, "", other),
    }
    details.into_error()
}

fn visit(details: &mut DetailSet, parent: &str, key: &str, value: &Value) {
    if key == ENTITY_KEY {
        push_messages(details, parent, value);
        return;
    }

    let path = join(parent, key);
    match value {
        Value::Object(map) => visit_object(details, &path, map),
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                visit(details, &path, &index.to_string(), item);
            }
        }
        Value::Null => {}
        leaf => push(details, &path, message(leaf)),
    }
}

fn visit_object(details: &mut DetailSet, path: &str, map: &Map<String, Value>) {
    for (key, value) in map {
        visit(details, path, key, value);
    }
}

// Messages addressed to `path` itself, as listed under `@entity`.
fn push_messages(details: &mut DetailSet, path: &str, value: &Value) {
    match value {
        Value::Array(items) => {
            for item in items.iter().filter(|item| !item.is_null()) {
                push(details, path, message(item));
            }
        }
        Value::Null => {}
        leaf => push(details, path, message(leaf)),
    }
}

fn push(details: &mut DetailSet, path: &str, message: String) {
    if path.is_empty() {
        details.push_entity(message);
    } else {
        details.push_field(path, message);
    }
}

fn join(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else if key.parse::<usize>().is_ok() {
        format!("{parent}[{key}]")
    } else {
        format!("{parent}.{key}")
    }
}

fn message(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
