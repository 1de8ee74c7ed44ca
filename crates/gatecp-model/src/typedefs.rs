//! Schema fragments shared by the bundled resources.

use gatecp_schema::document::DRAFT7;
use gatecp_schema::{Extension, Schema};
use serde_json::Value;

pub const UUID_PATTERN: &str =
    "^[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$";
pub const NAME_PATTERN: &str = "^[0-9a-zA-Z.\\-_~]*$";
pub const HOST_PATTERN: &str = "^[0-9a-zA-Z.\\-_*]+$";
pub const PATH_PATTERN: &str = "^/.*";

pub const MAX_TAGS: u64 = 8;

/// Protocols a route or plugin may name.
pub const PROTOCOLS: [&str; 7] = ["grpc", "grpcs", "http", "https", "tcp", "tls", "udp"];

/// Protocols a plugin may name; plugins can also run on websocket traffic.
pub const PLUGIN_PROTOCOLS: [&str; 9] = [
    "grpc", "grpcs", "http", "https", "tcp", "tls", "udp", "ws", "wss",
];

/// Root node of a bundled resource document.
pub fn root(title: &str, resource_api_path: &str) -> Schema {
    let extension = (!resource_api_path.is_empty()).then(|| Extension {
        disable_validate_endpoint: false,
        resource_api_path: resource_api_path.to_string(),
    });
    Schema {
        schema: Some(DRAFT7.to_string()),
        title: Some(title.to_string()),
        additional_properties: Some(false),
        extension,
        ..Schema::object()
    }
}

pub fn id() -> Schema {
    Schema {
        pattern: Some(UUID_PATTERN.to_string()),
        ..Schema::string()
    }
}

pub fn name() -> Schema {
    Schema {
        pattern: Some(NAME_PATTERN.to_string()),
        min_length: Some(1),
        max_length: Some(128),
        ..Schema::string()
    }
}

pub fn tags() -> Schema {
    Schema {
        max_items: Some(MAX_TAGS),
        unique_items: Some(true),
        ..Schema::array(Schema {
            pattern: Some("^[0-9a-zA-Z.\\-_~:]+$".to_string()),
            min_length: Some(1),
            max_length: Some(128),
            ..Schema::string()
        })
    }
}

pub fn timestamp() -> Schema {
    Schema {
        minimum: Some(0),
        ..Schema::integer()
    }
}

pub fn bounded(minimum: i64, maximum: i64) -> Schema {
    Schema {
        minimum: Some(minimum),
        maximum: Some(maximum),
        ..Schema::integer()
    }
}

pub fn one_of_strings(values: &[&str]) -> Schema {
    Schema {
        enum_: values.iter().map(|v| Value::String(v.to_string())).collect(),
        ..Schema::string()
    }
}

/// `{"id": "<uuid>"}` reference to another entity.
pub fn reference() -> Schema {
    Schema::object()
        .with_property("id", id())
        .with_required(&["id"])
}

pub fn protocols(allowed: &[&str]) -> Schema {
    Schema {
        min_items: Some(1),
        unique_items: Some(true),
        ..Schema::array(one_of_strings(allowed))
    }
}

/// The properties every resource carries.
pub fn with_record_fields(schema: Schema) -> Schema {
    schema
        .with_property("id", id())
        .with_property("created_at", timestamp())
        .with_property("updated_at", timestamp())
}
