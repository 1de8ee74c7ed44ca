use std::fmt;

use gatecp_plugin::{Context, PluginValidator};
use gatecp_schema::detail::DetailSet;
use gatecp_schema::translate::field_path;
use gatecp_schema::{Schema, ValidationError, Validator};
use serde_json::Value;

use crate::error::Result;
use crate::index::Index;
use crate::message::Message;

/// What an object needs to validate itself.
#[derive(Clone, Copy)]
pub struct ValidationContext<'a> {
    pub validator: &'a Validator,
    /// Backend for plugin configuration. Plugins fail validation without one.
    pub plugins: Option<&'a dyn PluginValidator>,
    pub request: &'a Context,
}

impl<'a> ValidationContext<'a> {
    pub fn new(validator: &'a Validator, request: &'a Context) -> Self {
        Self {
            validator,
            plugins: None,
            request,
        }
    }

    pub fn with_plugins(mut self, plugins: &'a dyn PluginValidator) -> Self {
        self.plugins = Some(plugins);
        self
    }
}

impl fmt::Debug for ValidationContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationContext")
            .field("validator", self.validator)
            .field("plugins", &self.plugins.is_some())
            .field("request", self.request)
            .finish()
    }
}

/// A resource instance the engine can default, validate and index.
pub trait Object: Send + Sync + fmt::Debug {
    fn id(&self) -> &str;

    /// Registered type name (`service`).
    fn type_name(&self) -> &'static str;

    fn resource(&self) -> &dyn Message;

    fn resource_mut(&mut self) -> &mut dyn Message;

    fn validate(&self, ctx: &ValidationContext<'_>) -> std::result::Result<(), ValidationError>;

    /// Fill unset fields. Set fields are never overwritten, so calling this
    /// twice has the same effect as calling it once.
    fn process_defaults(&mut self, ctx: &ValidationContext<'_>) -> Result<()>;

    fn indexes(&self) -> Vec<Index>;
}

/// Run the compiled schema of `type_name` against a message.
pub fn validate_message(
    ctx: &ValidationContext<'_>,
    type_name: &str,
    message: &dyn Message,
) -> std::result::Result<(), ValidationError> {
    let value = message
        .to_value()
        .map_err(|err| ValidationError::entity(format!("failed to serialize {type_name}: {err}")))?;
    ctx.validator.validate(type_name, &value)
}

pub const UNKNOWN_FIELD: &str = "unknown field";

/// Reject input keys the document does not declare.
///
/// Wire messages cannot hold undeclared fields, so they would otherwise be
/// dropped on decode. Nodes with `additionalProperties: true` stay open.
pub fn check_known_fields(document: &Schema, value: &Value) -> std::result::Result<(), ValidationError> {
    let mut details = DetailSet::new();
    collect_unknown(document, value, &mut String::new(), &mut details);
    details.into_result()
}

fn collect_unknown(node: &Schema, value: &Value, pointer: &mut String, details: &mut DetailSet) {
    match value {
        Value::Object(fields) => {
            let open = node.additional_properties == Some(true)
                || (node.properties.is_empty() && node.additional_properties != Some(false));
            for (key, field) in fields {
                let len = pointer.len();
                pointer.push('/');
                pointer.push_str(&key.replace('~', "~0").replace('/', "~1"));
                match node.properties.get(key) {
                    Some(property) => collect_unknown(property, field, pointer, details),
                    None if !open => details.push_field(&field_path(pointer), UNKNOWN_FIELD),
                    None => {}
                }
                pointer.truncate(len);
            }
        }
        Value::Array(items) => {
            let Some(item_schema) = node.items.as_deref() else {
                return;
            };
            for (index, item) in items.iter().enumerate() {
                let len = pointer.len();
                pointer.push('/');
                pointer.push_str(&index.to_string());
                collect_unknown(item_schema, item, pointer, details);
                pointer.truncate(len);
            }
        }
        _ => {}
    }
}

/// Identity and timestamps shared by every resource.
pub(crate) trait Record {
    fn id_mut(&mut self) -> &mut String;
    fn created_at_mut(&mut self) -> &mut i64;
    fn updated_at_mut(&mut self) -> &mut i64;
}

pub(crate) fn apply_record_defaults<R: Record>(record: &mut R) {
    let id = record.id_mut();
    if id.is_empty() {
        *id = uuid::Uuid::new_v4().to_string();
    }

    let now = chrono::Utc::now().timestamp();
    let created_at = record.created_at_mut();
    if *created_at == 0 {
        *created_at = now;
    }
    let created = *created_at;
    let updated_at = record.updated_at_mut();
    if *updated_at == 0 {
        *updated_at = created;
    }
}

macro_rules! impl_record {
    ($($message:ty),+ $(,)?) => {
        $(
            impl $crate::object::Record for $message {
                fn id_mut(&mut self) -> &mut String {
                    &mut self.id
                }

                fn created_at_mut(&mut self) -> &mut i64 {
                    &mut self.created_at
                }

                fn updated_at_mut(&mut self) -> &mut i64 {
                    &mut self.updated_at
                }
            }
        )+
    };
}

pub(crate) use impl_record;

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn document() -> Schema {
        Schema::object()
            .with_property("host", Schema::string())
            .with_property("service", crate::typedefs::reference())
            .with_property(
                "headers",
                Schema {
                    additional_properties: Some(true),
                    ..Schema::object()
                },
            )
            .with_property("targets", Schema::array(crate::typedefs::reference()))
    }

    #[test]
    fn declared_fields_pass() {
        let value = json!({
            "host": "a.b",
            "service": {"id": "s1"},
            "headers": {"x-anything": ["v"]},
            "targets": [{"id": "t1"}],
        });
        assert!(check_known_fields(&document(), &value).is_ok());
    }

    #[test]
    fn undeclared_fields_are_named_by_path() {
        let value = json!({
            "prot": "https",
            "service": {"id": "s1", "name": "x"},
            "targets": [{"id": "t1"}, {"id": "t2", "weight": 1}],
        });
        let err = check_known_fields(&document(), &value).unwrap_err();
        assert_eq!(err.field_detail("prot").unwrap().messages, vec![UNKNOWN_FIELD]);
        assert!(err.field_detail("service.name").is_some());
        assert!(err.field_detail("targets[1].weight").is_some());
        assert_eq!(err.len(), 3);
    }
}
