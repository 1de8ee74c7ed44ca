use gatecp_plugin::derive_name;
use gatecp_schema::{Extension, Schema, ValidationError};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::index::Index;
use crate::message::{is_default, Message, Named};
use crate::object::{apply_record_defaults, impl_record, validate_message, Object, ValidationContext};
use crate::typedefs;

pub const TYPE: &str = "plugin_schema";

/// A plugin schema authored at runtime; `name` derives from `schema`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PluginSchema {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    /// Schema source handed to the plugin validation backend.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub schema: String,
    #[serde(default, skip_serializing_if = "is_default")]
    pub created_at: i64,
    #[serde(default, skip_serializing_if = "is_default")]
    pub updated_at: i64,
}

impl Named for PluginSchema {
    const FULL_NAME: &'static str = "gatecp.model.v1.PluginSchema";
}

impl_record!(PluginSchema);

pub fn schema() -> Schema {
    let mut root = typedefs::root("PluginSchema", "plugin-schemas");
    root.extension = Some(Extension {
        disable_validate_endpoint: true,
        resource_api_path: "plugin-schemas".to_string(),
    });

    typedefs::with_record_fields(root)
        .with_property("name", typedefs::name())
        .with_property(
            "schema",
            Schema {
                min_length: Some(1),
                ..Schema::string()
            },
        )
        .with_required(&["id", "schema"])
}

#[derive(Debug, Clone, Default)]
pub struct PluginSchemaObject {
    pub plugin_schema: PluginSchema,
}

impl PluginSchemaObject {
    pub fn new(plugin_schema: PluginSchema) -> Self {
        Self { plugin_schema }
    }
}

impl Object for PluginSchemaObject {
    fn id(&self) -> &str {
        &self.plugin_schema.id
    }

    fn type_name(&self) -> &'static str {
        TYPE
    }

    fn resource(&self) -> &dyn Message {
        &self.plugin_schema
    }

    fn resource_mut(&mut self) -> &mut dyn Message {
        &mut self.plugin_schema
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> std::result::Result<(), ValidationError> {
        validate_message(ctx, TYPE, &self.plugin_schema)?;

        let Some(plugins) = ctx.plugins else {
            return Err(ValidationError::entity("no plugin validator configured"));
        };
        let derived = plugins.validate_schema(ctx.request, &self.plugin_schema.schema)?;
        if !self.plugin_schema.name.is_empty() && self.plugin_schema.name != derived {
            return Err(ValidationError::field(
                "name",
                format!("must match the name in the schema source ('{derived}')"),
            ));
        }
        Ok(())
    }

    fn process_defaults(&mut self, _ctx: &ValidationContext<'_>) -> Result<()> {
        apply_record_defaults(&mut self.plugin_schema);
        if self.plugin_schema.name.is_empty() {
            // an underivable name is reported by validate
            if let Ok(name) = derive_name(&self.plugin_schema.schema) {
                self.plugin_schema.name = name;
            }
        }
        Ok(())
    }

    fn indexes(&self) -> Vec<Index> {
        let mut indexes = Vec::new();
        if !self.plugin_schema.name.is_empty() {
            indexes.push(Index::unique("name", &self.plugin_schema.name, "name"));
        }
        indexes
    }
}
