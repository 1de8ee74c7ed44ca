use gatecp_schema::{Schema, ValidationError};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;
use crate::index::Index;
use crate::message::{is_default, EntityRef, Message, Named};
use crate::object::{apply_record_defaults, impl_record, validate_message, Object, ValidationContext};
use crate::typedefs;

pub const TYPE: &str = "plugin";

/// Composite uniqueness of a plugin name on one service/route/consumer scope.
pub const UNIQUE_PER_ENTITY: &str = "unique-plugin-per-entity";

/// A plugin instance; `config` is checked by the plugin validation backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Plugin {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub config: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub protocols: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<EntityRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route: Option<EntityRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consumer: Option<EntityRef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "is_default")]
    pub created_at: i64,
    #[serde(default, skip_serializing_if = "is_default")]
    pub updated_at: i64,
}

impl Named for Plugin {
    const FULL_NAME: &'static str = "gatecp.model.v1.Plugin";
}

impl_record!(Plugin);

pub fn schema() -> Schema {
    typedefs::with_record_fields(typedefs::root("Plugin", ""))
        .with_property(
            "name",
            Schema {
                min_length: Some(1),
                ..Schema::string()
            },
        )
        .with_property(
            "config",
            Schema {
                additional_properties: Some(true),
                ..Schema::object()
            },
        )
        .with_property("enabled", Schema::boolean())
        .with_property("protocols", typedefs::protocols(&typedefs::PLUGIN_PROTOCOLS))
        .with_property("service", typedefs::reference())
        .with_property("route", typedefs::reference())
        .with_property("consumer", typedefs::reference())
        .with_property("tags", typedefs::tags())
        .with_required(&["id", "name"])
}

#[derive(Debug, Clone, Default)]
pub struct PluginObject {
    pub plugin: Plugin,
}

impl PluginObject {
    pub fn new(plugin: Plugin) -> Self {
        Self { plugin }
    }
}

fn ref_id(reference: &Option<EntityRef>) -> &str {
    reference.as_ref().map_or("", |r| r.id.as_str())
}

impl Object for PluginObject {
    fn id(&self) -> &str {
        &self.plugin.id
    }

    fn type_name(&self) -> &'static str {
        TYPE
    }

    fn resource(&self) -> &dyn Message {
        &self.plugin
    }

    fn resource_mut(&mut self) -> &mut dyn Message {
        &mut self.plugin
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> std::result::Result<(), ValidationError> {
        validate_message(ctx, TYPE, &self.plugin)?;

        let Some(plugins) = ctx.plugins else {
            return Err(ValidationError::entity("no plugin validator configured"));
        };
        let value = self
            .plugin
            .to_value()
            .map_err(|err| ValidationError::entity(format!("failed to serialize plugin: {err}")))?;
        plugins.validate(ctx.request, &value)
    }

    fn process_defaults(&mut self, ctx: &ValidationContext<'_>) -> Result<()> {
        apply_record_defaults(&mut self.plugin);

        if let Some(plugins) = ctx.plugins {
            let mut value = self.plugin.to_value()?;
            plugins.process_defaults(ctx.request, &mut value)?;
            self.plugin = serde_json::from_value(value)?;
        }
        Ok(())
    }

    fn indexes(&self) -> Vec<Index> {
        let plugin = &self.plugin;
        let mut indexes = Vec::new();
        if !plugin.name.is_empty() {
            let scope = format!(
                "{}:{}:{}:{}",
                plugin.name,
                ref_id(&plugin.service),
                ref_id(&plugin.route),
                ref_id(&plugin.consumer)
            );
            indexes.push(Index::unique(UNIQUE_PER_ENTITY, scope, ""));
        }

        let references = [
            ("service", super::service::TYPE, &plugin.service),
            ("route", super::route::TYPE, &plugin.route),
            ("consumer", super::consumer::TYPE, &plugin.consumer),
        ];
        for (field, foreign_type, reference) in references {
            let id = ref_id(reference);
            if !id.is_empty() {
                indexes.push(Index::foreign(field, foreign_type, id, &format!("{field}.id")));
            }
        }
        indexes
    }
}
