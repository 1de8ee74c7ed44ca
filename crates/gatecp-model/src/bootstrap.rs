use std::path::Path;
use std::sync::Arc;

use gatecp_plugin::{Context, PluginValidator, SchemaPluginValidator, StoreLoader, BUNDLED_SCHEMAS};
use gatecp_schema::{SchemaRegistry, ValidatorConfig, Validator};
use serde_json::Value;
use tracing::{debug, info};

use crate::error::{ModelError, Result};
use crate::formats::builtin_formats;
use crate::object::{check_known_fields, Object, ValidationContext};
use crate::resources::register_builtin;
use crate::types::TypeRegistry;

/// Where plugin schemas come from beyond the bundled set.
#[derive(Default)]
pub struct PluginSources<'a> {
    /// Directory of extra `.json` plugin schemas.
    pub directory: Option<&'a Path>,
    /// Store lookup for schemas authored at runtime.
    pub loader: Option<Arc<dyn StoreLoader>>,
}

/// Everything needed to default and validate objects, built once at startup.
pub struct Engine {
    pub types: TypeRegistry,
    pub schemas: SchemaRegistry,
    pub validator: Validator,
    pub plugins: Box<dyn PluginValidator>,
}

impl Engine {
    /// Register the bundled types, compile their schemas and load the bundled
    /// plugin schemas. Any failure here is a configuration error.
    pub fn bootstrap(config: ValidatorConfig) -> Result<Self> {
        Self::bootstrap_with(config, PluginSources::default())
    }

    pub fn bootstrap_with(config: ValidatorConfig, sources: PluginSources<'_>) -> Result<Self> {
        let types = TypeRegistry::new();
        let schemas = SchemaRegistry::new();
        register_builtin(&types, &schemas)?;

        let formats = builtin_formats()?;
        let validator = Validator::compile(&schemas, &formats, config)?;

        let plugins = match sources.loader {
            Some(loader) => SchemaPluginValidator::with_loader(loader),
            None => SchemaPluginValidator::new(),
        };
        plugins.load_schemas_from_embed(&BUNDLED_SCHEMAS)?;
        if let Some(dir) = sources.directory {
            let loaded = plugins.load_directory(dir)?;
            debug!(dir = %dir.display(), loaded, "loaded plugin schemas from directory");
        }

        info!(
            types = schemas.len(),
            plugins = plugins.get_available_names().len(),
            strict = config.strict_mode,
            "engine ready"
        );
        Ok(Self {
            types,
            schemas,
            validator,
            plugins: Box::new(plugins),
        })
    }

    /// A validation context for one request.
    pub fn context<'a>(&'a self, request: &'a Context) -> ValidationContext<'a> {
        ValidationContext::new(&self.validator, request).with_plugins(self.plugins.as_ref())
    }

    /// Build an object of `type_name` from its JSON form.
    ///
    /// Undeclared fields fail with [`ModelError::Invalid`] naming each one.
    pub fn object_from_value(&self, type_name: &str, value: Value) -> Result<Box<dyn Object>> {
        let mut object = self.types.new_object(type_name)?;
        if let Some(document) = self.validator.document(type_name) {
            check_known_fields(document, &value).map_err(ModelError::Invalid)?;
        }
        object.resource_mut().merge_value(value)?;
        Ok(object)
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("types", &self.types)
            .field("schemas", &self.schemas.names())
            .field("plugins", &self.plugins.get_available_names())
            .finish()
    }
}
