//! A [`PluginValidator`] backed by JSON Schema.
//!
//! Every plugin schema source is a JSON document:
//!
//! ```json
//! {
//!   "name": "rate-limiting",
//!   "protocols": ["http", "https"],
//!   "config": { "type": "object", "properties": { "minute": { "type": "integer" } } },
//!   "entity_checks": [ { "at_least_one_of": ["second", "minute"] } ]
//! }
//! ```
//!
//! `config` is compiled with the same schema library as the built-in
//! resources. Failures are reported as a nested payload and flattened.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use gatecp_schema::report::describe;
use gatecp_schema::ValidationError;
use include_dir::{Dir, File};
use jsonschema::error::ValidationErrorKind;
use jsonschema::Draft;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::bridge::PluginValidator;
use crate::context::Context;
use crate::error::{PluginError, Result};
use crate::flatten::{flatten, NAME_KEY};
use crate::store::StoreLoader;

/// Protocols a plugin runs on when its schema does not narrow them.
pub const DEFAULT_PROTOCOLS: [&str; 4] = ["grpc", "grpcs", "http", "https"];

const REQUIRED_FIELD: &str = "required field missing";
const UNKNOWN_FIELD: &str = "unknown field";

/// Cross-field rule over `config` properties.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityCheck {
    AtLeastOneOf(Vec<String>),
    MutuallyExclusive(Vec<String>),
}

impl EntityCheck {
    fn violation(&self, config: &Map<String, Value>) -> Option<String> {
        let is_set = |field: &String| config.get(field).is_some_and(|value| !value.is_null());
        match self {
            Self::AtLeastOneOf(fields) if !fields.iter().any(is_set) => Some(format!(
                "at least one of these fields must be non-empty: {}",
                quoted(fields)
            )),
            Self::MutuallyExclusive(fields) if fields.iter().filter(|&f| is_set(f)).count() > 1 => {
                Some(format!(
                    "only one or none of these fields must be set: {}",
                    quoted(fields)
                ))
            }
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct SchemaSource {
    name: String,
    config: Value,
    #[serde(default)]
    protocols: Vec<String>,
    #[serde(default)]
    entity_checks: Vec<EntityCheck>,
}

struct LoadedSchema {
    name: String,
    raw: Value,
    config: Value,
    protocols: Vec<String>,
    entity_checks: Vec<EntityCheck>,
    validator: jsonschema::Validator,
}

impl LoadedSchema {
    fn parse(source: &str) -> Result<Self> {
        let raw: Value =
            serde_json::from_str(source).map_err(|err| PluginError::InvalidSource(err.to_string()))?;
        let parsed: SchemaSource = serde_json::from_value(raw.clone())
            .map_err(|err| PluginError::InvalidSource(err.to_string()))?;

        let name = parsed.name.trim().to_string();
        if name.is_empty() {
            return Err(PluginError::InvalidSource(
                "plugin schema name must not be empty".to_string(),
            ));
        }

        let validator = jsonschema::options()
            .with_draft(Draft::Draft7)
            .build(&parsed.config)
            .map_err(|err| PluginError::CompileFailed {
                name: name.clone(),
                reason: err.to_string(),
            })?;

        Ok(Self {
            name,
            raw,
            config: parsed.config,
            protocols: parsed.protocols,
            entity_checks: parsed.entity_checks,
            validator,
        })
    }

    fn protocols(&self) -> Vec<String> {
        if self.protocols.is_empty() {
            DEFAULT_PROTOCOLS.iter().map(|p| p.to_string()).collect()
        } else {
            self.protocols.clone()
        }
    }

    fn check(&self, plugin: &Map<String, Value>) -> Payload {
        let mut payload = Payload::default();

        let empty = Value::Object(Map::new());
        let config = match plugin.get("config") {
            None | Some(Value::Null) => &empty,
            Some(config) => config,
        };
        for err in self.validator.iter_errors(config) {
            let mut path = vec!["config".to_string()];
            path.extend(pointer_segments(err.instance_path().as_str()));
            match err.kind() {
                ValidationErrorKind::Required { property } => {
                    payload.insert(&with_key(&path, property), REQUIRED_FIELD);
                }
                ValidationErrorKind::AdditionalProperties { unexpected } => {
                    for property in unexpected {
                        payload.insert(&with_key(&path, &Value::String(property.clone())), UNKNOWN_FIELD);
                    }
                }
                _ => payload.insert(&path, &describe(&err)),
            }
        }

        match plugin.get("protocols") {
            None | Some(Value::Null) => {}
            Some(Value::Array(items)) => {
                let allowed = self.protocols();
                for (index, item) in items.iter().enumerate() {
                    let known = item
                        .as_str()
                        .is_some_and(|protocol| allowed.iter().any(|p| p == protocol));
                    if !known {
                        payload.insert(
                            &["protocols".to_string(), index.to_string()],
                            &format!("expected one of: {}", allowed.join(", ")),
                        );
                    }
                }
            }
            Some(_) => payload.insert(&["protocols".to_string()], "expected an array"),
        }

        if let Value::Object(fields) = config {
            for check in &self.entity_checks {
                if let Some(message) = check.violation(fields) {
                    payload.entity(message);
                }
            }
        }

        payload
    }
}

/// Nested error payload; the first message for a path wins.
#[derive(Debug, Default)]
struct Payload {
    fields: Map<String, Value>,
    entity: Vec<String>,
}

impl Payload {
    fn insert(&mut self, path: &[String], message: &str) {
        let Some((last, parents)) = path.split_last() else {
            self.entity(message.to_string());
            return;
        };

        let mut map = &mut self.fields;
        for key in parents {
            let slot = map
                .entry(key.clone())
                .or_insert_with(|| Value::Object(Map::new()));
            match slot {
                Value::Object(inner) => map = inner,
                _ => return,
            }
        }
        map.entry(last.clone())
            .or_insert_with(|| Value::String(message.to_string()));
    }

    fn entity(&mut self, message: String) {
        if !self.entity.contains(&message) {
            self.entity.push(message);
        }
    }

    fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.entity.is_empty()
    }

    fn into_value(self) -> Value {
        let mut fields = self.fields;
        if !self.entity.is_empty() {
            let messages = self.entity.into_iter().map(Value::String).collect();
            fields.insert(crate::flatten::ENTITY_KEY.to_string(), Value::Array(messages));
        }
        Value::Object(fields)
    }
}

/// Validates plugins against JSON Schema sources.
///
/// Bundled sources are loaded at startup; others are loaded on first use from
/// the store of the request's cluster.
pub struct SchemaPluginValidator {
    schemas: RwLock<BTreeMap<String, Arc<LoadedSchema>>>,
    loader: Option<Arc<dyn StoreLoader>>,
}

impl SchemaPluginValidator {
    pub fn new() -> Self {
        Self {
            schemas: RwLock::new(BTreeMap::new()),
            loader: None,
        }
    }

    /// Resolve unknown plugin names through `loader`.
    pub fn with_loader(loader: Arc<dyn StoreLoader>) -> Self {
        Self {
            loader: Some(loader),
            ..Self::new()
        }
    }

    /// Load a schema source and return the name it was loaded under.
    pub fn load_schema(&self, source: &str) -> Result<String> {
        let loaded = LoadedSchema::parse(source)?;
        let name = loaded.name.clone();

        let mut schemas = self.schemas.write();
        if schemas.contains_key(&name) {
            return Err(PluginError::AlreadyLoaded(name));
        }
        schemas.insert(name.clone(), Arc::new(loaded));
        debug!(plugin = %name, "loaded plugin schema");
        Ok(name)
    }

    /// Load every `.json` file found under `dir`, recursively.
    pub fn load_directory(&self, dir: &Path) -> Result<usize> {
        let mut paths = Vec::new();
        collect_directory_files(dir, &mut paths)?;
        paths.sort();

        for path in &paths {
            let source = std::fs::read_to_string(path).map_err(|err| {
                PluginError::InvalidSource(format!("{}: {err}", path.display()))
            })?;
            self.load_schema(&source)?;
        }
        Ok(paths.len())
    }

    fn resolve(&self, ctx: &Context, name: &str) -> Result<Option<Arc<LoadedSchema>>> {
        if let Some(loaded) = self.schemas.read().get(name) {
            return Ok(Some(Arc::clone(loaded)));
        }
        let Some(loader) = &self.loader else {
            return Ok(None);
        };

        let cluster = ctx.cluster.as_ref().ok_or(PluginError::MissingCluster)?;
        let store = loader.load(cluster)?;
        let Some(source) = store.get(name)? else {
            return Ok(None);
        };

        let loaded = LoadedSchema::parse(&source)?;
        if loaded.name != name {
            return Err(PluginError::InvalidSource(format!(
                "stored schema '{name}' derives name '{}'",
                loaded.name
            )));
        }

        let mut schemas = self.schemas.write();
        let entry = schemas
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(loaded));
        debug!(plugin = name, cluster = %cluster.id, "loaded plugin schema from store");
        Ok(Some(Arc::clone(entry)))
    }
}

impl Default for SchemaPluginValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl PluginValidator for SchemaPluginValidator {
    fn validate(&self, ctx: &Context, plugin: &Value) -> std::result::Result<(), ValidationError> {
        let Some(fields) = plugin.as_object() else {
            return Err(ValidationError::entity(PluginError::InvalidPlugin.to_string()));
        };
        let name = fields.get("name").and_then(Value::as_str).unwrap_or_default();
        if name.is_empty() {
            return Err(ValidationError::field(NAME_KEY, REQUIRED_FIELD));
        }

        let schema = match self.resolve(ctx, name) {
            Ok(Some(schema)) => schema,
            Ok(None) => {
                let mut payload = Map::new();
                payload.insert(NAME_KEY.to_string(), Value::String(name.to_string()));
                return Err(flatten(&Value::Object(payload), name));
            }
            Err(err) => {
                warn!(plugin = name, error = %err, "failed to resolve plugin schema");
                return Err(ValidationError::field(NAME_KEY, err.to_string()));
            }
        };

        let payload = schema.check(fields);
        if payload.is_empty() {
            Ok(())
        } else {
            Err(flatten(&payload.into_value(), name))
        }
    }

    fn process_defaults(&self, ctx: &Context, plugin: &mut Value) -> Result<()> {
        let Some(fields) = plugin.as_object_mut() else {
            return Err(PluginError::InvalidPlugin);
        };
        let name = fields
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        if name.is_empty() {
            return Ok(());
        }
        let Some(schema) = self.resolve(ctx, &name)? else {
            return Ok(());
        };

        if fields.get("enabled").map_or(true, Value::is_null) {
            fields.insert("enabled".to_string(), Value::Bool(true));
        }

        let needs_protocols = match fields.get("protocols") {
            None | Some(Value::Null) => true,
            Some(Value::Array(items)) => items.is_empty(),
            Some(_) => false,
        };
        if needs_protocols {
            let protocols = schema.protocols().into_iter().map(Value::String).collect();
            fields.insert("protocols".to_string(), Value::Array(protocols));
        }

        let config = fields
            .entry("config".to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if config.is_null() {
            *config = Value::Object(Map::new());
        }
        apply_defaults(&schema.config, config);
        Ok(())
    }

    fn load_schemas_from_embed(&self, dir: &Dir<'_>) -> Result<()> {
        let mut files = Vec::new();
        collect_embedded_files(dir, &mut files);
        files.sort_by(|a, b| a.path().cmp(b.path()));

        for file in &files {
            let path = file.path().display().to_string();
            let source = file.contents_utf8().ok_or_else(|| PluginError::Embedded {
                path: path.clone(),
                reason: "not valid UTF-8".to_string(),
            })?;
            self.load_schema(source).map_err(|err| PluginError::Embedded {
                path,
                reason: err.to_string(),
            })?;
        }
        debug!(schemas = files.len(), "loaded bundled plugin schemas");
        Ok(())
    }

    fn validate_schema(&self, ctx: &Context, source: &str) -> std::result::Result<String, ValidationError> {
        let loaded = LoadedSchema::parse(source)
            .map_err(|err| ValidationError::field("schema", err.to_string()))?;

        // stored names count as taken even before they are first loaded
        match self.resolve(ctx, &loaded.name) {
            Ok(None) => Ok(loaded.name),
            Ok(Some(_)) => Err(ValidationError::entity(format!(
                "unique constraint failed: plugin schema '{}' already exists",
                loaded.name
            ))),
            Err(err) => {
                warn!(plugin = %loaded.name, error = %err, "failed to check plugin schema name");
                Err(ValidationError::field(NAME_KEY, err.to_string()))
            }
        }
    }

    fn get_raw_schema(&self, ctx: &Context, name: &str) -> Result<Value> {
        match self.resolve(ctx, name)? {
            Some(loaded) => Ok(loaded.raw.clone()),
            None => Err(PluginError::NotFound(name.to_string())),
        }
    }

    fn get_available_names(&self) -> Vec<String> {
        self.schemas.read().keys().cloned().collect()
    }
}

/// The plugin name a schema source loads under.
pub fn derive_name(source: &str) -> Result<String> {
    let raw: Value =
        serde_json::from_str(source).map_err(|err| PluginError::InvalidSource(err.to_string()))?;
    let name = raw
        .get("name")
        .and_then(Value::as_str)
        .map(str::trim)
        .unwrap_or_default();
    if name.is_empty() {
        return Err(PluginError::InvalidSource(
            "plugin schema name must not be empty".to_string(),
        ));
    }
    Ok(name.to_string())
}

// Fill absent properties from `default` annotations; set values are kept.
fn apply_defaults(schema: &Value, value: &mut Value) {
    let (Some(properties), Value::Object(target)) =
        (schema.get("properties").and_then(Value::as_object), value)
    else {
        return;
    };

    for (key, property) in properties {
        let is_set = target.get(key).is_some_and(|existing| !existing.is_null());
        if is_set {
            if let Some(existing) = target.get_mut(key) {
                apply_defaults(property, existing);
            }
            continue;
        }

        if let Some(default) = property.get("default") {
            target.insert(key.clone(), default.clone());
        } else if property.get("properties").is_some() {
            let mut nested = Value::Object(Map::new());
            apply_defaults(property, &mut nested);
            if nested.as_object().is_some_and(|map| !map.is_empty()) {
                target.insert(key.clone(), nested);
            }
        }
    }
}

fn collect_embedded_files<'a>(dir: &'a Dir<'a>, files: &mut Vec<&'a File<'a>>) {
    for file in dir.files() {
        if file.path().extension().is_some_and(|ext| ext == "json") {
            files.push(file);
        }
    }
    for subdir in dir.dirs() {
        collect_embedded_files(subdir, files);
    }
}

fn collect_directory_files(dir: &Path, paths: &mut Vec<std::path::PathBuf>) -> Result<()> {
    let entries = std::fs::read_dir(dir)
        .map_err(|err| PluginError::InvalidSource(format!("{}: {err}", dir.display())))?;
    for entry in entries {
        let path = entry
            .map_err(|err| PluginError::InvalidSource(format!("{}: {err}", dir.display())))?
            .path();
        if path.is_dir() {
            collect_directory_files(&path, paths)?;
        } else if path.extension().is_some_and(|ext| ext == "json") {
            paths.push(path);
        }
    }
    Ok(())
}

fn with_key(path: &[String], key: &Value) -> Vec<String> {
    let mut path = path.to_vec();
    path.push(match key {
        Value::String(key) => key.clone(),
        other => other.to_string(),
    });
    path
}

fn pointer_segments(pointer: &str) -> Vec<String> {
    match pointer.strip_prefix('/') {
        Some(rest) => rest
            .split('/')
            .map(|segment| segment.replace("~1", "/").replace("~0", "~"))
            .collect(),
        None => Vec::new(),
    }
}

fn quoted(fields: &[String]) -> String {
    fields
        .iter()
        .map(|field| format!("'config.{field}'"))
        .collect::<Vec<_>>()
        .join(", ")
}
