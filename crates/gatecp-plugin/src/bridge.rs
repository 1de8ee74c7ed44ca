use gatecp_schema::ValidationError;
use include_dir::Dir;
use serde_json::Value;

use crate::context::Context;
use crate::error::Result;

/// Validation backend for plugins whose schemas are authored at runtime.
///
/// Plugins cross this boundary as their canonical JSON form
/// (`{"name", "config", "enabled", "protocols", ...}`). Implementations must
/// return details sorted by field and then type.
pub trait PluginValidator: Send + Sync {
    /// Validate a plugin against the schema named by its `name`.
    fn validate(&self, ctx: &Context, plugin: &Value) -> std::result::Result<(), ValidationError>;

    /// Fill unset plugin fields from its schema. Unknown plugins are left
    /// untouched for [`validate`](Self::validate) to report.
    fn process_defaults(&self, ctx: &Context, plugin: &mut Value) -> Result<()>;

    /// Load every bundled schema file under `dir`.
    fn load_schemas_from_embed(&self, dir: &Dir<'_>) -> Result<()>;

    /// Check a caller-supplied schema source and return the name it derives.
    fn validate_schema(&self, ctx: &Context, source: &str) -> std::result::Result<String, ValidationError>;

    /// The schema source loaded under `name`.
    fn get_raw_schema(&self, ctx: &Context, name: &str) -> Result<Value>;

    /// Names of every loaded schema, sorted.
    fn get_available_names(&self) -> Vec<String>;
}
