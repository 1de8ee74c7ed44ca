use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;
use tracing::debug;

use crate::document::Schema;
use crate::error::{Result, SchemaError};

const SCHEMA_FILE_SUFFIX: &str = ".schema.json";

/// Type-name keyed table of schema documents.
///
/// Registration happens at startup; reads happen on every validation. The
/// table is guarded by a reader/writer lock so one instance can be shared
/// process-wide, while tests construct isolated instances with [`new`].
///
/// [`new`]: SchemaRegistry::new
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    schemas: RwLock<HashMap<String, Arc<Schema>>>,
}

impl SchemaRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide default registry.
    pub fn global() -> &'static SchemaRegistry {
        static GLOBAL: OnceLock<SchemaRegistry> = OnceLock::new();
        GLOBAL.get_or_init(SchemaRegistry::new)
    }

    /// Register a document under a type name.
    pub fn register(&self, name: &str, schema: Schema) -> Result<()> {
        let mut schemas = self.schemas.write();
        if schemas.contains_key(name) {
            return Err(SchemaError::AlreadyRegistered(name.to_string()));
        }
        schemas.insert(name.to_string(), Arc::new(schema));
        debug!(schema = name, "registered schema");
        Ok(())
    }

    /// Register a document from its JSON text.
    pub fn register_json(&self, name: &str, json: &str) -> Result<()> {
        let schema = Schema::from_json(json)?;
        self.register(name, schema)
    }

    /// Remove a document. Only meant for test isolation.
    pub fn unregister(&self, name: &str) -> Result<()> {
        match self.schemas.write().remove(name) {
            Some(_) => {
                debug!(schema = name, "unregistered schema");
                Ok(())
            }
            None => Err(SchemaError::NotFound(name.to_string())),
        }
    }

    /// Fetch the document for a type name.
    pub fn get(&self, name: &str) -> Result<Arc<Schema>> {
        self.schemas
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| SchemaError::NotFound(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.schemas.read().contains_key(name)
    }

    /// Registered type names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.schemas.read().keys().cloned().collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.schemas.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.read().is_empty()
    }

    /// All documents, sorted by name.
    pub fn snapshot(&self) -> Vec<(String, Arc<Schema>)> {
        let mut entries: Vec<(String, Arc<Schema>)> = self
            .schemas
            .read()
            .iter()
            .map(|(name, schema)| (name.clone(), Arc::clone(schema)))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }

    /// Write every document to `dir` as `<name>.schema.json`.
    ///
    /// Returns the number of files written. Existing regular files are
    /// replaced; symlinks are refused.
    pub fn export_to_directory(&self, dir: &Path) -> Result<usize> {
        std::fs::create_dir_all(dir)
            .map_err(|err| SchemaError::ExportFailed(format!("{}: {err}", dir.display())))?;

        let entries = self.snapshot();
        for (name, schema) in &entries {
            let path = dir.join(format!("{name}{SCHEMA_FILE_SUFFIX}"));
            if let Ok(metadata) = std::fs::symlink_metadata(&path) {
                if metadata.file_type().is_symlink() {
                    return Err(SchemaError::ExportFailed(format!(
                        "refusing to overwrite schema symlink: {}",
                        path.display()
                    )));
                }
            }

            let mut content = serde_json::to_string_pretty(schema.as_ref())?;
            content.push('\n');
            std::fs::write(&path, content).map_err(|err| {
                SchemaError::ExportFailed(format!("failed writing {}: {err}", path.display()))
            })?;
            debug!(schema = %name, path = %path.display(), "exported schema");
        }

        Ok(entries.len())
    }
}
