use crate::store::StoreError;

/// Errors raised by a plugin validation backend.
#[derive(Debug, thiserror::Error)]
pub enum PluginError {
    /// No schema is loaded (or stored) under this plugin name.
    #[error("plugin schema not found: {0}")]
    NotFound(String),

    /// The schema source could not be parsed.
    #[error("invalid plugin schema source: {0}")]
    InvalidSource(String),

    /// A schema with the derived name is already loaded.
    #[error("plugin schema already loaded: {0}")]
    AlreadyLoaded(String),

    /// The `config` schema of a plugin could not be compiled.
    #[error("failed to compile plugin schema '{name}': {reason}")]
    CompileFailed { name: String, reason: String },

    /// A bundled schema file is unreadable.
    #[error("embedded plugin schema {path}: {reason}")]
    Embedded { path: String, reason: String },

    /// A store lookup was needed but the request carries no cluster reference.
    #[error("request context carries no cluster reference")]
    MissingCluster,

    /// The plugin value is not a JSON object.
    #[error("plugin must be a JSON object")]
    InvalidPlugin,

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, PluginError>;
