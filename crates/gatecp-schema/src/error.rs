/// Errors raised while registering, compiling or exporting schemas.
///
/// These describe defects in bundled configuration, not bad user input. User
/// input failures are reported as [`crate::ValidationError`].
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// A schema is already registered under this name.
    #[error("schema already registered: {0}")]
    AlreadyRegistered(String),

    /// No schema is registered under this name.
    #[error("schema not found: {0}")]
    NotFound(String),

    /// A format predicate is already registered under this name.
    #[error("format already registered: {0}")]
    DuplicateFormat(String),

    /// The schema could not be compiled.
    #[error("failed to compile schema '{name}': {reason}")]
    CompileFailed { name: String, reason: String },

    /// The schema document is not valid JSON or does not fit the document model.
    #[error("invalid schema document: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// Schemas could not be written to disk.
    #[error("failed to export schemas: {0}")]
    ExportFailed(String),
}

pub type Result<T> = std::result::Result<T, SchemaError>;
