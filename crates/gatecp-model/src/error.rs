use gatecp_plugin::PluginError;
use gatecp_schema::{SchemaError, ValidationError};

/// Errors raised while registering types or preparing objects.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("type already registered: {0}")]
    TypeAlreadyRegistered(String),

    #[error("protobuf message already registered: {0}")]
    MessageAlreadyRegistered(String),

    /// The wire sample names no message descriptor.
    #[error("invalid message: empty descriptor name")]
    InvalidMessage,

    #[error("type not found: {0}")]
    TypeNotFound(String),

    #[error("no type registered for message: {0}")]
    MessageNotMapped(String),

    /// The input names fields the type does not have.
    #[error("invalid entity: {0}")]
    Invalid(ValidationError),

    /// A message could not be converted to or from its JSON form.
    #[error("failed to convert message: {0}")]
    Convert(#[from] serde_json::Error),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Plugin(#[from] PluginError),
}

pub type Result<T> = std::result::Result<T, ModelError>;
