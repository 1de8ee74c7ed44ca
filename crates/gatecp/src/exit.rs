use std::fmt;
use std::io;

use gatecp_model::ModelError;
use gatecp_plugin::PluginError;
use gatecp_schema::SchemaError;

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied => FAILURE,
        io::ErrorKind::InvalidData => DATA_INVALID,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn schema_error(context: &str, err: SchemaError) -> CliError {
    match err {
        SchemaError::NotFound(_) => CliError::new(USAGE, format!("{context}: {err}")),
        SchemaError::ExportFailed(_) => CliError::new(FAILURE, format!("{context}: {err}")),
        other => CliError::new(INTERNAL, format!("{context}: {other}")),
    }
}

pub fn plugin_error(context: &str, err: PluginError) -> CliError {
    match err {
        PluginError::NotFound(_) => CliError::new(USAGE, format!("{context}: {err}")),
        PluginError::InvalidSource(_) | PluginError::AlreadyLoaded(_) => {
            CliError::new(DATA_INVALID, format!("{context}: {err}"))
        }
        other => CliError::new(INTERNAL, format!("{context}: {other}")),
    }
}

pub fn model_error(context: &str, err: ModelError) -> CliError {
    match err {
        ModelError::TypeNotFound(_) => CliError::new(USAGE, format!("{context}: {err}")),
        ModelError::Convert(_) | ModelError::Invalid(_) => {
            CliError::new(DATA_INVALID, format!("{context}: {err}"))
        }
        ModelError::Schema(err) => schema_error(context, err),
        ModelError::Plugin(err) => plugin_error(context, err),
        other => CliError::new(INTERNAL, format!("{context}: {other}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_type_is_a_usage_error() {
        let err = model_error("validate", ModelError::TypeNotFound("upstream".to_string()));
        assert_eq!(err.code, USAGE);
        assert_eq!(err.message, "validate: type not found: upstream");
    }

    #[test]
    fn bootstrap_failures_are_internal() {
        let err = model_error(
            "bootstrap",
            ModelError::Schema(SchemaError::CompileFailed {
                name: "service".to_string(),
                reason: "bad".to_string(),
            }),
        );
        assert_eq!(err.code, INTERNAL);
    }

    #[test]
    fn missing_file_is_a_failure() {
        let err = io_error("read", io::Error::from(io::ErrorKind::NotFound));
        assert_eq!(err.code, FAILURE);
    }
}
