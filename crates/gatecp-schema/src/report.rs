//! Hierarchical error reports produced by the schema library.

use jsonschema::error::ValidationErrorKind;
use serde_json::Value;

/// One validator failure and the failures nested under it.
///
/// `instance_path` points into the validated value, `keyword_path` into the
/// schema (both JSON pointers). Only `anyOf`/`oneOf` failures carry causes:
/// the per-branch failures that made every branch reject the value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorNode {
    pub instance_path: String,
    pub keyword_path: String,
    pub message: String,
    pub causes: Vec<ErrorNode>,
}

impl ErrorNode {
    pub fn new(
        instance_path: impl Into<String>,
        keyword_path: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            instance_path: instance_path.into(),
            keyword_path: keyword_path.into(),
            message: message.into(),
            causes: Vec::new(),
        }
    }

    pub fn with_causes(mut self, causes: Vec<ErrorNode>) -> Self {
        self.causes = causes;
        self
    }

    /// Synthetic node wrapping every top-level failure of one validation run.
    pub fn root(causes: Vec<ErrorNode>) -> Self {
        Self::new("", "", "validation failed").with_causes(causes)
    }

    /// Convert a validator failure, including its combinator context.
    pub fn from_violation(err: &jsonschema::ValidationError<'_>) -> Self {
        let causes = match err.kind() {
            ValidationErrorKind::AnyOf { context }
            | ValidationErrorKind::OneOfNotValid { context } => context
                .iter()
                .flatten()
                .map(ErrorNode::from_violation)
                .collect(),
            _ => Vec::new(),
        };

        Self::new(
            err.instance_path().as_str(),
            err.schema_path().as_str(),
            describe(err),
        )
        .with_causes(causes)
    }
}

/// Deterministic message for a validator failure.
///
/// `required` and `format` failures get house wording; everything else keeps
/// the validator's own text.
pub fn describe(err: &jsonschema::ValidationError<'_>) -> String {
    match err.kind() {
        ValidationErrorKind::Required { property } => {
            format!("missing properties: '{}'", plain(property))
        }
        ValidationErrorKind::Format { format } => {
            format!("'{}' is not valid '{}'", plain(err.instance()), format)
        }
        _ => err.to_string(),
    }
}

fn plain(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
