use std::collections::HashMap;
use std::sync::Arc;

use jsonschema::Draft;
use serde_json::Value;
use tracing::debug;

use crate::config::ValidatorConfig;
use crate::detail::ValidationError;
use crate::document::Schema;
use crate::error::{Result, SchemaError};
use crate::format::Formats;
use crate::registry::SchemaRegistry;
use crate::report::ErrorNode;
use crate::translate::translate;

struct Compiled {
    document: Arc<Schema>,
    validator: jsonschema::Validator,
}

/// Every registered schema compiled once into an executable validator.
///
/// Built at startup from a [`SchemaRegistry`] snapshot; documents registered
/// afterwards are not seen until the next [`compile`](Validator::compile).
pub struct Validator {
    compiled: HashMap<String, Compiled>,
    config: ValidatorConfig,
}

impl Validator {
    /// Compile every document in `registry`. The first failure aborts.
    pub fn compile(
        registry: &SchemaRegistry,
        formats: &Formats,
        config: ValidatorConfig,
    ) -> Result<Self> {
        let mut compiled = HashMap::new();
        for (name, document) in registry.snapshot() {
            let validator = compile_document(&name, &document, formats, &config)?;
            compiled.insert(
                name,
                Compiled {
                    document,
                    validator,
                },
            );
        }
        debug!(
            schemas = compiled.len(),
            ?formats,
            strict = config.strict_mode,
            "compiled schemas"
        );
        Ok(Self { compiled, config })
    }

    /// Validate a canonical JSON value against the schema of `type_name`.
    ///
    /// # Panics
    ///
    /// Panics if no schema was compiled for `type_name`: every constructible
    /// type must ship a schema.
    pub fn validate(&self, type_name: &str, value: &Value) -> std::result::Result<(), ValidationError> {
        let Some(entry) = self.compiled.get(type_name) else {
            panic!("no compiled schema for type '{type_name}'");
        };

        let causes: Vec<ErrorNode> = entry
            .validator
            .iter_errors(value)
            .map(|err| ErrorNode::from_violation(&err))
            .collect();
        if causes.is_empty() {
            return Ok(());
        }

        let report = ErrorNode::root(causes);
        Err(translate(&report, &entry.document))
    }

    pub fn has_schema(&self, type_name: &str) -> bool {
        self.compiled.contains_key(type_name)
    }

    /// The document a type was compiled from.
    pub fn document(&self, type_name: &str) -> Option<&Arc<Schema>> {
        self.compiled.get(type_name).map(|entry| &entry.document)
    }

    /// Compiled type names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.compiled.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }
}

impl std::fmt::Debug for Validator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Validator")
            .field("schemas", &self.names())
            .field("config", &self.config)
            .finish()
    }
}

/// Compile one document with the injected formats.
pub fn compile_document(
    name: &str,
    document: &Schema,
    formats: &Formats,
    config: &ValidatorConfig,
) -> Result<jsonschema::Validator> {
    let mut document = document.clone();
    if config.strict_mode {
        apply_strict_mode(&mut document);
    }
    let value = document.to_value()?;

    let mut options = jsonschema::options()
        .with_draft(Draft::Draft7)
        .should_validate_formats(config.validate_formats);
    for (format, check) in formats.iter() {
        let check = Arc::clone(check);
        options = options.with_format(format.clone(), move |value: &str| check(value));
    }

    options
        .build(&value)
        .map_err(|err| SchemaError::CompileFailed {
            name: name.to_string(),
            reason: err.to_string(),
        })
}

fn apply_strict_mode(schema: &mut Schema) {
    if is_object_schema(schema) && schema.additional_properties.is_none() {
        schema.additional_properties = Some(false);
    }

    for property in schema.properties.values_mut() {
        apply_strict_mode(property);
    }
    for child in [
        &mut schema.items,
        &mut schema.not,
        &mut schema.if_,
        &mut schema.then,
        &mut schema.else_,
    ]
    .into_iter()
    .flatten()
    {
        apply_strict_mode(child);
    }
    for branch in schema
        .all_of
        .iter_mut()
        .chain(schema.any_of.iter_mut())
        .chain(schema.one_of.iter_mut())
    {
        apply_strict_mode(branch);
    }
}

// Untyped nodes sit inside combinators and constrain an object declared
// elsewhere; closing them would reject that object's own properties.
fn is_object_schema(schema: &Schema) -> bool {
    schema.type_.as_deref() == Some("object")
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::detail::ErrorDetail;

    fn service_schema() -> Schema {
        Schema::object()
            .with_property("name", Schema::string())
            .with_property(
                "port",
                Schema {
                    minimum: Some(1),
                    maximum: Some(65535),
                    ..Schema::integer()
                },
            )
            .with_required(&["name"])
    }

    fn compiled(config: ValidatorConfig) -> Validator {
        let registry = SchemaRegistry::new();
        registry.register("service", service_schema()).unwrap();
        Validator::compile(&registry, &Formats::new(), config).unwrap()
    }

    #[test]
    fn valid_value_passes() {
        let validator = compiled(ValidatorConfig::default());
        assert!(validator
            .validate("service", &json!({"name": "a", "port": 80}))
            .is_ok());
    }

    #[test]
    fn maximum_violation_is_a_field_error() {
        let validator = compiled(ValidatorConfig::default());
        let err = validator
            .validate("service", &json!({"name": "a", "port": 99999}))
            .unwrap_err();

        assert_eq!(err.len(), 1);
        assert_eq!(
            err.details()[0],
            ErrorDetail::field(
                "port",
                vec!["99999 is greater than the maximum of 65535".to_string()]
            )
        );
    }

    #[test]
    fn missing_required_is_an_entity_error() {
        let validator = compiled(ValidatorConfig::default());
        let err = validator.validate("service", &json!({})).unwrap_err();
        assert_eq!(
            err.entity_detail().unwrap().messages,
            vec!["missing properties: 'name'"]
        );
    }

    #[test]
    fn strict_mode_rejects_unknown_fields() {
        let lenient = compiled(ValidatorConfig::default());
        let strict = compiled(ValidatorConfig {
            strict_mode: true,
            ..ValidatorConfig::default()
        });
        let value = json!({"name": "a", "extra": true});

        assert!(lenient.validate("service", &value).is_ok());
        let err = strict.validate("service", &value).unwrap_err();
        assert!(err.entity_detail().is_some());
    }

    #[test]
    fn strict_mode_leaves_combinator_branches_open() {
        let mut schema = Schema {
            any_of: vec![Schema::requiring(&["a"]), Schema::requiring(&["b"])],
            then: Some(Box::new(Schema::default().with_property("a", Schema::string()))),
            ..Schema::object()
        }
        .with_property("a", Schema::string())
        .with_property("b", Schema::string());
        apply_strict_mode(&mut schema);

        assert_eq!(schema.additional_properties, Some(false));
        assert_eq!(schema.any_of[0].additional_properties, None);
        assert_eq!(schema.then.as_ref().unwrap().additional_properties, None);
        assert_eq!(schema.property("a").unwrap().additional_properties, None);
    }

    #[test]
    fn injected_formats_are_enforced() {
        let registry = SchemaRegistry::new();
        registry
            .register(
                "thing",
                Schema::object().with_property(
                    "code",
                    Schema {
                        format: Some("upper".to_string()),
                        ..Schema::string()
                    },
                ),
            )
            .unwrap();
        let mut formats = Formats::new();
        formats
            .register("upper", |v| v.chars().all(|c| c.is_ascii_uppercase()))
            .unwrap();

        let validator =
            Validator::compile(&registry, &formats, ValidatorConfig::default()).unwrap();
        assert!(validator.validate("thing", &json!({"code": "ABC"})).is_ok());
        let err = validator
            .validate("thing", &json!({"code": "abc"}))
            .unwrap_err();
        assert_eq!(
            err.field_detail("code").unwrap().messages,
            vec!["'abc' is not valid 'upper'"]
        );

        let unchecked = Validator::compile(
            &registry,
            &formats,
            ValidatorConfig {
                validate_formats: false,
                ..ValidatorConfig::default()
            },
        )
        .unwrap();
        assert!(unchecked.validate("thing", &json!({"code": "abc"})).is_ok());
    }

    #[test]
    fn broken_document_fails_compilation() {
        let registry = SchemaRegistry::new();
        registry
            .register(
                "broken",
                Schema {
                    pattern: Some("(".to_string()),
                    ..Schema::string()
                },
            )
            .unwrap();

        let err = Validator::compile(&registry, &Formats::new(), ValidatorConfig::default())
            .unwrap_err();
        assert!(matches!(err, SchemaError::CompileFailed { name, .. } if name == "broken"));
    }

    #[test]
    #[should_panic(expected = "no compiled schema")]
    fn unknown_type_panics() {
        let validator = compiled(ValidatorConfig::default());
        let _ = validator.validate("route", &json!({}));
    }
}
