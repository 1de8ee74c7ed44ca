use std::io::IsTerminal;

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use gatecp_schema::{ErrorType, ValidationError};
use serde::Serialize;
use serde_json::Value;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct ValidationOutput<'a> {
    schema_id: &'static str,
    #[serde(rename = "type")]
    type_name: &'a str,
    valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    entity: Option<&'a Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<&'a ValidationError>,
}

/// Print the outcome of one validation. `entity` is the defaulted object.
pub fn print_validation(
    type_name: &str,
    entity: &Value,
    result: &Result<(), ValidationError>,
    format: OutputFormat,
) {
    match format {
        OutputFormat::Json => {
            let out = ValidationOutput {
                schema_id: "https://schemas.gatecp.dev/cli/v1/validation-result.schema.json",
                type_name,
                valid: result.is_ok(),
                entity: result.is_ok().then_some(entity),
                errors: result.as_ref().err(),
            };
            println!("{}", to_json(&out));
        }
        OutputFormat::Table => match result {
            Ok(()) => println!("{type_name}: valid"),
            Err(err) => {
                let mut table = Table::new();
                table
                    .load_preset(UTF8_FULL)
                    .set_content_arrangement(ContentArrangement::Dynamic)
                    .set_header(vec!["TYPE", "FIELD", "MESSAGES"]);
                for detail in err.details() {
                    table.add_row(vec![
                        kind_label(detail.kind).to_string(),
                        detail.field.clone(),
                        detail.messages.join("\n"),
                    ]);
                }
                println!("{table}");
            }
        },
        OutputFormat::Pretty => match result {
            Ok(()) => println!("{}", to_json_pretty(entity)),
            Err(err) => {
                println!("{type_name}: invalid");
                for detail in err.details() {
                    let target = if detail.field.is_empty() {
                        "(entity)"
                    } else {
                        detail.field.as_str()
                    };
                    for message in &detail.messages {
                        println!("  {target}: {message}");
                    }
                }
            }
        },
    }
}

/// Print rows as a table, or as a JSON array of objects keyed by `header`.
pub fn print_rows(header: &[&str], rows: &[Vec<String>], format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let objects: Vec<Value> = rows
                .iter()
                .map(|row| {
                    let fields = header
                        .iter()
                        .zip(row)
                        .map(|(key, value)| (key.to_lowercase(), Value::String(value.clone())))
                        .collect();
                    Value::Object(fields)
                })
                .collect();
            println!("{}", to_json(&objects));
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(header.to_vec());
            for row in rows {
                table.add_row(row.clone());
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for row in rows {
                println!("{}", row.join("  "));
            }
        }
    }
}

/// Print a JSON document: compact for `json`, indented otherwise.
pub fn print_document(value: &Value, format: OutputFormat) {
    match format {
        OutputFormat::Json => println!("{}", to_json(value)),
        OutputFormat::Table | OutputFormat::Pretty => println!("{}", to_json_pretty(value)),
    }
}

fn kind_label(kind: ErrorType) -> &'static str {
    match kind {
        ErrorType::Field => "FIELD",
        ErrorType::Entity => "ENTITY",
    }
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
}

fn to_json_pretty<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn validation_json_carries_the_error_shape() {
        let err = ValidationError::field("port", "99999 is greater than the maximum of 65535");
        let out = ValidationOutput {
            schema_id: "x",
            type_name: "service",
            valid: false,
            entity: None,
            errors: Some(&err),
        };

        let value: Value = serde_json::from_str(&to_json(&out)).unwrap();
        assert_eq!(
            value,
            json!({
                "schema_id": "x",
                "type": "service",
                "valid": false,
                "errors": [{
                    "type": "FIELD",
                    "field": "port",
                    "messages": ["99999 is greater than the maximum of 65535"],
                }],
            })
        );
    }
}
