#![cfg(feature = "cli")]

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use serde_json::Value;

fn unique_temp_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "gatecp-cli-{tag}-{}-{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time should be after epoch")
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).expect("temp dir should be creatable");
    dir
}

fn gatecp(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_gatecp"))
        .args(["--log-level", "error", "--format", "json"])
        .args(args)
        .env_remove("GATECP_STRICT")
        .env_remove("GATECP_PLUGIN_SCHEMAS")
        .output()
        .expect("gatecp should run")
}

fn stdout_json(output: &Output) -> Value {
    serde_json::from_slice(&output.stdout).expect("stdout should be JSON")
}

fn write_entity(dir: &Path, name: &str, body: &str) -> String {
    let path = dir.join(name);
    std::fs::write(&path, body).expect("entity file should be writable");
    path.display().to_string()
}

#[test]
fn types_lists_bundled_entities() {
    let output = gatecp(&["types"]);
    assert!(output.status.success());

    let rows = stdout_json(&output);
    let rows = rows.as_array().expect("types should print an array");
    assert_eq!(rows.len(), 8);
    let ca = rows
        .iter()
        .find(|row| row["type"] == "ca_certificate")
        .expect("ca_certificate should be listed");
    assert_eq!(ca["message"], "gatecp.model.v1.CACertificate");
    assert_eq!(ca["api_path"], "ca-certificates");
}

#[test]
fn validate_accepts_a_defaulted_service() {
    let dir = unique_temp_dir("valid");
    let file = write_entity(&dir, "service.json", r#"{"url": "https://example.com/api"}"#);

    let output = gatecp(&["validate", &file, "--type", "service"]);
    assert_eq!(output.status.code(), Some(0));

    let result = stdout_json(&output);
    assert_eq!(result["valid"], true);
    assert_eq!(result["entity"]["host"], "example.com");
    assert_eq!(result["entity"]["port"], 443);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn validate_reports_errors_with_exit_60() {
    let dir = unique_temp_dir("invalid");
    let file = write_entity(&dir, "service.json", r#"{"host": "example.com", "port": 99999}"#);

    let output = gatecp(&["validate", &file, "--type", "service"]);
    assert_eq!(output.status.code(), Some(60));

    let result = stdout_json(&output);
    assert_eq!(result["valid"], false);
    assert_eq!(
        result["errors"],
        serde_json::json!([{
            "type": "FIELD",
            "field": "port",
            "messages": ["99999 is greater than the maximum of 65535"],
        }])
    );

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn validate_names_misspelled_fields() {
    let dir = unique_temp_dir("typo");
    let file = write_entity(&dir, "service.json", r#"{"host": "a.b", "prot": "https"}"#);

    let output = gatecp(&["validate", &file, "--type", "service"]);
    assert_eq!(output.status.code(), Some(60));

    let result = stdout_json(&output);
    assert_eq!(result["valid"], false);
    assert_eq!(
        result["errors"],
        serde_json::json!([{
            "type": "FIELD",
            "field": "prot",
            "messages": ["unknown field"],
        }])
    );

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn validate_without_defaults_sees_missing_id() {
    let dir = unique_temp_dir("nodefaults");
    let file = write_entity(&dir, "consumer.json", r#"{"username": "alice"}"#);

    let output = gatecp(&["validate", &file, "--type", "consumer", "--no-defaults"]);
    assert_eq!(output.status.code(), Some(60));
    let result = stdout_json(&output);
    assert_eq!(result["errors"][0]["type"], "ENTITY");
    assert_eq!(result["errors"][0]["messages"][0], "missing properties: 'id'");

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn unknown_type_is_a_usage_error() {
    let dir = unique_temp_dir("unknown");
    let file = write_entity(&dir, "thing.json", "{}");

    let output = gatecp(&["validate", &file, "--type", "upstream"]);
    assert_eq!(output.status.code(), Some(64));
    assert!(String::from_utf8_lossy(&output.stderr).contains("type not found: upstream"));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn malformed_json_is_data_invalid() {
    let dir = unique_temp_dir("malformed");
    let file = write_entity(&dir, "service.json", "{");

    let output = gatecp(&["validate", &file, "--type", "service"]);
    assert_eq!(output.status.code(), Some(60));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn schema_prints_the_document() {
    let output = gatecp(&["schema", "consumer"]);
    assert!(output.status.success());

    let document = stdout_json(&output);
    assert_eq!(document["title"], "Consumer");
    assert_eq!(document["anyOf"].as_array().map(Vec::len), Some(2));
}

#[test]
fn export_writes_one_file_per_type() {
    let dir = unique_temp_dir("export");
    let out = dir.join("schemas");

    let output = gatecp(&["export", &out.display().to_string()]);
    assert!(output.status.success());
    assert_eq!(stdout_json(&output)["written"], 8);
    assert!(out.join("service.schema.json").is_file());
    assert!(out.join("plugin_schema.schema.json").is_file());

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn plugins_include_schemas_from_a_directory() {
    let dir = unique_temp_dir("plugins");
    std::fs::write(
        dir.join("cors.json"),
        r#"{"name": "cors", "config": {"type": "object"}}"#,
    )
    .expect("plugin schema should be writable");

    let output = Command::new(env!("CARGO_BIN_EXE_gatecp"))
        .args(["--log-level", "error", "--format", "json", "plugins"])
        .env("GATECP_PLUGIN_SCHEMAS", &dir)
        .output()
        .expect("gatecp should run");
    assert!(output.status.success());

    let names: Vec<String> = stdout_json(&output)
        .as_array()
        .expect("plugins should print an array")
        .iter()
        .filter_map(|row| row["name"].as_str().map(str::to_string))
        .collect();
    assert_eq!(
        names,
        vec!["acl", "cors", "key-auth", "rate-limiting", "request-transformer"]
    );

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn unknown_plugin_raw_schema_is_a_usage_error() {
    let output = gatecp(&["plugins", "nope"]);
    assert_eq!(output.status.code(), Some(64));

    let output = gatecp(&["plugins", "key-auth"]);
    assert!(output.status.success());
    assert_eq!(stdout_json(&output)["name"], "key-auth");
}

#[test]
fn version_reports_engine_contents() {
    let output = gatecp(&["version"]);
    assert!(output.status.success());

    let version = stdout_json(&output);
    assert_eq!(version["name"], "gatecp");
    assert_eq!(version["strict"], false);
    assert_eq!(version["types"].as_array().map(Vec::len), Some(8));
    assert_eq!(
        version["plugins"],
        serde_json::json!(["acl", "key-auth", "rate-limiting", "request-transformer"])
    );
    assert!(version.get("git_hash").is_none());

    let output = gatecp(&["version", "--extended", "--strict"]);
    let version = stdout_json(&output);
    assert_eq!(version["strict"], true);
    assert!(version["git_hash"].is_string());
}
