//! In-memory schema document model.
//!
//! A [`Schema`] is a JSON Schema (draft 7) node restricted to the vocabulary the
//! engine understands. Documents are built in code at startup, serialize to
//! portable schema files, and drive both compilation and error translation.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// JSON Schema draft used for every bundled document.
pub const DRAFT7: &str = "http://json-schema.org/draft-07/schema#";

/// Vendor extension carried under `x-gatecp-config`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Extension {
    /// The type is not served by the dedicated `/v1/schemas/.../validate` endpoint.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub disable_validate_endpoint: bool,
    /// REST path segment, when it differs from the pluralised type name.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub resource_api_path: String,
}

/// A schema node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Schema {
    #[serde(rename = "$schema", skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    #[serde(rename = "$id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Authored message used in place of the validator's text when a terminal
    /// keyword of this node fails.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_items: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_items: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unique_items: Option<bool>,

    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, Schema>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<bool>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub all_of: Vec<Schema>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub any_of: Vec<Schema>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub one_of: Vec<Schema>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub not: Option<Box<Schema>>,
    #[serde(rename = "if", skip_serializing_if = "Option::is_none")]
    pub if_: Option<Box<Schema>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub then: Option<Box<Schema>>,
    #[serde(rename = "else", skip_serializing_if = "Option::is_none")]
    pub else_: Option<Box<Schema>>,

    #[serde(rename = "enum", skip_serializing_if = "Vec::is_empty")]
    pub enum_: Vec<Value>,
    #[serde(rename = "const", skip_serializing_if = "Option::is_none")]
    pub const_: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,

    #[serde(rename = "x-gatecp-config", skip_serializing_if = "Option::is_none")]
    pub extension: Option<Extension>,
}

impl Schema {
    fn typed(kind: &str) -> Self {
        Self {
            type_: Some(kind.to_string()),
            ..Self::default()
        }
    }

    pub fn object() -> Self {
        Self::typed("object")
    }

    pub fn string() -> Self {
        Self::typed("string")
    }

    pub fn integer() -> Self {
        Self::typed("integer")
    }

    pub fn boolean() -> Self {
        Self::typed("boolean")
    }

    pub fn array(items: Schema) -> Self {
        Self {
            items: Some(Box::new(items)),
            ..Self::typed("array")
        }
    }

    /// A node that only lists required properties; used inside combinators.
    pub fn requiring(names: &[&str]) -> Self {
        Self {
            required: names.iter().map(|name| name.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_property(mut self, name: impl Into<String>, schema: Schema) -> Self {
        self.properties.insert(name.into(), schema);
        self
    }

    pub fn with_required(mut self, names: &[&str]) -> Self {
        self.required
            .extend(names.iter().map(|name| name.to_string()));
        self
    }

    /// Parse a document from JSON text.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Serialize to a JSON Schema value.
    pub fn to_value(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }

    pub fn property(&self, name: &str) -> Option<&Schema> {
        self.properties.get(name)
    }

    /// The sub-schema at `index` of the `allOf`/`anyOf`/`oneOf` keyword.
    pub fn branch(&self, keyword: &str, index: usize) -> Option<&Schema> {
        let branches = match keyword {
            "allOf" => &self.all_of,
            "anyOf" => &self.any_of,
            "oneOf" => &self.one_of,
            _ => return None,
        };
        branches.get(index)
    }

    /// The sub-schema under `items`, `not`, `if`, `then` or `else`.
    pub fn child(&self, keyword: &str) -> Option<&Schema> {
        let child = match keyword {
            "items" => &self.items,
            "not" => &self.not,
            "if" => &self.if_,
            "then" => &self.then,
            "else" => &self.else_,
            _ => return None,
        };
        child.as_deref()
    }
}
