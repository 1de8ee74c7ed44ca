//! Constraint descriptions handed to the storage layer.
//!
//! Objects describe which of their values must be unique and which reference
//! other entities. The engine never enforces these; it only checks that the
//! descriptions are well formed.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

static FIELD_ACCESSOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\[[0-9]+\])*(\.[A-Za-z_][A-Za-z0-9_]*(\[[0-9]+\])*)*$")
        .expect("field accessor pattern compiles")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum IndexType {
    Unique,
    Foreign,
    MultiValue,
}

/// Whether the storage layer should add or drop the entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub enum IndexAction {
    #[default]
    Add,
    Remove,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Index {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: IndexType,
    pub value: String,
    /// Accessor path of the field the value came from (`service.id`).
    #[serde(skip_serializing_if = "String::is_empty")]
    pub field_name: String,
    /// Referenced type; set for foreign indexes only.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub foreign_type: String,
    pub action: IndexAction,
}

impl Index {
    pub fn unique(name: &str, value: impl Into<String>, field_name: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: IndexType::Unique,
            value: value.into(),
            field_name: field_name.to_string(),
            foreign_type: String::new(),
            action: IndexAction::Add,
        }
    }

    pub fn foreign(
        name: &str,
        foreign_type: &str,
        value: impl Into<String>,
        field_name: &str,
    ) -> Self {
        Self {
            kind: IndexType::Foreign,
            foreign_type: foreign_type.to_string(),
            ..Self::unique(name, value, field_name)
        }
    }

    pub fn multi_value(name: &str, value: impl Into<String>, field_name: &str) -> Self {
        Self {
            kind: IndexType::MultiValue,
            ..Self::unique(name, value, field_name)
        }
    }

    pub fn with_action(mut self, action: IndexAction) -> Self {
        self.action = action;
        self
    }

    /// Check the structural rules for a single entry.
    pub fn validate(&self) -> Result<(), IndexError> {
        if self.name.is_empty() {
            return Err(IndexError::EmptyName);
        }
        if self.value.is_empty() {
            return Err(IndexError::EmptyValue(self.name.clone()));
        }
        if self.kind == IndexType::Foreign && self.foreign_type.is_empty() {
            return Err(IndexError::MissingForeignType(self.name.clone()));
        }
        if self.field_name.is_empty() {
            return Ok(());
        }
        if self.field_name.starts_with("$.") {
            return Err(IndexError::PrefixedFieldName {
                name: self.name.clone(),
                field: self.field_name.clone(),
            });
        }
        if !FIELD_ACCESSOR.is_match(&self.field_name) {
            return Err(IndexError::InvalidFieldName {
                name: self.name.clone(),
                field: self.field_name.clone(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IndexError {
    #[error("index name must not be empty")]
    EmptyName,

    #[error("index '{0}': value must not be empty")]
    EmptyValue(String),

    #[error("index '{0}': foreign index requires a foreign type")]
    MissingForeignType(String),

    #[error("index '{name}': field name '{field}' must not start with '$.'")]
    PrefixedFieldName { name: String, field: String },

    #[error("index '{name}': invalid field name '{field}'")]
    InvalidFieldName { name: String, field: String },

    #[error("duplicate index '{0}'")]
    Duplicate(String),
}

/// Check every entry, then reject content-identical duplicates.
///
/// The first structurally invalid entry is reported.
pub fn validate_indexes(indexes: &[Index]) -> Result<(), IndexError> {
    for index in indexes {
        index.validate()?;
    }

    let mut seen = HashSet::with_capacity(indexes.len());
    for index in indexes {
        if !seen.insert(index) {
            return Err(IndexError::Duplicate(index.name.clone()));
        }
    }
    Ok(())
}
