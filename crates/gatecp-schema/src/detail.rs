//! The stable, user-facing validation error shape.
//!
//! On the wire an error is an ordered list of
//! `{"type": "FIELD" | "ENTITY", "field": "...", "messages": [...]}` objects.
//! Field paths use dots for properties and brackets for array indexes
//! (`config.add.headers[0]`); entity details carry no field.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Whether a detail addresses a single field or the entity as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorType {
    Field,
    Entity,
}

/// Messages for one field (or for the entity).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    #[serde(rename = "type")]
    pub kind: ErrorType,
    /// Dotted/bracketed path. Empty for entity details.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub field: String,
    /// Ordered, de-duplicated messages.
    pub messages: Vec<String>,
}

impl ErrorDetail {
    pub fn field(field: impl Into<String>, messages: Vec<String>) -> Self {
        Self {
            kind: ErrorType::Field,
            field: field.into(),
            messages,
        }
    }

    pub fn entity(messages: Vec<String>) -> Self {
        Self {
            kind: ErrorType::Entity,
            field: String::new(),
            messages,
        }
    }
}

/// Aggregate returned when an entity fails validation.
///
/// Holds at most one detail per distinct field, sorted by field and then
/// type, so identical input always produces an identical error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationError {
    details: Vec<ErrorDetail>,
}

impl ValidationError {
    /// Build an error from raw details, merging duplicates and sorting.
    pub fn new(details: impl IntoIterator<Item = ErrorDetail>) -> Self {
        let mut set = DetailSet::new();
        set.absorb(ValidationError { details: details.into_iter().collect() });
        set.into_error()
    }

    /// A single field error.
    pub fn field(field: &str, message: impl Into<String>) -> Self {
        let mut set = DetailSet::new();
        set.push_field(field, message);
        set.into_error()
    }

    /// A single entity error.
    pub fn entity(message: impl Into<String>) -> Self {
        let mut set = DetailSet::new();
        set.push_entity(message);
        set.into_error()
    }

    pub fn details(&self) -> &[ErrorDetail] {
        &self.details
    }

    pub fn into_details(self) -> Vec<ErrorDetail> {
        self.details
    }

    pub fn is_empty(&self) -> bool {
        self.details.is_empty()
    }

    pub fn len(&self) -> usize {
        self.details.len()
    }

    /// Look up the detail for a field path.
    pub fn field_detail(&self, field: &str) -> Option<&ErrorDetail> {
        self.details
            .iter()
            .find(|detail| detail.kind == ErrorType::Field && detail.field == field)
    }

    /// The entity-level detail, if any.
    pub fn entity_detail(&self) -> Option<&ErrorDetail> {
        self.details
            .iter()
            .find(|detail| detail.kind == ErrorType::Entity)
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("validation error")?;
        for (idx, detail) in self.details.iter().enumerate() {
            f.write_str(if idx == 0 { ": " } else { "; " })?;
            match detail.kind {
                ErrorType::Field => write!(f, "field '{}': ", detail.field)?,
                ErrorType::Entity => f.write_str("entity: ")?,
            }
            f.write_str(&detail.messages.join(", "))?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// Accumulates messages, merging them per field in first-seen order.
#[derive(Debug, Default)]
pub struct DetailSet {
    details: Vec<ErrorDetail>,
}

impl DetailSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message. Repeated messages on the same field are dropped.
    pub fn push(&mut self, kind: ErrorType, field: &str, message: impl Into<String>) {
        let message = message.into();
        match self.details.iter_mut().find(|detail| detail.field == field) {
            Some(detail) => {
                if !detail.messages.contains(&message) {
                    detail.messages.push(message);
                }
            }
            None => self.details.push(ErrorDetail {
                kind,
                field: field.to_string(),
                messages: vec![message],
            }),
        }
    }

    pub fn push_field(&mut self, field: &str, message: impl Into<String>) {
        self.push(ErrorType::Field, field, message);
    }

    pub fn push_entity(&mut self, message: impl Into<String>) {
        self.push(ErrorType::Entity, "", message);
    }

    /// Add every message of a finished error.
    pub fn absorb(&mut self, err: ValidationError) {
        for detail in err.details {
            for message in detail.messages {
                self.push(detail.kind, &detail.field, message);
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.details.is_empty()
    }

    /// Finish into a sorted error.
    pub fn into_error(mut self) -> ValidationError {
        self.details
            .sort_by(|a, b| a.field.cmp(&b.field).then(a.kind.cmp(&b.kind)));
        ValidationError {
            details: self.details,
        }
    }

    /// `Ok(())` when nothing was recorded.
    pub fn into_result(self) -> Result<(), ValidationError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self.into_error())
        }
    }
}
