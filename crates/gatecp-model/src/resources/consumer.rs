use gatecp_schema::{Schema, ValidationError};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::index::Index;
use crate::message::{is_default, Message, Named};
use crate::object::{apply_record_defaults, impl_record, validate_message, Object, ValidationContext};
use crate::typedefs;

pub const TYPE: &str = "consumer";

const IDENTITY_MESSAGE: &str = "at least one of custom_id or username must be set";

/// A client of the gateway.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Consumer {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub username: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub custom_id: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "is_default")]
    pub created_at: i64,
    #[serde(default, skip_serializing_if = "is_default")]
    pub updated_at: i64,
}

impl Named for Consumer {
    const FULL_NAME: &'static str = "gatecp.model.v1.Consumer";
}

impl_record!(Consumer);

pub fn schema() -> Schema {
    let identity = || Schema {
        min_length: Some(1),
        max_length: Some(128),
        ..Schema::string()
    };

    Schema {
        any_of: vec![
            Schema::requiring(&["custom_id"]).with_description(IDENTITY_MESSAGE),
            Schema::requiring(&["username"]).with_description(IDENTITY_MESSAGE),
        ],
        ..typedefs::with_record_fields(typedefs::root("Consumer", ""))
    }
    .with_property("username", identity())
    .with_property("custom_id", identity())
    .with_property("tags", typedefs::tags())
    .with_required(&["id"])
}

#[derive(Debug, Clone, Default)]
pub struct ConsumerObject {
    pub consumer: Consumer,
}

impl ConsumerObject {
    pub fn new(consumer: Consumer) -> Self {
        Self { consumer }
    }
}

impl Object for ConsumerObject {
    fn id(&self) -> &str {
        &self.consumer.id
    }

    fn type_name(&self) -> &'static str {
        TYPE
    }

    fn resource(&self) -> &dyn Message {
        &self.consumer
    }

    fn resource_mut(&mut self) -> &mut dyn Message {
        &mut self.consumer
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> std::result::Result<(), ValidationError> {
        validate_message(ctx, TYPE, &self.consumer)
    }

    fn process_defaults(&mut self, _ctx: &ValidationContext<'_>) -> Result<()> {
        apply_record_defaults(&mut self.consumer);
        Ok(())
    }

    fn indexes(&self) -> Vec<Index> {
        let mut indexes = Vec::new();
        if !self.consumer.username.is_empty() {
            indexes.push(Index::unique("username", &self.consumer.username, "username"));
        }
        if !self.consumer.custom_id.is_empty() {
            indexes.push(Index::unique("custom_id", &self.consumer.custom_id, "custom_id"));
        }
        indexes
    }
}
