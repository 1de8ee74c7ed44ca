use gatecp_schema::{Schema, ValidationError};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::index::{Index, IndexAction};
use crate::message::{is_default, Message, Named};
use crate::object::{apply_record_defaults, impl_record, validate_message, Object, ValidationContext};
use crate::typedefs;

pub const TYPE: &str = "consumer_group";

const MEMBER_INDEX: &str = "member";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConsumerGroup {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "is_default")]
    pub created_at: i64,
    #[serde(default, skip_serializing_if = "is_default")]
    pub updated_at: i64,
}

impl Named for ConsumerGroup {
    const FULL_NAME: &'static str = "gatecp.model.v1.ConsumerGroup";
}

impl_record!(ConsumerGroup);

pub fn schema() -> Schema {
    typedefs::with_record_fields(typedefs::root("ConsumerGroup", "consumer-groups"))
        .with_property("name", typedefs::name())
        .with_property("tags", typedefs::tags())
        .with_required(&["id", "name"])
}

/// A group plus the membership changes of the current operation.
///
/// Membership is not part of the group message; each change becomes a
/// foreign index to the consumer with the matching action.
#[derive(Debug, Clone, Default)]
pub struct ConsumerGroupObject {
    pub group: ConsumerGroup,
    added: Vec<String>,
    removed: Vec<String>,
}

impl ConsumerGroupObject {
    pub fn new(group: ConsumerGroup) -> Self {
        Self {
            group,
            ..Self::default()
        }
    }

    pub fn add_members<I, S>(&mut self, consumer_ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        push_unique(&mut self.added, consumer_ids);
    }

    pub fn remove_members<I, S>(&mut self, consumer_ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        push_unique(&mut self.removed, consumer_ids);
    }
}

fn push_unique<I, S>(members: &mut Vec<String>, ids: I)
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    for id in ids {
        let id = id.into();
        if !members.contains(&id) {
            members.push(id);
        }
    }
}

impl Object for ConsumerGroupObject {
    fn id(&self) -> &str {
        &self.group.id
    }

    fn type_name(&self) -> &'static str {
        TYPE
    }

    fn resource(&self) -> &dyn Message {
        &self.group
    }

    fn resource_mut(&mut self) -> &mut dyn Message {
        &mut self.group
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> std::result::Result<(), ValidationError> {
        validate_message(ctx, TYPE, &self.group)
    }

    fn process_defaults(&mut self, _ctx: &ValidationContext<'_>) -> Result<()> {
        apply_record_defaults(&mut self.group);
        Ok(())
    }

    fn indexes(&self) -> Vec<Index> {
        let mut indexes = Vec::new();
        if !self.group.name.is_empty() {
            indexes.push(Index::unique("name", &self.group.name, "name"));
        }

        let consumer = super::consumer::TYPE;
        for id in &self.added {
            indexes.push(Index::foreign(MEMBER_INDEX, consumer, id, ""));
        }
        for id in &self.removed {
            indexes.push(
                Index::foreign(MEMBER_INDEX, consumer, id, "").with_action(IndexAction::Remove),
            );
        }
        indexes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::validate_indexes;

    #[test]
    fn membership_changes_become_foreign_indexes() {
        let mut object = ConsumerGroupObject::new(ConsumerGroup {
            name: "gold".to_string(),
            ..ConsumerGroup::default()
        });
        object.add_members(["c1", "c2", "c1"]);
        object.remove_members(["c3"]);

        let indexes = object.indexes();
        assert_eq!(indexes.len(), 4);
        assert_eq!(indexes[1], Index::foreign("member", "consumer", "c1", ""));
        assert_eq!(indexes[3].action, IndexAction::Remove);
        assert_eq!(validate_indexes(&indexes), Ok(()));
    }
}
