//! Wire messages.
//!
//! Every resource is carried as a serde struct that names its descriptor
//! (`gatecp.model.v1.Service`). Canonical JSON uses the snake_case field
//! names and omits unset fields, so an empty message serializes to `{}`.

use std::any::Any;
use std::fmt;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// Descriptor name of a concrete message type.
pub trait Named {
    const FULL_NAME: &'static str;
}

/// Object-safe view of a wire message.
pub trait Message: Any + Send + Sync + fmt::Debug {
    /// Fully qualified descriptor name.
    fn full_name(&self) -> &'static str;

    /// Canonical JSON form.
    fn to_value(&self) -> serde_json::Result<Value>;

    /// Overwrite the fields present in `value`; absent fields are kept.
    fn merge_value(&mut self, value: Value) -> serde_json::Result<()>;

    fn clone_message(&self) -> Box<dyn Message>;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T> Message for T
where
    T: Named + Serialize + DeserializeOwned + Clone + fmt::Debug + Send + Sync + 'static,
{
    fn full_name(&self) -> &'static str {
        T::FULL_NAME
    }

    fn to_value(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }

    fn merge_value(&mut self, value: Value) -> serde_json::Result<()> {
        let mut merged = serde_json::to_value(&*self)?;
        match (&mut merged, value) {
            (Value::Object(current), Value::Object(incoming)) => {
                for (key, field) in incoming {
                    current.insert(key, field);
                }
            }
            (_, Value::Null) => return Ok(()),
            (slot, other) => *slot = other,
        }
        *self = serde_json::from_value(merged)?;
        Ok(())
    }

    fn clone_message(&self) -> Box<dyn Message> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// `true` for the zero value of a field; used to omit unset fields.
pub(crate) fn is_default<T: Default + PartialEq>(value: &T) -> bool {
    *value == T::default()
}

/// Reference to another entity by id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EntityRef {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
}

impl EntityRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}
