use std::collections::HashMap;
use std::sync::OnceLock;

use parking_lot::RwLock;
use tracing::debug;

use crate::error::{ModelError, Result};
use crate::message::Message;
use crate::object::Object;

/// Builds an empty object of one type.
pub type Constructor = fn() -> Box<dyn Object>;

#[derive(Clone, Copy)]
struct Entry {
    message: &'static str,
    constructor: Constructor,
}

#[derive(Default)]
struct Tables {
    types: HashMap<String, Entry>,
    messages: HashMap<&'static str, String>,
}

/// One-to-one mapping between type names, wire messages and constructors.
#[derive(Default)]
pub struct TypeRegistry {
    tables: RwLock<Tables>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide default registry.
    pub fn global() -> &'static TypeRegistry {
        static GLOBAL: OnceLock<TypeRegistry> = OnceLock::new();
        GLOBAL.get_or_init(TypeRegistry::new)
    }

    /// Bind `type_name` to the descriptor of `sample` and to `constructor`.
    pub fn register_type(
        &self,
        type_name: &str,
        sample: &dyn Message,
        constructor: Constructor,
    ) -> Result<()> {
        let message = sample.full_name();
        if message.is_empty() {
            return Err(ModelError::InvalidMessage);
        }

        let mut tables = self.tables.write();
        if tables.types.contains_key(type_name) {
            return Err(ModelError::TypeAlreadyRegistered(type_name.to_string()));
        }
        if tables.messages.contains_key(message) {
            return Err(ModelError::MessageAlreadyRegistered(message.to_string()));
        }

        tables.types.insert(
            type_name.to_string(),
            Entry {
                message,
                constructor,
            },
        );
        tables.messages.insert(message, type_name.to_string());
        debug!(type_name, message, "registered type");
        Ok(())
    }

    /// A new, empty object of `type_name`.
    pub fn new_object(&self, type_name: &str) -> Result<Box<dyn Object>> {
        let entry = self
            .tables
            .read()
            .types
            .get(type_name)
            .copied()
            .ok_or_else(|| ModelError::TypeNotFound(type_name.to_string()))?;
        Ok((entry.constructor)())
    }

    /// Wrap a copy of `message` in an object of the type it is registered for.
    pub fn object_from_proto(&self, message: &dyn Message) -> Result<Box<dyn Object>> {
        let name = message.full_name();
        if name.is_empty() {
            return Err(ModelError::InvalidMessage);
        }
        let type_name = self
            .type_for_message(name)
            .ok_or_else(|| ModelError::MessageNotMapped(name.to_string()))?;

        let mut object = self.new_object(&type_name)?;
        object.resource_mut().merge_value(message.to_value()?)?;
        Ok(object)
    }

    /// Registered type names in no particular order.
    pub fn all_types(&self) -> Vec<String> {
        self.tables.read().types.keys().cloned().collect()
    }

    pub fn type_for_message(&self, message: &str) -> Option<String> {
        self.tables.read().messages.get(message).cloned()
    }

    pub fn message_name(&self, type_name: &str) -> Option<&'static str> {
        self.tables
            .read()
            .types
            .get(type_name)
            .map(|entry| entry.message)
    }
}

impl std::fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut types = self.all_types();
        types.sort_unstable();
        f.debug_struct("TypeRegistry").field("types", &types).finish()
    }
}
