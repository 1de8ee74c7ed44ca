//! Resource types and their constraints for the gatecp control plane.
//!
//! Each resource has a wire message, a schema document and an [`Object`]
//! wrapper that knows how to default, validate and index it. The
//! [`TypeRegistry`] maps type names and wire messages to constructors, and
//! [`Engine::bootstrap`] wires the bundled resources, formats and plugin
//! schemas together.

pub mod bootstrap;
pub mod error;
pub mod formats;
pub mod index;
pub mod message;
pub mod object;
pub mod resources;
pub mod typedefs;
pub mod types;

pub use bootstrap::{Engine, PluginSources};
pub use error::{ModelError, Result};
pub use index::{validate_indexes, Index, IndexAction, IndexError, IndexType};
pub use message::{EntityRef, Message, Named};
pub use object::{validate_message, Object, ValidationContext};
pub use resources::register_builtin;
pub use types::{Constructor, TypeRegistry};
