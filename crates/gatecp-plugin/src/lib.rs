//! Validation bridge for dynamically schema'd gatecp plugins.
//!
//! Built-in resources are validated against schemas compiled at startup.
//! Plugins are different: their configuration schema is authored at runtime
//! and executed by a separate backend. This crate defines the
//! [`PluginValidator`] contract the rest of the engine talks to, the
//! flattening of backend error payloads into field-addressed details, and
//! [`SchemaPluginValidator`], a backend for plugin schemas expressed as JSON
//! Schema.

use include_dir::{include_dir, Dir};

pub mod backend;
pub mod bridge;
pub mod context;
pub mod error;
pub mod flatten;
pub mod store;

pub use backend::{derive_name, EntityCheck, SchemaPluginValidator, DEFAULT_PROTOCOLS};
pub use bridge::PluginValidator;
pub use context::{ClusterRef, Context};
pub use error::{PluginError, Result};
pub use flatten::flatten;
pub use store::{MemoryLoader, MemoryStore, SchemaStore, StoreError, StoreLoader};

/// Plugin schemas shipped with the engine.
pub static BUNDLED_SCHEMAS: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/schemas");
