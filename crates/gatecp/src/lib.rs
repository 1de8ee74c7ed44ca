//! Entity validation and constraint descriptions for a gateway control plane.
//!
//! gatecp validates declarative gateway configuration (services, routes,
//! consumers, certificates, plugins) against JSON Schema documents, reports
//! failures as stable field-addressed errors, and describes the uniqueness and
//! reference constraints a store has to enforce.
//!
//! # Crate Structure
//!
//! - [`schema`]: schema documents, registry, compiled validator, error translation
//! - [`plugin`]: the plugin validation bridge and its JSON Schema backend
//! - [`model`]: resource types, type registry, indexes and engine bootstrap

/// Re-export schema types.
pub mod schema {
    pub use gatecp_schema::*;
}

/// Re-export plugin bridge types.
pub mod plugin {
    pub use gatecp_plugin::*;
}

/// Re-export resource model types.
pub mod model {
    pub use gatecp_model::*;
}

pub use gatecp_model::Engine;
pub use gatecp_schema::{ErrorDetail, ErrorType, ValidationError, ValidatorConfig};
