//! Schema documents and validation for gatecp entities.
//!
//! Every resource type is described by a [`Schema`] document registered in a
//! [`SchemaRegistry`]. At startup the registry is compiled into a
//! [`Validator`]; validation failures are translated into stable,
//! field-addressed [`ErrorDetail`]s that an API layer can hand to users as-is.
//!
//! The crate knows nothing about concrete resources. Named string formats are
//! injected through [`Formats`] before compilation.

pub mod config;
pub mod detail;
pub mod document;
pub mod error;
pub mod format;
pub mod registry;
pub mod report;
pub mod translate;
pub mod validator;

pub use config::ValidatorConfig;
pub use detail::{ErrorDetail, ErrorType, ValidationError};
pub use document::{Extension, Schema};
pub use error::{Result, SchemaError};
pub use format::{FormatCheck, Formats};
pub use registry::SchemaRegistry;
pub use report::ErrorNode;
pub use translate::translate;
pub use validator::Validator;
