use std::path::PathBuf;

use clap::{Args, Subcommand};
use gatecp_model::{Engine, PluginSources};
use gatecp_schema::ValidatorConfig;
use tracing::debug;

use crate::exit::{model_error, CliResult};
use crate::output::OutputFormat;

pub mod envinfo;
pub mod export;
pub mod plugins;
pub mod schema;
pub mod types;
pub mod validate;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Default and validate an entity read from a JSON file.
    Validate(ValidateArgs),
    /// List registered entity types.
    Types(TypesArgs),
    /// Print the schema document of a type.
    Schema(SchemaArgs),
    /// Write every schema document to a directory.
    Export(ExportArgs),
    /// List available plugin schemas, or print one.
    Plugins(PluginsArgs),
    /// Show version information.
    Version(VersionArgs),
    /// Print build and environment diagnostics.
    Envinfo(EnvinfoArgs),
}

/// Options that shape the engine every command runs against.
#[derive(Args, Debug, Default)]
pub struct EngineArgs {
    /// Reject unknown fields in object schemas that leave them open.
    #[arg(long, env = "GATECP_STRICT", global = true)]
    pub strict: bool,

    /// Directory of additional plugin schemas (`*.json`).
    #[arg(long, value_name = "DIR", env = "GATECP_PLUGIN_SCHEMAS", global = true)]
    pub schemas_dir: Option<PathBuf>,
}

impl EngineArgs {
    pub fn config(&self) -> ValidatorConfig {
        ValidatorConfig {
            strict_mode: self.strict,
            ..ValidatorConfig::default()
        }
    }

    pub fn bootstrap(&self) -> CliResult<Engine> {
        let sources = PluginSources {
            directory: self.schemas_dir.as_deref(),
            ..PluginSources::default()
        };
        let engine = Engine::bootstrap_with(self.config(), sources)
            .map_err(|err| model_error("bootstrap", err))?;
        debug!(?engine, "engine bootstrapped");
        Ok(engine)
    }
}

pub fn run(command: Command, engine: &EngineArgs, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Validate(args) => validate::run(args, engine, format),
        Command::Types(args) => types::run(args, engine, format),
        Command::Schema(args) => schema::run(args, engine, format),
        Command::Export(args) => export::run(args, engine, format),
        Command::Plugins(args) => plugins::run(args, engine, format),
        Command::Version(args) => version::run(args, engine, format),
        Command::Envinfo(args) => envinfo::run(args, format),
    }
}

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// JSON file holding one entity.
    pub file: PathBuf,
    /// Entity type (see `gatecp types`).
    #[arg(long = "type", short = 't', value_name = "TYPE")]
    pub type_name: String,
    /// Validate the entity as given, without filling defaults.
    #[arg(long)]
    pub no_defaults: bool,
}

#[derive(Args, Debug, Default)]
pub struct TypesArgs {}

#[derive(Args, Debug)]
pub struct SchemaArgs {
    /// Entity type.
    pub type_name: String,
}

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Output directory; created when missing.
    pub dir: PathBuf,
}

#[derive(Args, Debug, Default)]
pub struct PluginsArgs {
    /// Print the raw schema of this plugin instead of listing names.
    pub name: Option<String>,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Also list type and plugin names and the build hash.
    #[arg(long)]
    pub extended: bool,
}

#[derive(Args, Debug, Default)]
pub struct EnvinfoArgs {}
