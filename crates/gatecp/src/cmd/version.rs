use serde::Serialize;

use crate::cmd::{EngineArgs, VersionArgs};
use crate::exit::{CliError, CliResult, INTERNAL, SUCCESS};
use crate::output::{print_document, OutputFormat};

/// What this build validates, read back from a bootstrapped engine.
#[derive(Serialize)]
struct VersionOutput {
    name: &'static str,
    version: &'static str,
    strict: bool,
    types: Vec<String>,
    plugins: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    git_hash: Option<&'static str>,
}

pub fn run(args: VersionArgs, engine: &EngineArgs, format: OutputFormat) -> CliResult<i32> {
    let bootstrapped = engine.bootstrap()?;
    let mut types = bootstrapped.schemas.names();
    types.sort();

    let output = VersionOutput {
        name: "gatecp",
        version: env!("CARGO_PKG_VERSION"),
        strict: engine.strict,
        types,
        plugins: bootstrapped.plugins.get_available_names(),
        git_hash: args.extended.then(|| option_env!("GIT_HASH").unwrap_or("unknown")),
    };

    match format {
        OutputFormat::Json | OutputFormat::Pretty => {
            let value = serde_json::to_value(&output)
                .map_err(|err| CliError::new(INTERNAL, format!("version: {err}")))?;
            print_document(&value, format);
        }
        OutputFormat::Table => {
            println!(
                "{} {} ({} types, {} plugin schemas{})",
                output.name,
                output.version,
                output.types.len(),
                output.plugins.len(),
                if output.strict { ", strict" } else { "" }
            );
            if args.extended {
                println!("types: {}", output.types.join(", "));
                println!("plugins: {}", output.plugins.join(", "));
                println!("git_hash: {}", output.git_hash.unwrap_or("unknown"));
            }
        }
    }
    Ok(SUCCESS)
}
