use gatecp_plugin::Context;

use crate::cmd::{EngineArgs, PluginsArgs};
use crate::exit::{plugin_error, CliResult, SUCCESS};
use crate::output::{print_document, print_rows, OutputFormat};

pub fn run(args: PluginsArgs, engine: &EngineArgs, format: OutputFormat) -> CliResult<i32> {
    let engine = engine.bootstrap()?;

    if let Some(name) = args.name {
        let raw = engine
            .plugins
            .get_raw_schema(&Context::new(), &name)
            .map_err(|err| plugin_error("plugins", err))?;
        print_document(&raw, format);
        return Ok(SUCCESS);
    }

    let rows: Vec<Vec<String>> = engine
        .plugins
        .get_available_names()
        .into_iter()
        .map(|name| vec![name])
        .collect();
    print_rows(&["NAME"], &rows, format);
    Ok(SUCCESS)
}
