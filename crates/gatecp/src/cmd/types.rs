use crate::cmd::{EngineArgs, TypesArgs};
use crate::exit::{CliResult, SUCCESS};
use crate::output::{print_rows, OutputFormat};

pub fn run(_args: TypesArgs, engine: &EngineArgs, format: OutputFormat) -> CliResult<i32> {
    let engine = engine.bootstrap()?;

    let mut names = engine.types.all_types();
    names.sort();
    let rows: Vec<Vec<String>> = names
        .into_iter()
        .map(|name| {
            let message = engine.types.message_name(&name).unwrap_or_default().to_string();
            let api_path = engine
                .schemas
                .get(&name)
                .ok()
                .and_then(|schema| schema.extension.clone())
                .map(|extension| extension.resource_api_path)
                .unwrap_or_default();
            vec![name, message, api_path]
        })
        .collect();

    print_rows(&["TYPE", "MESSAGE", "API_PATH"], &rows, format);
    Ok(SUCCESS)
}
