use crate::cmd::{EngineArgs, SchemaArgs};
use crate::exit::{schema_error, CliError, CliResult, INTERNAL, SUCCESS};
use crate::output::{print_document, OutputFormat};

pub fn run(args: SchemaArgs, engine: &EngineArgs, format: OutputFormat) -> CliResult<i32> {
    let engine = engine.bootstrap()?;
    let schema = engine
        .schemas
        .get(&args.type_name)
        .map_err(|err| schema_error("schema", err))?;
    let document = schema
        .to_value()
        .map_err(|err| CliError::new(INTERNAL, format!("schema: {err}")))?;

    print_document(&document, format);
    Ok(SUCCESS)
}
