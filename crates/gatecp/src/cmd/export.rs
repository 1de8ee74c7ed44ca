use serde_json::json;

use crate::cmd::{EngineArgs, ExportArgs};
use crate::exit::{schema_error, CliResult, SUCCESS};
use crate::output::{print_document, OutputFormat};

pub fn run(args: ExportArgs, engine: &EngineArgs, format: OutputFormat) -> CliResult<i32> {
    let engine = engine.bootstrap()?;
    let written = engine
        .schemas
        .export_to_directory(&args.dir)
        .map_err(|err| schema_error("export", err))?;

    print_document(
        &json!({
            "dir": args.dir.display().to_string(),
            "written": written,
        }),
        format,
    );
    Ok(SUCCESS)
}
