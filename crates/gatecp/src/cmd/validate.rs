use gatecp_model::ModelError;
use gatecp_plugin::Context;
use serde_json::Value;
use tracing::debug;

use crate::cmd::{EngineArgs, ValidateArgs};
use crate::exit::{io_error, model_error, CliError, CliResult, DATA_INVALID, SUCCESS};
use crate::output::{print_validation, OutputFormat};

pub fn run(args: ValidateArgs, engine: &EngineArgs, format: OutputFormat) -> CliResult<i32> {
    let text = std::fs::read_to_string(&args.file)
        .map_err(|err| io_error(&format!("failed to read {}", args.file.display()), err))?;
    let value: Value = serde_json::from_str(&text).map_err(|err| {
        CliError::new(
            DATA_INVALID,
            format!("{} is not valid JSON: {err}", args.file.display()),
        )
    })?;

    let engine = engine.bootstrap()?;
    let mut object = match engine.object_from_value(&args.type_name, value.clone()) {
        Ok(object) => object,
        Err(ModelError::Invalid(err)) => {
            print_validation(&args.type_name, &value, &Err(err), format);
            return Ok(DATA_INVALID);
        }
        Err(err) => return Err(model_error("validate", err)),
    };

    let request = Context::new();
    let ctx = engine.context(&request);
    if !args.no_defaults {
        object
            .process_defaults(&ctx)
            .map_err(|err| model_error("defaults", err))?;
    }

    let result = object.validate(&ctx);
    let entity = object
        .resource()
        .to_value()
        .map_err(|err| model_error("validate", err.into()))?;
    debug!(type_name = %args.type_name, valid = result.is_ok(), "validated entity");

    print_validation(&args.type_name, &entity, &result, format);
    Ok(if result.is_ok() { SUCCESS } else { DATA_INVALID })
}
