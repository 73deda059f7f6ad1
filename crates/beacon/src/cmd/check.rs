use beacon_core::SchemaConfig;
use beacon_schema::SchemaDefinition;

use crate::cmd::{read_input, CheckArgs};
use crate::exit::{schema_error, CliResult, SUCCESS};
use crate::output::{print_definitions, DefinitionSummary, OutputFormat};

pub fn run(args: CheckArgs, format: OutputFormat) -> CliResult<i32> {
    let config = SchemaConfig {
        max_depth: args.max_depth,
    };

    let mut summaries = Vec::with_capacity(args.files.len());
    for path in &args.files {
        let context = format!("invalid schema {}", path.display());
        let content = read_input(path)?;
        let definition =
            SchemaDefinition::from_json(&content).map_err(|err| schema_error(&context, err))?;
        let schema = definition
            .compile(config)
            .map_err(|err| schema_error(&context, err))?;

        tracing::debug!(
            file = %path.display(),
            name = %definition.name,
            version = definition.version,
            "definition compiled"
        );
        summaries.push(DefinitionSummary {
            file: path.display().to_string(),
            name: definition.name.clone(),
            version: definition.version,
            fields: schema.len(),
            required: schema
                .fields()
                .filter(|(_, entry)| entry.requirement().is_required())
                .count(),
            depth: definition.depth(),
        });
    }

    print_definitions(&summaries, format);
    Ok(SUCCESS)
}
