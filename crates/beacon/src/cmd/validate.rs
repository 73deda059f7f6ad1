use beacon_core::Schema;
use beacon_schema::{RegistryConfig, SchemaDefinition, SchemaKey, SchemaRegistry};
use serde_json::Value;

use crate::cmd::{read_input, ValidateArgs};
use crate::exit::{schema_error, CliError, CliResult, DATA_INVALID, FAILURE, SUCCESS, USAGE};
use crate::output::{print_outcome, OutputFormat};

pub fn run(args: ValidateArgs, format: OutputFormat) -> CliResult<i32> {
    let raw = read_input(&args.document)?;
    let document: Value = serde_json::from_str(&raw).map_err(|err| {
        CliError::new(
            DATA_INVALID,
            format!("{} is not valid JSON: {err}", args.document.display()),
        )
    })?;

    let config = RegistryConfig {
        max_depth: args.max_depth,
        ..RegistryConfig::default()
    };

    let (key, outcome) = if let Some(path) = &args.schema {
        let content = read_input(path)?;
        let definition = SchemaDefinition::from_json(&content)
            .map_err(|err| schema_error(&format!("invalid schema {}", path.display()), err))?;
        let key = SchemaKey::new(definition.name.clone(), definition.version);
        let schema = definition
            .compile(config.schema_config())
            .map_err(|err| schema_error(&format!("invalid schema {}", path.display()), err))?;
        (key, schema.validate(&document))
    } else if let Some(dir) = &args.schema_dir {
        let name = args.name.as_deref().ok_or_else(|| {
            CliError::new(USAGE, "--name is required when validating with --schema-dir")
        })?;
        let registry = SchemaRegistry::from_directory_with_config(dir, config)
            .map_err(|err| schema_error("schema load failed", err))?;
        let (key, schema) = resolve(&registry, name, args.schema_version)?;
        (key, schema.validate(&document))
    } else {
        return Err(CliError::new(
            USAGE,
            "either --schema or --schema-dir (BEACON_SCHEMA_DIR) is required",
        ));
    };

    tracing::info!(
        schema = %key,
        valid = outcome.is_success(),
        path = outcome.path(),
        "validated document"
    );
    print_outcome(&key.to_string(), &outcome, format);

    if outcome.is_success() {
        Ok(SUCCESS)
    } else {
        Ok(DATA_INVALID)
    }
}

fn resolve<'a>(
    registry: &'a SchemaRegistry,
    name: &str,
    version: Option<u32>,
) -> CliResult<(SchemaKey, &'a Schema)> {
    let found = match version {
        Some(version) => registry.get(name, version).map(|schema| (version, schema)),
        None => registry.latest(name),
    };
    found
        .map(|(version, schema)| (SchemaKey::new(name, version), schema))
        .ok_or_else(|| {
            let wanted = version.map_or_else(|| "any version".to_string(), |v| format!("v{v}"));
            CliError::new(FAILURE, format!("no schema named {name} ({wanted}) found"))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_prefers_exact_version_then_latest() {
        let registry = SchemaRegistry::from_embedded(&[
            r#"{"name":"doc","version":1,"fields":{}}"#,
            r#"{"name":"doc","version":3,"fields":{}}"#,
        ])
        .expect("embedded schemas should register");

        let (key, _) = resolve(&registry, "doc", Some(1)).expect("v1 should resolve");
        assert_eq!(key, SchemaKey::new("doc", 1));
        let (key, _) = resolve(&registry, "doc", None).expect("latest should resolve");
        assert_eq!(key, SchemaKey::new("doc", 3));

        let err = resolve(&registry, "doc", Some(2)).expect_err("v2 is missing");
        assert_eq!(err.code, FAILURE);
        assert!(resolve(&registry, "other", None).is_err());
    }
}
