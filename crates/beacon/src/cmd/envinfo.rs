use std::collections::BTreeMap;

use beacon_schema::RegistryConfig;
use serde::Serialize;

use crate::cmd::EnvinfoArgs;
use crate::exit::{CliResult, SUCCESS};
use crate::output::OutputFormat;

const ENVINFO_SCHEMA_ID: &str = "https://schemas.beacon.dev/cli/v1/envinfo.schema.json";

const WATCHED_VARS: [&str; 3] = ["BEACON_SCHEMA_DIR", "BEACON_LOG_LEVEL", "RUST_LOG"];

#[derive(Serialize)]
struct Limits {
    max_depth: usize,
    max_schemas_from_directory: usize,
    max_schema_file_size: usize,
}

#[derive(Serialize)]
struct EnvInfoOutput {
    schema_id: &'static str,
    version: &'static str,
    target: String,
    os: &'static str,
    arch: &'static str,
    features: Vec<&'static str>,
    limits: Limits,
    dependencies: BTreeMap<&'static str, &'static str>,
    environment: BTreeMap<&'static str, Option<String>>,
}

pub fn run(_args: EnvinfoArgs, format: OutputFormat) -> CliResult<i32> {
    let registry = RegistryConfig::default();
    let output = EnvInfoOutput {
        schema_id: ENVINFO_SCHEMA_ID,
        version: env!("CARGO_PKG_VERSION"),
        target: target_triple(),
        os: std::env::consts::OS,
        arch: std::env::consts::ARCH,
        features: active_features(),
        limits: Limits {
            max_depth: registry.max_depth,
            max_schemas_from_directory: registry.max_schemas_from_directory,
            max_schema_file_size: registry.max_schema_file_size,
        },
        dependencies: BTreeMap::from([
            ("clap", "4.5"),
            ("jsonschema", "0.41"),
            ("regex", "1"),
        ]),
        environment: WATCHED_VARS
            .iter()
            .map(|var| (*var, std::env::var(var).ok()))
            .collect(),
    };

    print_envinfo(&output, format);
    Ok(SUCCESS)
}

fn target_triple() -> String {
    match option_env!("BEACON_BUILD_TARGET") {
        Some(target) => target.to_string(),
        None => format!(
            "{}-unknown-{}",
            std::env::consts::ARCH,
            std::env::consts::OS
        ),
    }
}

fn print_envinfo(output: &EnvInfoOutput, format: OutputFormat) {
    match format {
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string(output).unwrap_or_else(|_| "{}".to_string())
        ),
        OutputFormat::Table | OutputFormat::Pretty => {
            println!("beacon {} ({})", output.version, output.target);
            println!("  platform: {} / {}", output.os, output.arch);
            println!("  features: {}", output.features.join(", "));
            println!(
                "  limits:   depth={} schemas={} file_size={}",
                output.limits.max_depth,
                output.limits.max_schemas_from_directory,
                output.limits.max_schema_file_size
            );
            for (name, version) in &output.dependencies {
                println!("  dep {name:<12} {version}");
            }
            for (name, value) in &output.environment {
                println!("  env {name:<20} {}", value.as_deref().unwrap_or("(not set)"));
            }
        }
        OutputFormat::Raw => println!("{}", output.version),
    }
}

fn active_features() -> Vec<&'static str> {
    [
        ("schema", cfg!(feature = "schema")),
        ("store", cfg!(feature = "store")),
        ("cli", cfg!(feature = "cli")),
    ]
    .into_iter()
    .filter_map(|(name, on)| on.then_some(name))
    .collect()
}
