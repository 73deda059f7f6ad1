use std::io::IsTerminal;

use beacon_core::Outcome;
use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;

pub const VALIDATION_SCHEMA_ID: &str =
    "https://schemas.beacon.dev/cli/v1/validation-result.schema.json";
pub const CHECK_SCHEMA_ID: &str = "https://schemas.beacon.dev/cli/v1/definition-check.schema.json";

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct ValidationOutput<'a> {
    schema_id: &'a str,
    schema: &'a str,
    valid: bool,
    outcome: &'a Outcome,
}

pub fn print_outcome(schema: &str, outcome: &Outcome, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = ValidationOutput {
                schema_id: VALIDATION_SCHEMA_ID,
                schema,
                valid: outcome.is_success(),
                outcome,
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["SCHEMA", "RESULT", "KIND", "PATH", "MESSAGE"])
                .add_row(vec![
                    schema.to_string(),
                    result_text(outcome).to_string(),
                    outcome.kind().map(|k| k.to_string()).unwrap_or_default(),
                    outcome.path().to_string(),
                    outcome.message().to_string(),
                ]);
            for cause in outcome.causes() {
                table.add_row(vec![
                    String::new(),
                    "alternative".to_string(),
                    cause.kind().map(|k| k.to_string()).unwrap_or_default(),
                    cause.path().to_string(),
                    cause.message().to_string(),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            if outcome.is_success() {
                println!("schema={schema} result=valid");
            } else {
                println!(
                    "schema={schema} result=invalid path={} message={}",
                    display_path(outcome.path()),
                    outcome.message()
                );
            }
        }
        OutputFormat::Raw => println!("{outcome}"),
    }
}

/// One line of `check` output.
#[derive(Debug, Serialize)]
pub struct DefinitionSummary {
    pub file: String,
    pub name: String,
    pub version: u32,
    pub fields: usize,
    pub required: usize,
    pub depth: usize,
}

#[derive(Serialize)]
struct CheckOutput<'a> {
    schema_id: &'a str,
    definitions: &'a [DefinitionSummary],
}

pub fn print_definitions(definitions: &[DefinitionSummary], format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = CheckOutput {
                schema_id: CHECK_SCHEMA_ID,
                definitions,
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["FILE", "NAME", "VERSION", "FIELDS", "REQUIRED", "DEPTH"]);
            for def in definitions {
                table.add_row(vec![
                    def.file.clone(),
                    def.name.clone(),
                    def.version.to_string(),
                    def.fields.to_string(),
                    def.required.to_string(),
                    def.depth.to_string(),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for def in definitions {
                println!(
                    "{} v{} fields={} required={} depth={} ({})",
                    def.name, def.version, def.fields, def.required, def.depth, def.file
                );
            }
        }
        OutputFormat::Raw => {
            for def in definitions {
                println!("{} v{}", def.name, def.version);
            }
        }
    }
}

fn result_text(outcome: &Outcome) -> &'static str {
    if outcome.is_success() {
        "valid"
    } else {
        "invalid"
    }
}

fn display_path(path: &str) -> &str {
    if path.is_empty() {
        "$"
    } else {
        path
    }
}
