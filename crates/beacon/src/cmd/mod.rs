use clap::{Args, Subcommand};
use std::path::{Path, PathBuf};

use beacon_core::DEFAULT_MAX_DEPTH;

use crate::exit::{io_error, CliResult};
use crate::output::OutputFormat;

pub mod check;
pub mod envinfo;
pub mod validate;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Validate a JSON document against a schema.
    Validate(ValidateArgs),
    /// Compile schema definition files and summarize them.
    Check(CheckArgs),
    /// Show version information.
    Version(VersionArgs),
    /// Print build and environment diagnostics.
    Envinfo(EnvinfoArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Validate(args) => validate::run(args, format),
        Command::Check(args) => check::run(args, format),
        Command::Version(args) => version::run(args),
        Command::Envinfo(args) => envinfo::run(args, format),
    }
}

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Document to validate (`-` reads stdin).
    pub document: PathBuf,
    /// Schema definition file. Takes precedence over --schema-dir.
    #[arg(long, short = 's', value_name = "FILE")]
    pub schema: Option<PathBuf>,
    /// Directory of `<name>.v<version>.schema.json` definitions.
    #[arg(long, value_name = "DIR", env = "BEACON_SCHEMA_DIR")]
    pub schema_dir: Option<PathBuf>,
    /// Schema name to look up in --schema-dir.
    #[arg(long, short = 'n')]
    pub name: Option<String>,
    /// Schema version to look up in --schema-dir. Default: latest.
    #[arg(long = "schema-version", value_name = "VERSION")]
    pub schema_version: Option<u32>,
    /// Maximum nesting depth for definitions and documents.
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
    pub max_depth: usize,
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Schema definition files.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
    /// Maximum nesting depth for definitions.
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
    pub max_depth: usize,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

#[derive(Args, Debug, Default)]
pub struct EnvinfoArgs {}

/// Read a file, or stdin when `path` is `-`.
pub(crate) fn read_input(path: &Path) -> CliResult<String> {
    if path == Path::new("-") {
        let mut content = String::new();
        std::io::Read::read_to_string(&mut std::io::stdin(), &mut content)
            .map_err(|err| io_error("failed reading stdin", err))?;
        return Ok(content);
    }
    std::fs::read_to_string(path)
        .map_err(|err| io_error(&format!("failed reading {}", path.display()), err))
}
