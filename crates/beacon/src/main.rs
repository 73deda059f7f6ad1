mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(
    name = "beacon",
    version,
    about = "Validate JSON documents against declarative schemas"
)]
struct Cli {
    /// Output format. Default: table on a terminal, json otherwise.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(
        long,
        value_name = "LEVEL",
        default_value = "warn",
        env = "BEACON_LOG_LEVEL",
        global = true
    )]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    match cmd::run(cli.command, format) {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_validate_with_registry_lookup() {
        let cli = Cli::try_parse_from([
            "beacon",
            "validate",
            "doc.json",
            "--schema-dir",
            "schemas",
            "--name",
            "order",
            "--schema-version",
            "2",
        ])
        .expect("validate args should parse");

        match cli.command {
            Command::Validate(args) => {
                assert_eq!(args.name.as_deref(), Some("order"));
                assert_eq!(args.schema_version, Some(2));
                assert_eq!(args.max_depth, beacon_core::DEFAULT_MAX_DEPTH);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn check_requires_a_file() {
        let err = Cli::try_parse_from(["beacon", "check"]).expect_err("files are required");
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn rejects_unknown_output_format() {
        let err = Cli::try_parse_from(["beacon", "--format", "xml", "version"])
            .expect_err("xml is not a format");
        assert_eq!(err.kind(), clap::error::ErrorKind::InvalidValue);
    }
}
