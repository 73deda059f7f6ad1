use beacon_core::DEFAULT_MAX_DEPTH;

use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    println!("beacon {}", env!("CARGO_PKG_VERSION"));
    if !args.extended {
        return Ok(SUCCESS);
    }

    println!("target: {}", option_env!("BEACON_BUILD_TARGET").unwrap_or("unknown"));
    println!("rustc: {}", option_env!("RUSTC_VERSION").unwrap_or("unknown"));
    println!("git_hash: {}", option_env!("GIT_HASH").unwrap_or("unknown"));
    println!("default_max_depth: {DEFAULT_MAX_DEPTH}");
    println!(
        "features: schema={}, store={}, cli=true",
        cfg!(feature = "schema"),
        cfg!(feature = "store"),
    );

    Ok(SUCCESS)
}
