//! `jbs-build env` command

use std::path::Path;

use anyhow::Result;

use crate::cli::EnvArgs;
use jbs::ops::report::{env_report, format_report};
use jbs::util::Shell;

pub fn execute(args: EnvArgs, config: Option<&Path>, shell: &Shell) -> Result<()> {
    let env = super::load_environment(&args.env, config)?;
    let report = env_report(&env)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", format_report(&report, shell.is_verbose()));
    }

    Ok(())
}
