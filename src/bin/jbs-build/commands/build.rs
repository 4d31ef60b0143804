//! `jbs-build build` command

use std::path::Path;

use anyhow::Result;

use crate::cli::BuildArgs;
use jbs::ops::jbs_build::build;
use jbs::util::shell::Status;
use jbs::util::Shell;

/// Returns the backend's exit status.
pub fn execute(args: BuildArgs, config: Option<&Path>, shell: &Shell) -> Result<i32> {
    let env = super::load_environment(&args.env, config)?;

    shell.status(Status::Preparing, env.workspace().root.display());
    shell.status(Status::Building, args.command.join(" "));
    let outcome = build(&env, &args.command)?;

    for generated in &outcome.prepared.configs {
        shell.verbose(Status::Generated, generated.path.display());
    }

    let result = &outcome.result;
    if result.success() {
        shell.status(
            Status::Finished,
            format!(
                "{} artifact(s) in {}",
                outcome.artifacts.len(),
                env.workspace().artifacts.display()
            ),
        );
    } else if result.out_of_memory() {
        shell.warn("the build JVM aborted, most likely out of memory");
        shell.status(
            Status::Failed,
            format!("exit status {}, see {}", result.exit_code, result.log_path.display()),
        );
    } else {
        shell.status(
            Status::Failed,
            format!("exit status {}, see {}", result.exit_code, result.log_path.display()),
        );
    }

    Ok(result.exit_code)
}
