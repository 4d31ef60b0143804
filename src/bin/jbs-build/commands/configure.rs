//! `jbs-build configure` command

use std::path::Path;

use anyhow::Result;

use crate::cli::ConfigureArgs;
use jbs::ops::jbs_build::prepare;
use jbs::util::shell::Status;
use jbs::util::Shell;

pub fn execute(args: ConfigureArgs, config: Option<&Path>, shell: &Shell) -> Result<()> {
    let env = super::load_environment(&args.env, config)?;
    let prepared = prepare(&env)?;

    if prepared.selected.is_empty() {
        shell.note("no build tool homes set");
    } else {
        let names: Vec<_> = prepared.selected.kinds().map(|k| k.name()).collect();
        shell.status(Status::Validated, names.join(", "));
    }

    for desc in env.descriptors().iter().filter(|d| !d.is_declared()) {
        shell.verbose(Status::Skipped, format!("{} ({} not set)", desc.kind, desc.home_var));
    }

    for generated in &prepared.configs {
        shell.status(Status::Generated, generated.path.display());
    }
    shell.verbose(Status::Info, format!("PATH={}", prepared.path.to_string_lossy()));

    Ok(())
}
