//! Command implementations

pub mod build;
pub mod completions;
pub mod configure;
pub mod env;

use std::path::Path;

use anyhow::{Context, Result};

use crate::cli::EnvironmentArgs;
use jbs::util::config::{
    global_config_path, load_config, load_config_explicit, project_config_path,
};
use jbs::BuildEnvironment;

/// Capture the process environment under merged configuration.
///
/// Precedence: CLI flags, then the project config (`--config` or
/// `.jbs/config.toml`), then `~/.jbs/config.toml`. A file named with
/// `--config` must exist.
pub fn load_environment(args: &EnvironmentArgs, config: Option<&Path>) -> Result<BuildEnvironment> {
    let global_path = global_config_path();
    let merged = match config {
        Some(path) => load_config_explicit(global_path.as_deref(), path)?,
        None => {
            let cwd = std::env::current_dir().context("failed to read current directory")?;
            load_config(global_path.as_deref(), &project_config_path(&cwd))?
        }
    };

    let mut settings = merged.env_settings();

    if let Some(ref workspace) = args.workspace {
        settings.workspace_root = workspace.clone();
    }
    if let Some(ref settings_root) = args.settings_root {
        settings.settings_root = Some(settings_root.clone());
    }
    if let Some(ref version) = args.base_java_version {
        settings.base_java_version = version.clone();
    }

    tracing::debug!("workspace root: {}", settings.workspace_root.display());
    Ok(BuildEnvironment::capture(&settings)?)
}
