//! Executable search path composition.

use std::env;
use std::ffi::OsString;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::core::BuildEnvironment;
use crate::ops::select::SelectedBackends;

/// `bin` directories to prepend, highest precedence first.
///
/// JDK first, then Maven, Gradle, Ant and SBT, each only when present.
pub fn path_prefix(selected: &SelectedBackends) -> Vec<PathBuf> {
    selected
        .java_home()
        .map(|home| home.join("bin"))
        .into_iter()
        .chain(selected.descriptors().iter().filter_map(|d| d.bin_dir()))
        .collect()
}

/// Compose PATH for the build.
///
/// With nothing present the inherited PATH is returned unchanged.
pub fn compose_path(env: &BuildEnvironment, selected: &SelectedBackends) -> Result<OsString> {
    let prefix = path_prefix(selected);
    let inherited = env.inherited_path();

    if prefix.is_empty() {
        return Ok(inherited.map(|p| p.to_os_string()).unwrap_or_default());
    }

    let inherited_entries = inherited.into_iter().flat_map(env::split_paths);
    env::join_paths(prefix.into_iter().chain(inherited_entries))
        .context("a tool home contains a path separator and cannot be put on PATH")
}
