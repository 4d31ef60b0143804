//! Workspace and settings directory layout.

use std::path::PathBuf;

use anyhow::Result;

use crate::core::BuildEnvironment;
use crate::util::fs::{ensure_dir, list_files_relative};

/// Create the workspace directories and per-tool settings directories.
///
/// Idempotent. Never writes inside `source/`.
pub fn ensure_layout(env: &BuildEnvironment) -> Result<()> {
    for dir in env.workspace().dirs() {
        ensure_dir(dir)?;
    }
    for dir in env.settings().dirs() {
        ensure_dir(&dir)?;
    }
    tracing::debug!("workspace ready at {}", env.workspace().root.display());
    Ok(())
}

/// Files produced under `artifacts/`, relative and sorted.
pub fn list_artifacts(env: &BuildEnvironment) -> Result<Vec<PathBuf>> {
    list_files_relative(&env.workspace().artifacts)
}
