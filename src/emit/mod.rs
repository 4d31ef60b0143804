//! Configuration emitters, one per backend.
//!
//! Emitters are pure: they read a [`BuildEnvironment`] and return rendered
//! [`GeneratedConfig`]s without touching the filesystem. Writing happens in
//! one place, [`write_all`], after every backend home has been validated.
//!
//! Rendering the same environment twice yields byte-identical output. No
//! emitter reads the clock, a random source, or iterates a hash map.

use std::path::PathBuf;

use anyhow::Result;

use crate::core::{BackendKind, BuildEnvironment};
use crate::ops::select::SelectedBackends;
use crate::util::fs::write_string;

pub mod gradle;
pub mod ivy;
pub mod maven;
pub mod sbt;

pub use gradle::GradleEmitter;
pub use ivy::IvyEmitter;
pub use maven::MavenEmitter;
pub use sbt::SbtEmitter;

/// A fully rendered configuration file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedConfig {
    /// Short label, e.g. `settings.xml`
    pub name: String,
    /// Absolute destination
    pub path: PathBuf,
    pub contents: String,
}

impl GeneratedConfig {
    pub fn new(name: impl Into<String>, path: PathBuf, contents: String) -> Self {
        GeneratedConfig {
            name: name.into(),
            path,
            contents,
        }
    }
}

/// Renders one backend's native configuration.
pub trait ConfigEmitter {
    /// The backend this emitter configures.
    fn backend(&self) -> BackendKind;

    /// Render every file for this backend. May return nothing.
    fn render(&self, env: &BuildEnvironment) -> Vec<GeneratedConfig>;
}

/// The emitter for a backend.
pub fn emitter_for(kind: BackendKind) -> &'static dyn ConfigEmitter {
    match kind {
        BackendKind::Maven => &MavenEmitter,
        BackendKind::Gradle => &GradleEmitter,
        BackendKind::Ant => &IvyEmitter,
        BackendKind::Sbt => &SbtEmitter,
    }
}

/// Render configuration for every validated backend, in precedence order.
pub fn render_all(env: &BuildEnvironment, selected: &SelectedBackends) -> Vec<GeneratedConfig> {
    selected
        .kinds()
        .flat_map(|kind| {
            let configs = emitter_for(kind).render(env);
            tracing::debug!("{} emitter rendered {} file(s)", kind, configs.len());
            configs
        })
        .collect()
}

/// Write rendered files, creating parent directories.
pub fn write_all(configs: &[GeneratedConfig]) -> Result<()> {
    for config in configs {
        write_string(&config.path, &config.contents)?;
        tracing::info!("wrote {}", config.path.display());
    }
    Ok(())
}
