//! Backend selection and home validation.
//!
//! A backend is present when its home variable is set. Every declared home
//! must be an existing directory; the first one that is not aborts the job
//! before anything is written. Selection itself has no side effects.

use std::path::{Path, PathBuf};

use crate::core::environment::vars;
use crate::core::{BackendDescriptor, BackendKind, BuildEnvironment, EnvError};

/// Backends whose homes were declared and validated.
///
/// Emitters and the path composer only accept this type, so nothing can be
/// generated for a backend that skipped validation.
#[derive(Debug, Clone)]
pub struct SelectedBackends {
    java_home: Option<PathBuf>,
    present: Vec<BackendDescriptor>,
}

impl SelectedBackends {
    /// Validated `JAVA_HOME`, if declared.
    pub fn java_home(&self) -> Option<&Path> {
        self.java_home.as_deref()
    }

    /// Present backends in precedence order.
    pub fn descriptors(&self) -> &[BackendDescriptor] {
        &self.present
    }

    pub fn kinds(&self) -> impl Iterator<Item = BackendKind> + '_ {
        self.present.iter().map(|d| d.kind)
    }

    pub fn contains(&self, kind: BackendKind) -> bool {
        self.present.iter().any(|d| d.kind == kind)
    }

    pub fn is_empty(&self) -> bool {
        self.present.is_empty()
    }
}

/// Validate every declared home and return the present backends.
pub fn select_backends(env: &BuildEnvironment) -> Result<SelectedBackends, EnvError> {
    if let Some(java_home) = env.java_home() {
        require_dir("JDK", vars::JAVA_HOME, java_home)?;
        tracing::debug!("JAVA_HOME: {}", java_home.display());
    }

    let mut present = Vec::new();
    for desc in env.descriptors() {
        let Some(ref home) = desc.home else {
            tracing::debug!("{} not set, skipping {}", desc.home_var, desc.kind);
            continue;
        };

        require_dir(desc.kind.name(), desc.home_var, home)?;
        tracing::debug!("{}: {}", desc.home_var, home.display());
        present.push(desc);
    }

    Ok(SelectedBackends {
        java_home: env.java_home().map(Path::to_path_buf),
        present,
    })
}

fn require_dir(backend: &'static str, var: &'static str, path: &Path) -> Result<(), EnvError> {
    if path.is_dir() {
        Ok(())
    } else {
        Err(EnvError::MissingHome {
            backend,
            var,
            path: path.to_path_buf(),
        })
    }
}
