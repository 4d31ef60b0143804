//! Build tool backends and their descriptors.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

/// One of the external build tools this crate configures.
///
/// Variant order is PATH precedence: a backend listed earlier shadows
/// same-named executables shipped by a later one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Maven,
    Gradle,
    Ant,
    Sbt,
}

impl BackendKind {
    /// All backends in PATH precedence order.
    pub const ALL: [BackendKind; 4] = [
        BackendKind::Maven,
        BackendKind::Gradle,
        BackendKind::Ant,
        BackendKind::Sbt,
    ];

    /// Human-readable name.
    pub fn name(&self) -> &'static str {
        match self {
            BackendKind::Maven => "Maven",
            BackendKind::Gradle => "Gradle",
            BackendKind::Ant => "Ant",
            BackendKind::Sbt => "SBT",
        }
    }

    /// Environment variable naming the backend's installation.
    pub fn home_var(&self) -> &'static str {
        match self {
            BackendKind::Maven => "MAVEN_HOME",
            BackendKind::Gradle => "GRADLE_HOME",
            BackendKind::Ant => "ANT_HOME",
            BackendKind::Sbt => "SBT_DIST",
        }
    }

    /// Directory under the home holding the launcher scripts.
    pub fn bin_subdir(&self) -> &'static str {
        "bin"
    }

    /// Environment variable the launcher reads extra JVM options from.
    pub fn opts_var(&self) -> &'static str {
        match self {
            BackendKind::Maven => "MAVEN_OPTS",
            BackendKind::Gradle => "GRADLE_OPTS",
            BackendKind::Ant => "ANT_OPTS",
            BackendKind::Sbt => "SBT_OPTS",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Everything known about one backend in the current environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackendDescriptor {
    pub kind: BackendKind,
    pub home_var: &'static str,
    /// Declared home, `None` when the variable is unset or empty
    pub home: Option<PathBuf>,
    pub bin_subdir: &'static str,
    /// Files the backend's emitter may write
    pub config_paths: Vec<PathBuf>,
}

impl BackendDescriptor {
    /// Whether the home variable is set.
    pub fn is_declared(&self) -> bool {
        self.home.is_some()
    }

    /// The backend's `bin` directory, if declared.
    pub fn bin_dir(&self) -> Option<PathBuf> {
        self.home.as_ref().map(|home| home.join(self.bin_subdir))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precedence_order() {
        assert_eq!(
            BackendKind::ALL,
            [
                BackendKind::Maven,
                BackendKind::Gradle,
                BackendKind::Ant,
                BackendKind::Sbt
            ]
        );
        assert!(BackendKind::Maven < BackendKind::Sbt);
    }

    #[test]
    fn test_home_vars() {
        assert_eq!(BackendKind::Maven.home_var(), "MAVEN_HOME");
        assert_eq!(BackendKind::Sbt.home_var(), "SBT_DIST");
        assert_eq!(BackendKind::Ant.opts_var(), "ANT_OPTS");
    }

    #[test]
    fn test_descriptor_bin_dir() {
        let desc = BackendDescriptor {
            kind: BackendKind::Gradle,
            home_var: "GRADLE_HOME",
            home: Some(PathBuf::from("/opt/gradle")),
            bin_subdir: "bin",
            config_paths: Vec::new(),
        };
        assert!(desc.is_declared());
        assert_eq!(desc.bin_dir(), Some(PathBuf::from("/opt/gradle/bin")));
    }
}
