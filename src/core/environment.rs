//! Immutable snapshot of the build environment.
//!
//! Every decision the pipeline makes is derived from a [`BuildEnvironment`].
//! It is captured once from the process environment plus configuration and
//! never changes afterwards, so each stage can be tested by constructing one
//! from a plain list of variables.

use std::collections::BTreeMap;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

use crate::core::backend::{BackendDescriptor, BackendKind};
use crate::core::errors::EnvError;
use crate::core::toolchain::{
    is_legacy_base, ToolchainCatalog, ToolchainSet, DEFAULT_BASE_JAVA_VERSION, DEFAULT_JVM_ROOT,
};

/// Default workspace root inside the build container.
pub const DEFAULT_WORKSPACE_ROOT: &str = "/var/workdir";

/// Default name of the invocation log under `logs/`.
pub const DEFAULT_LOG_FILE: &str = "build.log";

/// JVM flag that turns heap exhaustion into an abort (exit status 134).
pub const CRASH_ON_OOM: &str = "-XX:+CrashOnOutOfMemoryError";

/// Environment variable names read from the process.
pub mod vars {
    pub const JAVA_HOME: &str = "JAVA_HOME";
    pub const MAVEN_HOME: &str = "MAVEN_HOME";
    pub const GRADLE_HOME: &str = "GRADLE_HOME";
    pub const ANT_HOME: &str = "ANT_HOME";
    pub const SBT_DIST: &str = "SBT_DIST";
    pub const CACHE_URL: &str = "CACHE_URL";
    pub const GRADLE_USER_HOME: &str = "GRADLE_USER_HOME";
    pub const JBS_DISABLE_CACHE: &str = "JBS_DISABLE_CACHE";
    pub const PATH: &str = "PATH";
    pub const JAVA_OPTS: &str = "JAVA_OPTS";

    /// Launcher option variables whose inherited values are extended.
    pub const OPTS: [&str; 5] = ["JAVA_OPTS", "MAVEN_OPTS", "GRADLE_OPTS", "ANT_OPTS", "SBT_OPTS"];
}

/// Settings that are not read from the environment.
///
/// Built from the config file and CLI flags.
#[derive(Debug, Clone)]
pub struct EnvSettings {
    pub workspace_root: PathBuf,
    /// Defaults to `<workspace_root>/settings`
    pub settings_root: Option<PathBuf>,
    pub base_java_version: String,
    pub jvm_root: PathBuf,
    pub jdk_homes: BTreeMap<String, PathBuf>,
    /// Extra JVM options added after the crash-on-OOM flag
    pub jvm_options: Vec<String>,
    pub log_file: String,
}

impl Default for EnvSettings {
    fn default() -> Self {
        EnvSettings {
            workspace_root: PathBuf::from(DEFAULT_WORKSPACE_ROOT),
            settings_root: None,
            base_java_version: DEFAULT_BASE_JAVA_VERSION.to_string(),
            jvm_root: PathBuf::from(DEFAULT_JVM_ROOT),
            jdk_homes: BTreeMap::new(),
            jvm_options: Vec::new(),
            log_file: DEFAULT_LOG_FILE.to_string(),
        }
    }
}

/// The fixed workspace directories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceLayout {
    pub root: PathBuf,
    /// Build input, never written by us
    pub source: PathBuf,
    /// Build output, the only externally consumed result
    pub artifacts: PathBuf,
    pub logs: PathBuf,
    pub packages: PathBuf,
}

impl WorkspaceLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        WorkspaceLayout {
            source: root.join("source"),
            artifacts: root.join("artifacts"),
            logs: root.join("logs"),
            packages: root.join("packages"),
            root,
        }
    }

    /// All directories, in creation order.
    pub fn dirs(&self) -> [&Path; 4] {
        [&self.source, &self.artifacts, &self.logs, &self.packages]
    }
}

/// Where generated tool settings live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsLayout {
    pub root: PathBuf,
    pub gradle_user_home: PathBuf,
}

impl SettingsLayout {
    pub fn maven_dir(&self) -> PathBuf {
        self.root.join(".m2")
    }

    pub fn maven_settings(&self) -> PathBuf {
        self.maven_dir().join("settings.xml")
    }

    pub fn maven_toolchains(&self) -> PathBuf {
        self.maven_dir().join("toolchains.xml")
    }

    /// Local Maven-layout repository, first stop of the Ivy chain.
    pub fn local_repository(&self) -> PathBuf {
        self.maven_dir().join("repository")
    }

    pub fn gradle_properties(&self) -> PathBuf {
        self.gradle_user_home.join("gradle.properties")
    }

    pub fn ivy_settings(&self) -> PathBuf {
        self.root.join("ivysettings.xml")
    }

    pub fn sbt_dir(&self) -> PathBuf {
        self.root.join(".sbt")
    }

    pub fn sbt_global_dir(&self) -> PathBuf {
        self.sbt_dir().join("1.0")
    }

    pub fn sbt_repositories(&self) -> PathBuf {
        self.sbt_dir().join("repositories")
    }

    pub fn sbt_global(&self) -> PathBuf {
        self.sbt_global_dir().join("global.sbt")
    }

    /// Per-tool directories created before invocation.
    pub fn dirs(&self) -> Vec<PathBuf> {
        vec![
            self.root.clone(),
            self.maven_dir(),
            self.gradle_user_home.clone(),
            self.sbt_global_dir(),
        ]
    }
}

/// Optional artifact mirror all resolution is redirected to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheMirror {
    /// URL exactly as configured
    pub url: String,
}

impl CacheMirror {
    /// Validate and wrap a mirror URL.
    pub fn parse(url: &str) -> Result<Self, EnvError> {
        url::Url::parse(url).map_err(|source| EnvError::InvalidMirrorUrl {
            url: url.to_string(),
            source,
        })?;

        Ok(CacheMirror {
            url: url.to_string(),
        })
    }
}

/// Immutable snapshot of everything the pipeline reads.
#[derive(Debug, Clone)]
pub struct BuildEnvironment {
    java_home: Option<PathBuf>,
    maven_home: Option<PathBuf>,
    gradle_home: Option<PathBuf>,
    ant_home: Option<PathBuf>,
    sbt_dist: Option<PathBuf>,
    mirror: Option<CacheMirror>,
    inherited_path: Option<OsString>,
    inherited_opts: BTreeMap<String, OsString>,
    workspace: WorkspaceLayout,
    settings: SettingsLayout,
    toolchains: ToolchainSet,
    legacy_toolchains: bool,
    jvm_options: Vec<String>,
    log_file: String,
}

impl BuildEnvironment {
    /// Capture the current process environment.
    pub fn capture(settings: &EnvSettings) -> Result<Self, EnvError> {
        Self::from_vars(std::env::vars_os(), settings)
    }

    /// Build an environment from an explicit list of variables.
    ///
    /// Variables set to an empty string count as unset. Relative paths, from
    /// variables or settings, are resolved against the current directory.
    pub fn from_vars<I, K, V>(pairs: I, settings: &EnvSettings) -> Result<Self, EnvError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<OsString>,
        V: Into<OsString>,
    {
        let snapshot: BTreeMap<OsString, OsString> = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .filter(|(_, v)| !v.is_empty())
            .collect();

        let get = |name: &str| snapshot.get(OsStr::new(name));
        let get_path = |name: &str| get(name).map(absolute).transpose();

        let cache_disabled = get(vars::JBS_DISABLE_CACHE)
            .map(|v| is_truthy(&v.to_string_lossy()))
            .unwrap_or(false);

        let mirror = match get(vars::CACHE_URL) {
            Some(url) if !cache_disabled => Some(CacheMirror::parse(&url.to_string_lossy())?),
            Some(_) => {
                tracing::debug!("{} set, ignoring {}", vars::JBS_DISABLE_CACHE, vars::CACHE_URL);
                None
            }
            None => None,
        };

        let legacy_toolchains = is_legacy_base(&settings.base_java_version)?;
        let jdk_homes = settings
            .jdk_homes
            .iter()
            .map(|(version, home)| -> Result<_, EnvError> {
                Ok((version.clone(), absolute(home)?))
            })
            .collect::<Result<BTreeMap<_, _>, EnvError>>()?;
        let toolchains = ToolchainCatalog::new(absolute(&settings.jvm_root)?)
            .with_homes(jdk_homes)
            .select(legacy_toolchains);

        let workspace_root = absolute(&settings.workspace_root)?;
        let settings_root = match settings.settings_root {
            Some(ref root) => absolute(root)?,
            None => workspace_root.join("settings"),
        };
        let gradle_user_home = match get_path(vars::GRADLE_USER_HOME)? {
            Some(home) => home,
            None => settings_root.join(".gradle"),
        };

        let inherited_opts = vars::OPTS
            .iter()
            .filter_map(|name| get(*name).map(|v| (name.to_string(), v.clone())))
            .collect();

        Ok(BuildEnvironment {
            java_home: get_path(vars::JAVA_HOME)?,
            maven_home: get_path(vars::MAVEN_HOME)?,
            gradle_home: get_path(vars::GRADLE_HOME)?,
            ant_home: get_path(vars::ANT_HOME)?,
            sbt_dist: get_path(vars::SBT_DIST)?,
            mirror,
            inherited_path: get(vars::PATH).cloned(),
            inherited_opts,
            workspace: WorkspaceLayout::new(workspace_root),
            settings: SettingsLayout {
                root: settings_root,
                gradle_user_home,
            },
            toolchains,
            legacy_toolchains,
            jvm_options: settings.jvm_options.clone(),
            log_file: settings.log_file.clone(),
        })
    }

    pub fn java_home(&self) -> Option<&Path> {
        self.java_home.as_deref()
    }

    /// Declared home of a backend.
    pub fn home(&self, kind: BackendKind) -> Option<&Path> {
        match kind {
            BackendKind::Maven => self.maven_home.as_deref(),
            BackendKind::Gradle => self.gradle_home.as_deref(),
            BackendKind::Ant => self.ant_home.as_deref(),
            BackendKind::Sbt => self.sbt_dist.as_deref(),
        }
    }

    pub fn mirror(&self) -> Option<&CacheMirror> {
        self.mirror.as_ref()
    }

    pub fn inherited_path(&self) -> Option<&OsStr> {
        self.inherited_path.as_deref()
    }

    /// Inherited value of a launcher options variable.
    pub fn inherited_opts(&self, var: &str) -> Option<&OsStr> {
        self.inherited_opts.get(var).map(|v| v.as_os_str())
    }

    pub fn workspace(&self) -> &WorkspaceLayout {
        &self.workspace
    }

    pub fn settings(&self) -> &SettingsLayout {
        &self.settings
    }

    pub fn toolchains(&self) -> &ToolchainSet {
        &self.toolchains
    }

    pub fn uses_legacy_toolchains(&self) -> bool {
        self.legacy_toolchains
    }

    /// JVM options every launched JVM receives.
    pub fn jvm_options(&self) -> Vec<String> {
        let mut options = vec![CRASH_ON_OOM.to_string()];
        options.extend(self.jvm_options.iter().cloned());
        options
    }

    /// Path of the invocation log.
    pub fn log_path(&self) -> PathBuf {
        self.workspace.logs.join(&self.log_file)
    }

    /// `file:` URL of the artifacts directory.
    pub fn artifacts_url(&self) -> String {
        format!("file:{}", self.workspace.artifacts.display())
    }

    /// Descriptor for one backend.
    pub fn descriptor(&self, kind: BackendKind) -> BackendDescriptor {
        let s = &self.settings;
        let config_paths = match kind {
            BackendKind::Maven => vec![s.maven_settings(), s.maven_toolchains()],
            BackendKind::Gradle => vec![s.gradle_properties()],
            BackendKind::Ant => vec![s.ivy_settings()],
            BackendKind::Sbt => vec![s.sbt_repositories(), s.sbt_global()],
        };

        BackendDescriptor {
            kind,
            home_var: kind.home_var(),
            home: self.home(kind).map(Path::to_path_buf),
            bin_subdir: kind.bin_subdir(),
            config_paths,
        }
    }

    /// Descriptors for all four backends in precedence order.
    pub fn descriptors(&self) -> Vec<BackendDescriptor> {
        BackendKind::ALL.iter().map(|k| self.descriptor(*k)).collect()
    }
}

/// Anchor a possibly relative path at the current directory.
///
/// The build runs in `source/`, so every path handed to it must be absolute.
fn absolute(path: impl AsRef<Path>) -> Result<PathBuf, EnvError> {
    let path = path.as_ref();
    std::path::absolute(path).map_err(|source| EnvError::UnresolvablePath {
        path: path.to_path_buf(),
        source,
    })
}

/// Interpret a flag variable. Empty, `0`, `false`, `no` and `off` are false.
fn is_truthy(value: &str) -> bool {
    !matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "" | "0" | "false" | "no" | "off"
    )
}
