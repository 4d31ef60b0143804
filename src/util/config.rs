//! Configuration file support.
//!
//! Two configuration file locations are read:
//! - Global: `~/.jbs/config.toml` - machine-wide defaults
//! - Project: `--config FILE`, or `.jbs/config.toml` in the current directory
//!
//! Project config takes precedence over global config. CLI flags take
//! precedence over both. Nothing here reads environment variables; those are
//! captured separately by `BuildEnvironment`.
//!
//! ```toml
//! [workspace]
//! root = "/var/workdir"
//! settings_root = "/var/workdir/settings"
//!
//! [toolchains]
//! base_version = "17"
//! jvm_root = "/usr/lib/jvm"
//!
//! [toolchains.homes]
//! "21" = "/opt/temurin-21"
//!
//! [invoke]
//! jvm_options = ["-Xmx4g"]
//! log_file = "build.log"
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::EnvSettings;
use crate::util::fs::read_to_string;

/// Build environment configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub workspace: WorkspaceConfig,
    pub toolchains: ToolchainsConfig,
    pub invoke: InvokeConfig,
}

/// Workspace locations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkspaceConfig {
    /// Workspace root holding source/, artifacts/, logs/ and packages/
    pub root: Option<PathBuf>,

    /// Where generated tool settings are written
    pub settings_root: Option<PathBuf>,
}

/// JDK toolchain selection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolchainsConfig {
    /// Java version of the base image; below 8 selects the legacy set
    pub base_version: Option<String>,

    /// Directory holding `java-<release>-openjdk` installations
    pub jvm_root: Option<PathBuf>,

    /// Explicit JDK home per toolchain version
    pub homes: BTreeMap<String, PathBuf>,
}

/// Invocation settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InvokeConfig {
    /// Extra options for every launched JVM
    pub jvm_options: Vec<String>,

    /// Log file name under logs/
    pub log_file: Option<String>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = read_to_string(path)?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration, falling back to defaults if the file doesn't exist.
    ///
    /// A file that exists but cannot be parsed is still an error.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        if other.workspace.root.is_some() {
            self.workspace.root = other.workspace.root;
        }
        if other.workspace.settings_root.is_some() {
            self.workspace.settings_root = other.workspace.settings_root;
        }

        if other.toolchains.base_version.is_some() {
            self.toolchains.base_version = other.toolchains.base_version;
        }
        if other.toolchains.jvm_root.is_some() {
            self.toolchains.jvm_root = other.toolchains.jvm_root;
        }
        // Per-version homes merge key by key
        self.toolchains.homes.extend(other.toolchains.homes);

        if !other.invoke.jvm_options.is_empty() {
            self.invoke.jvm_options = other.invoke.jvm_options;
        }
        if other.invoke.log_file.is_some() {
            self.invoke.log_file = other.invoke.log_file;
        }
    }

    /// Resolve into environment settings, filling defaults.
    pub fn env_settings(&self) -> EnvSettings {
        let defaults = EnvSettings::default();

        EnvSettings {
            workspace_root: self
                .workspace
                .root
                .clone()
                .unwrap_or(defaults.workspace_root),
            settings_root: self.workspace.settings_root.clone(),
            base_java_version: self
                .toolchains
                .base_version
                .clone()
                .unwrap_or(defaults.base_java_version),
            jvm_root: self.toolchains.jvm_root.clone().unwrap_or(defaults.jvm_root),
            jdk_homes: self.toolchains.homes.clone(),
            jvm_options: self.invoke.jvm_options.clone(),
            log_file: self.invoke.log_file.clone().unwrap_or(defaults.log_file),
        }
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config
/// 2. Global config (~/.jbs/config.toml)
/// 3. Defaults
pub fn load_config(global_path: Option<&Path>, project_path: &Path) -> Result<Config> {
    let mut config = load_global(global_path)?;
    config.merge(Config::load_or_default(project_path)?);
    Ok(config)
}

/// Load merged configuration with a project file named by the user.
///
/// Unlike [`load_config`], the project file must exist.
pub fn load_config_explicit(global_path: Option<&Path>, config_path: &Path) -> Result<Config> {
    let mut config = load_global(global_path)?;
    config.merge(Config::load(config_path)?);
    Ok(config)
}

fn load_global(global_path: Option<&Path>) -> Result<Config> {
    match global_path {
        Some(path) => Config::load_or_default(path),
        None => Ok(Config::default()),
    }
}

/// Get the global config directory (~/.jbs).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".jbs"))
}

/// Get the global config path (~/.jbs/config.toml).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the project config path (.jbs/config.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(".jbs").join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_default() {
        let settings = Config::default().env_settings();
        assert_eq!(settings.workspace_root, PathBuf::from("/var/workdir"));
        assert!(settings.settings_root.is_none());
        assert_eq!(settings.base_java_version, "17");
        assert_eq!(settings.jvm_root, PathBuf::from("/usr/lib/jvm"));
        assert_eq!(settings.log_file, "build.log");
        assert!(settings.jvm_options.is_empty());
    }

    #[test]
    fn test_config_load() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("config.toml");

        std::fs::write(
            &config_path,
            r#"
[workspace]
root = "/work"

[toolchains]
base_version = "7"

[toolchains.homes]
"11" = "/opt/jdk11"

[invoke]
jvm_options = ["-Xmx2g"]
"#,
        )
        .unwrap();

        let config = Config::load(&config_path).unwrap();
        assert_eq!(config.workspace.root, Some(PathBuf::from("/work")));
        assert_eq!(config.toolchains.base_version, Some("7".to_string()));
        assert_eq!(
            config.toolchains.homes.get("11"),
            Some(&PathBuf::from("/opt/jdk11"))
        );
        assert_eq!(config.invoke.jvm_options, vec!["-Xmx2g"]);
    }

    #[test]
    fn test_config_load_invalid() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("config.toml");
        std::fs::write(&config_path, "[workspace\nroot = 1").unwrap();

        assert!(Config::load_or_default(&config_path).is_err());
    }

    #[test]
    fn test_config_merge() {
        let mut base = Config::default();
        base.workspace.root = Some(PathBuf::from("/global"));
        base.toolchains.jvm_root = Some(PathBuf::from("/jvm"));
        base.toolchains
            .homes
            .insert("8".to_string(), PathBuf::from("/jdk8"));

        let mut project = Config::default();
        project.workspace.root = Some(PathBuf::from("/project"));
        project
            .toolchains
            .homes
            .insert("17".to_string(), PathBuf::from("/jdk17"));

        base.merge(project);

        assert_eq!(base.workspace.root, Some(PathBuf::from("/project")));
        assert_eq!(base.toolchains.jvm_root, Some(PathBuf::from("/jvm"))); // Not overridden
        assert_eq!(base.toolchains.homes.len(), 2);
    }

    #[test]
    fn test_load_config_precedence() {
        let tmp = TempDir::new().unwrap();
        let global_path = tmp.path().join("global.toml");
        let project_path = tmp.path().join("project.toml");

        std::fs::write(
            &global_path,
            r#"
[workspace]
root = "/global"

[toolchains]
base_version = "7"
"#,
        )
        .unwrap();

        std::fs::write(
            &project_path,
            r#"
[workspace]
root = "/project"
"#,
        )
        .unwrap();

        let config = load_config(Some(&global_path), &project_path).unwrap();

        // Project config should override root
        assert_eq!(config.workspace.root, Some(PathBuf::from("/project")));
        // Global base version should be preserved
        assert_eq!(config.toolchains.base_version, Some("7".to_string()));
    }

    #[test]
    fn test_load_config_missing_files() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(None, &tmp.path().join("absent.toml")).unwrap();
        assert!(config.workspace.root.is_none());
    }

    #[test]
    fn test_load_config_explicit_requires_file() {
        let tmp = TempDir::new().unwrap();
        let err = load_config_explicit(None, &tmp.path().join("absent.toml")).unwrap_err();
        assert!(format!("{:#}", err).contains("failed to read file"));
    }

    #[test]
    fn test_load_config_explicit_merges_global() {
        let tmp = TempDir::new().unwrap();
        let global_path = tmp.path().join("global.toml");
        let explicit_path = tmp.path().join("jbs.toml");
        std::fs::write(&global_path, "[toolchains]\nbase_version = \"7\"\n").unwrap();
        std::fs::write(&explicit_path, "[workspace]\nroot = \"/explicit\"\n").unwrap();

        let config = load_config_explicit(Some(&global_path), &explicit_path).unwrap();
        assert_eq!(config.workspace.root, Some(PathBuf::from("/explicit")));
        assert_eq!(config.toolchains.base_version.as_deref(), Some("7"));
    }

    #[test]
    fn test_project_config_path() {
        assert_eq!(
            project_config_path(Path::new("/src")),
            PathBuf::from("/src/.jbs/config.toml")
        );
    }
}
