//! Describe what a build would see, without building.
//!
//! Runs the same validation as a build and renders configuration in memory,
//! but writes nothing.

use std::path::PathBuf;

use anyhow::Result;
use serde::Serialize;

use crate::core::{BackendDescriptor, BuildEnvironment, ToolchainSet};
use crate::emit::render_all;
use crate::ops::path::compose_path;
use crate::ops::select::select_backends;

/// Snapshot of a validated environment.
#[derive(Debug, Clone, Serialize)]
pub struct EnvReport {
    pub workspace: PathBuf,
    pub settings_root: PathBuf,
    pub gradle_user_home: PathBuf,
    pub java_home: Option<PathBuf>,
    /// Backends with a valid home, in precedence order
    pub backends: Vec<BackendDescriptor>,
    pub mirror: Option<String>,
    pub legacy_toolchains: bool,
    pub toolchains: ToolchainSet,
    pub jvm_options: Vec<String>,
    /// Composed PATH, lossily converted
    pub path: String,
    /// Files a build would write
    pub configs: Vec<PathBuf>,
    pub log_path: PathBuf,
}

/// Validate the environment and describe it.
pub fn env_report(env: &BuildEnvironment) -> Result<EnvReport> {
    let selected = select_backends(env)?;
    let path = compose_path(env, &selected)?;
    let configs = render_all(env, &selected)
        .into_iter()
        .map(|config| config.path)
        .collect();

    Ok(EnvReport {
        workspace: env.workspace().root.clone(),
        settings_root: env.settings().root.clone(),
        gradle_user_home: env.settings().gradle_user_home.clone(),
        java_home: selected.java_home().map(PathBuf::from),
        backends: selected.descriptors().to_vec(),
        mirror: env.mirror().map(|m| m.url.clone()),
        legacy_toolchains: env.uses_legacy_toolchains(),
        toolchains: env.toolchains().clone(),
        jvm_options: env.jvm_options(),
        path: path.to_string_lossy().into_owned(),
        configs,
        log_path: env.log_path(),
    })
}

/// Format a report for display.
pub fn format_report(report: &EnvReport, verbose: bool) -> String {
    use std::fmt::Write;

    let mut output = String::new();

    writeln!(output, "Workspace:     {}", report.workspace.display()).unwrap();
    writeln!(output, "Settings root: {}", report.settings_root.display()).unwrap();
    match &report.java_home {
        Some(home) => writeln!(output, "JAVA_HOME:     {}", home.display()).unwrap(),
        None => writeln!(output, "JAVA_HOME:     (unset)").unwrap(),
    }
    match &report.mirror {
        Some(url) => writeln!(output, "Mirror:        {}", url).unwrap(),
        None => writeln!(output, "Mirror:        (disabled)").unwrap(),
    }

    writeln!(output, "\nBackends:").unwrap();
    if report.backends.is_empty() {
        writeln!(output, "  (none)").unwrap();
    }
    for backend in &report.backends {
        let home = backend
            .home
            .as_ref()
            .map(|h| h.display().to_string())
            .unwrap_or_default();
        writeln!(output, "  {:<8} {}={}", backend.kind.name(), backend.home_var, home).unwrap();
    }

    if !report.configs.is_empty() {
        writeln!(output, "\nConfiguration:").unwrap();
        for config in &report.configs {
            writeln!(output, "  {}", config.display()).unwrap();
        }
    }

    if verbose {
        let catalog = if report.legacy_toolchains {
            "legacy"
        } else {
            "modern"
        };
        writeln!(output, "\nToolchains ({}):", catalog).unwrap();
        for entry in report.toolchains.entries() {
            writeln!(output, "  {:<8} {}", entry.version, entry.jdk_home.display()).unwrap();
        }
        writeln!(output, "\nJVM options: {}", report.jvm_options.join(" ")).unwrap();
        writeln!(output, "PATH:        {}", report.path).unwrap();
        writeln!(output, "Log:         {}", report.log_path.display()).unwrap();
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{BackendKind, EnvSettings};
    use tempfile::TempDir;

    fn settings_in(tmp: &TempDir) -> EnvSettings {
        EnvSettings {
            workspace_root: tmp.path().join("ws"),
            ..EnvSettings::default()
        }
    }

    #[test]
    fn test_report_lists_present_backends_only() {
        let tmp = TempDir::new().unwrap();
        let gradle = tmp.path().join("gradle");
        std::fs::create_dir_all(&gradle).unwrap();

        let env = BuildEnvironment::from_vars(
            [("GRADLE_HOME", gradle.as_os_str()), ("PATH", std::ffi::OsStr::new("/usr/bin"))],
            &settings_in(&tmp),
        )
        .unwrap();
        let report = env_report(&env).unwrap();

        assert_eq!(report.backends.len(), 1);
        assert_eq!(report.backends[0].kind, BackendKind::Gradle);
        assert!(report.path.starts_with(&*gradle.join("bin").to_string_lossy()));
        assert_eq!(report.configs, vec![env.settings().gradle_properties()]);
        assert!(report.mirror.is_none());
    }

    #[test]
    fn test_report_writes_nothing() {
        let tmp = TempDir::new().unwrap();
        let maven = tmp.path().join("maven");
        std::fs::create_dir_all(&maven).unwrap();

        let env = BuildEnvironment::from_vars(
            [("MAVEN_HOME", maven.as_os_str())],
            &settings_in(&tmp),
        )
        .unwrap();
        let report = env_report(&env).unwrap();

        assert_eq!(report.configs.len(), 2);
        assert!(!tmp.path().join("ws").exists());
    }

    #[test]
    fn test_report_fails_like_build() {
        let tmp = TempDir::new().unwrap();
        let env = BuildEnvironment::from_vars([("ANT_HOME", "/no/such/ant")], &settings_in(&tmp))
            .unwrap();
        assert!(env_report(&env).is_err());
    }

    #[test]
    fn test_format_report_serializes() {
        let tmp = TempDir::new().unwrap();
        let env = BuildEnvironment::from_vars(
            [("CACHE_URL", "http://cache.example/repo")],
            &settings_in(&tmp),
        )
        .unwrap();
        let report = env_report(&env).unwrap();

        let text = format_report(&report, true);
        assert!(text.contains("Mirror:        http://cache.example/repo"));
        assert!(text.contains("(none)"));
        assert!(text.contains("-XX:+CrashOnOutOfMemoryError"));

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["mirror"], "http://cache.example/repo");
        assert!(json["backends"].as_array().unwrap().is_empty());
    }
}
