//! The build job pipeline.
//!
//! Stages run strictly in order and each is independently testable:
//! validate homes, compose PATH, resolve the build program, lay out
//! directories, render and write configuration, invoke. Everything before
//! the layout is read-only, so a configuration error leaves the filesystem
//! untouched.

use std::ffi::OsString;
use std::path::PathBuf;

use anyhow::Result;

use crate::core::{BuildEnvironment, EnvError};
use crate::emit::{render_all, write_all, GeneratedConfig};
use crate::ops::invoke::{resolve_program, BuildInvocationResult, BuildInvoker};
use crate::ops::layout::{ensure_layout, list_artifacts};
use crate::ops::path::compose_path;
use crate::ops::select::{select_backends, SelectedBackends};

/// A workspace ready for invocation.
#[derive(Debug, Clone)]
pub struct PreparedBuild {
    pub selected: SelectedBackends,
    /// Files written, in backend precedence order
    pub configs: Vec<GeneratedConfig>,
    pub path: OsString,
    ivy_settings: Option<PathBuf>,
}

impl PreparedBuild {
    /// An invoker wired to this preparation.
    pub fn invoker<'a>(&'a self, env: &'a BuildEnvironment) -> BuildInvoker<'a> {
        let invoker = BuildInvoker::new(env, &self.selected, self.path.clone());
        match self.ivy_settings {
            Some(ref ivy) => invoker.with_ivy_settings(ivy.clone()),
            None => invoker,
        }
    }
}

/// Result of a full build job.
#[derive(Debug, Clone)]
pub struct BuildOutcome {
    pub prepared: PreparedBuild,
    pub result: BuildInvocationResult,
    /// Files under artifacts/ after the build, relative
    pub artifacts: Vec<PathBuf>,
}

/// Validate, lay out and write configuration without invoking anything.
pub fn prepare(env: &BuildEnvironment) -> Result<PreparedBuild> {
    let selected = select_backends(env)?;
    let path = compose_path(env, &selected)?;
    write_configuration(env, selected, path)
}

fn write_configuration(
    env: &BuildEnvironment,
    selected: SelectedBackends,
    path: OsString,
) -> Result<PreparedBuild> {
    ensure_layout(env)?;

    let configs = render_all(env, &selected);
    write_all(&configs)?;

    let ivy_path = env.settings().ivy_settings();
    let ivy_settings = configs
        .iter()
        .any(|c| c.path == ivy_path)
        .then_some(ivy_path);

    Ok(PreparedBuild {
        selected,
        configs,
        path,
        ivy_settings,
    })
}

/// Run one complete build job.
///
/// Returns `Err` only for configuration and I/O errors. A failing backend is
/// a successful invocation with a non-zero exit code in the result.
pub fn build(env: &BuildEnvironment, command: &[String]) -> Result<BuildOutcome> {
    let Some(program) = command.first() else {
        return Err(EnvError::EmptyCommand.into());
    };

    let selected = select_backends(env)?;
    let path = compose_path(env, &selected)?;
    resolve_program(env, &path, program)?;

    let prepared = write_configuration(env, selected, path)?;
    let result = prepared.invoker(env).invoke(command)?;
    let artifacts = list_artifacts(env)?;

    Ok(BuildOutcome {
        prepared,
        result,
        artifacts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::EnvSettings;
    use crate::util::fs::list_files_relative;
    use tempfile::TempDir;

    fn settings_in(tmp: &TempDir) -> EnvSettings {
        EnvSettings {
            workspace_root: tmp.path().join("ws"),
            settings_root: Some(tmp.path().join("settings")),
            ..EnvSettings::default()
        }
    }

    fn home(tmp: &TempDir, name: &str) -> String {
        let dir = tmp.path().join(name);
        std::fs::create_dir_all(&dir).unwrap();
        dir.to_string_lossy().into_owned()
    }

    #[test]
    fn test_no_backends_no_configs() {
        let tmp = TempDir::new().unwrap();
        let env = BuildEnvironment::from_vars([("PATH", "/usr/bin")], &settings_in(&tmp)).unwrap();

        let prepared = prepare(&env).unwrap();
        assert!(prepared.configs.is_empty());
        assert_eq!(prepared.path, OsString::from("/usr/bin"));
        assert!(list_files_relative(&tmp.path().join("settings"))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_missing_home_writes_nothing() {
        let tmp = TempDir::new().unwrap();
        let maven = home(&tmp, "maven");
        let env = BuildEnvironment::from_vars(
            [
                ("MAVEN_HOME", maven.as_str()),
                ("SBT_DIST", "/no/such/sbt"),
                ("CACHE_URL", "http://cache.example/repo"),
            ],
            &settings_in(&tmp),
        )
        .unwrap();

        let err = prepare(&env).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<EnvError>(),
            Some(EnvError::MissingHome { var: "SBT_DIST", .. })
        ));
        assert!(!tmp.path().join("settings").exists());
        assert!(!tmp.path().join("ws").exists());
    }

    #[test]
    fn test_all_backends_with_mirror() {
        let tmp = TempDir::new().unwrap();
        let (maven, gradle, ant, sbt) = (
            home(&tmp, "maven"),
            home(&tmp, "gradle"),
            home(&tmp, "ant"),
            home(&tmp, "sbt"),
        );
        let env = BuildEnvironment::from_vars(
            [
                ("MAVEN_HOME", maven.as_str()),
                ("GRADLE_HOME", gradle.as_str()),
                ("ANT_HOME", ant.as_str()),
                ("SBT_DIST", sbt.as_str()),
                ("CACHE_URL", "http://cache.example/repo"),
            ],
            &settings_in(&tmp),
        )
        .unwrap();

        let prepared = prepare(&env).unwrap();
        let names: Vec<_> = prepared.configs.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "settings.xml",
                "toolchains.xml",
                "gradle.properties",
                "ivysettings.xml",
                ".sbt/repositories",
                ".sbt/1.0/global.sbt",
            ]
        );
        for config in &prepared.configs {
            assert_eq!(std::fs::read_to_string(&config.path).unwrap(), config.contents);
        }
        assert_eq!(prepared.ivy_settings, Some(env.settings().ivy_settings()));
    }

    #[test]
    fn test_regeneration_is_byte_identical() {
        let tmp = TempDir::new().unwrap();
        let (maven, gradle, ant, sbt) = (
            home(&tmp, "maven"),
            home(&tmp, "gradle"),
            home(&tmp, "ant"),
            home(&tmp, "sbt"),
        );
        let env = BuildEnvironment::from_vars(
            [
                ("MAVEN_HOME", maven.as_str()),
                ("GRADLE_HOME", gradle.as_str()),
                ("ANT_HOME", ant.as_str()),
                ("SBT_DIST", sbt.as_str()),
                ("CACHE_URL", "http://cache.example/repo"),
            ],
            &settings_in(&tmp),
        )
        .unwrap();

        let read_all = |configs: &[GeneratedConfig]| -> Vec<Vec<u8>> {
            configs
                .iter()
                .map(|c| std::fs::read(&c.path).unwrap())
                .collect()
        };

        let first = prepare(&env).unwrap();
        let first_bytes = read_all(&first.configs);
        let second = prepare(&env).unwrap();
        let second_bytes = read_all(&second.configs);

        assert_eq!(first.configs, second.configs);
        assert_eq!(first_bytes, second_bytes);
    }

    #[test]
    fn test_build_rejects_empty_command_before_writing() {
        let tmp = TempDir::new().unwrap();
        let env = BuildEnvironment::from_vars(Vec::<(String, String)>::new(), &settings_in(&tmp))
            .unwrap();

        assert!(build(&env, &[]).is_err());
        assert!(!tmp.path().join("ws").exists());
    }

    #[test]
    fn test_build_unknown_program_writes_nothing() {
        let tmp = TempDir::new().unwrap();
        let maven = home(&tmp, "maven");
        let env = BuildEnvironment::from_vars(
            [("MAVEN_HOME", maven.as_str()), ("PATH", "/usr/bin:/bin")],
            &settings_in(&tmp),
        )
        .unwrap();

        let command = vec!["definitely-not-a-build-tool".to_string()];
        let err = build(&env, &command).unwrap_err();

        assert!(err.to_string().contains("definitely-not-a-build-tool"));
        assert!(!tmp.path().join("settings").exists());
        assert!(!tmp.path().join("ws").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_build_ant_without_mirror() {
        let tmp = TempDir::new().unwrap();
        let ant = home(&tmp, "ant");
        let env = BuildEnvironment::from_vars(
            [("ANT_HOME", ant.as_str()), ("PATH", "/usr/bin:/bin")],
            &settings_in(&tmp),
        )
        .unwrap();

        let command: Vec<String> = ["sh", "-c", "echo BUILD SUCCESSFUL"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let outcome = build(&env, &command).unwrap();

        assert_eq!(outcome.result.exit_code, 0);
        assert!(!std::fs::read_to_string(&outcome.result.log_path)
            .unwrap()
            .is_empty());
        assert!(!env.settings().ivy_settings().exists());
        assert!(outcome.prepared.configs.is_empty());
        assert!(outcome.artifacts.is_empty());
    }
}
