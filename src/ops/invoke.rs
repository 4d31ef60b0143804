//! Running the build command.
//!
//! The invoker never interprets the backend's output or retries. It runs the
//! command once, mirrors everything it prints into the log, and hands back
//! the exit status untouched.

use std::ffi::{OsStr, OsString};
use std::path::PathBuf;

use anyhow::{bail, Result};

use crate::core::environment::vars;
use crate::core::{BackendKind, BuildEnvironment, EnvError};
use crate::ops::select::SelectedBackends;
use crate::util::fs::ensure_dir;
use crate::util::process::{exit_code, find_executable_in, ProcessBuilder};

/// Exit status of a JVM aborted by `-XX:+CrashOnOutOfMemoryError`.
pub const OOM_EXIT_CODE: i32 = 134;

/// Outcome of one build invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildInvocationResult {
    /// Backend exit status, `128 + signal` if it was killed
    pub exit_code: i32,
    pub log_path: PathBuf,
}

impl BuildInvocationResult {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Whether the backend JVM aborted on heap exhaustion.
    pub fn out_of_memory(&self) -> bool {
        self.exit_code == OOM_EXIT_CODE
    }
}

/// Runs a single build command in the prepared environment.
pub struct BuildInvoker<'a> {
    env: &'a BuildEnvironment,
    selected: &'a SelectedBackends,
    path: OsString,
    ivy_settings: Option<PathBuf>,
}

impl<'a> BuildInvoker<'a> {
    /// Create an invoker using an already composed PATH.
    pub fn new(env: &'a BuildEnvironment, selected: &'a SelectedBackends, path: OsString) -> Self {
        BuildInvoker {
            env,
            selected,
            path,
            ivy_settings: None,
        }
    }

    /// Point Ant's Ivy at a generated settings file.
    pub fn with_ivy_settings(mut self, path: PathBuf) -> Self {
        self.ivy_settings = Some(path);
        self
    }

    /// Build the process for `command` without running it.
    pub fn process(&self, command: &[String]) -> Result<ProcessBuilder> {
        let (program, args) = command.split_first().ok_or(EnvError::EmptyCommand)?;
        let source = &self.env.workspace().source;
        let resolved = resolve_program(self.env, &self.path, program)?;

        let settings = self.env.settings();
        let mut pb = ProcessBuilder::new(resolved)
            .args(args)
            .cwd(source)
            .env(vars::PATH, &self.path)
            .env("HOME", &settings.root)
            .env(vars::GRADLE_USER_HOME, &settings.gradle_user_home);

        if let Some(java_home) = self.selected.java_home() {
            pb = pb.env(vars::JAVA_HOME, java_home);
        }

        let jvm_options = self.env.jvm_options();
        pb = pb.env(
            vars::JAVA_OPTS,
            extend_opts(self.env.inherited_opts(vars::JAVA_OPTS), &jvm_options),
        );

        for kind in self.selected.kinds() {
            let mut options = jvm_options.clone();
            if kind == BackendKind::Ant {
                if let Some(ref ivy) = self.ivy_settings {
                    options.push(format!("-Divy.settings.file={}", ivy.display()));
                }
            }
            let var = kind.opts_var();
            pb = pb.env(var, extend_opts(self.env.inherited_opts(var), &options));
        }

        Ok(pb)
    }

    /// Run `command` to completion, teeing output to the log file.
    pub fn invoke(&self, command: &[String]) -> Result<BuildInvocationResult> {
        let pb = self.process(command)?;
        let log_path = self.env.log_path();
        if let Some(parent) = log_path.parent() {
            ensure_dir(parent)?;
        }

        tracing::info!("running `{}`", pb.display_command());
        let status = pb.exec_tee(&log_path)?;
        let code = exit_code(status);

        if code == OOM_EXIT_CODE {
            tracing::warn!("build aborted with status {}, the JVM likely ran out of memory", code);
        } else if code != 0 {
            tracing::info!("build exited with status {}", code);
        }

        Ok(BuildInvocationResult {
            exit_code: code,
            log_path,
        })
    }
}

/// Locate the build program on the composed PATH.
///
/// Relative names resolve against `source/`, where the build runs.
pub fn resolve_program(env: &BuildEnvironment, path: &OsStr, program: &str) -> Result<PathBuf> {
    match find_executable_in(program, path, &env.workspace().source) {
        Some(resolved) => Ok(resolved),
        None => bail!(
            "build command `{}` not found on PATH\n\
             PATH: {}",
            program,
            path.to_string_lossy()
        ),
    }
}

/// Append options to an inherited options variable.
fn extend_opts(inherited: Option<&OsStr>, options: &[String]) -> OsString {
    let mut value = inherited.map(OsStr::to_os_string).unwrap_or_default();
    for option in options {
        if !value.is_empty() {
            value.push(" ");
        }
        value.push(option);
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::environment::CRASH_ON_OOM;
    use crate::core::EnvSettings;
    use crate::ops::select::select_backends;
    use tempfile::TempDir;

    fn command(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_extend_opts() {
        let opts = vec![CRASH_ON_OOM.to_string()];
        assert_eq!(extend_opts(None, &opts), OsString::from(CRASH_ON_OOM));
        assert_eq!(
            extend_opts(Some(OsStr::new("-Xmx1g")), &opts),
            OsString::from("-Xmx1g -XX:+CrashOnOutOfMemoryError")
        );
    }

    #[test]
    fn test_empty_command() {
        let env = BuildEnvironment::from_vars(Vec::<(String, String)>::new(), &EnvSettings::default())
            .unwrap();
        let selected = select_backends(&env).unwrap();
        let invoker = BuildInvoker::new(&env, &selected, OsString::from("/bin"));

        let err = invoker.process(&[]).unwrap_err();
        assert!(matches!(err.downcast_ref::<EnvError>(), Some(EnvError::EmptyCommand)));
    }

    #[cfg(unix)]
    #[test]
    fn test_process_environment() {
        let tmp = TempDir::new().unwrap();
        let ant = tmp.path().join("ant");
        std::fs::create_dir_all(&ant).unwrap();
        let settings = EnvSettings {
            workspace_root: tmp.path().join("ws"),
            ..EnvSettings::default()
        };

        let env = BuildEnvironment::from_vars(
            [("ANT_HOME", ant.to_str().unwrap()), ("ANT_OPTS", "-Dx=1")],
            &settings,
        )
        .unwrap();
        let selected = select_backends(&env).unwrap();
        let ivy = env.settings().ivy_settings();
        let pb = BuildInvoker::new(&env, &selected, OsString::from("/usr/bin:/bin"))
            .with_ivy_settings(ivy.clone())
            .process(&command(&["sh", "-c", "true"]))
            .unwrap();

        assert!(pb.get_program().ends_with("sh"));
        assert_eq!(pb.get_env("PATH"), Some(OsStr::new("/usr/bin:/bin")));
        assert_eq!(pb.get_env("HOME"), Some(env.settings().root.as_os_str()));
        assert_eq!(pb.get_env("JAVA_OPTS"), Some(OsStr::new(CRASH_ON_OOM)));
        assert_eq!(
            pb.get_env("ANT_OPTS").unwrap().to_string_lossy(),
            format!("-Dx=1 {} -Divy.settings.file={}", CRASH_ON_OOM, ivy.display())
        );
        assert!(pb.get_env("MAVEN_OPTS").is_none());
    }

    #[test]
    fn test_unknown_command() {
        let tmp = TempDir::new().unwrap();
        let settings = EnvSettings {
            workspace_root: tmp.path().to_path_buf(),
            ..EnvSettings::default()
        };
        let env = BuildEnvironment::from_vars(Vec::<(String, String)>::new(), &settings).unwrap();
        let selected = select_backends(&env).unwrap();
        let invoker = BuildInvoker::new(&env, &selected, tmp.path().as_os_str().to_os_string());

        let err = invoker.process(&command(&["no-such-build-tool"])).unwrap_err();
        assert!(err.to_string().contains("not found on PATH"));
    }

    #[cfg(unix)]
    #[test]
    fn test_invoke_propagates_status_and_logs() {
        let tmp = TempDir::new().unwrap();
        let settings = EnvSettings {
            workspace_root: tmp.path().join("ws"),
            ..EnvSettings::default()
        };
        let env = BuildEnvironment::from_vars(Vec::<(String, String)>::new(), &settings).unwrap();
        std::fs::create_dir_all(&env.workspace().source).unwrap();
        let selected = select_backends(&env).unwrap();
        let invoker = BuildInvoker::new(&env, &selected, OsString::from("/usr/bin:/bin"));

        let result = invoker
            .invoke(&command(&["sh", "-c", "echo compiling; exit 7"]))
            .unwrap();

        assert_eq!(result.exit_code, 7);
        assert!(!result.success());
        assert_eq!(result.log_path, env.log_path());
        assert_eq!(std::fs::read_to_string(&result.log_path).unwrap(), "compiling\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_invoke_reports_abort_as_134() {
        let tmp = TempDir::new().unwrap();
        let settings = EnvSettings {
            workspace_root: tmp.path().join("ws"),
            ..EnvSettings::default()
        };
        let env = BuildEnvironment::from_vars(Vec::<(String, String)>::new(), &settings).unwrap();
        std::fs::create_dir_all(&env.workspace().source).unwrap();
        let selected = select_backends(&env).unwrap();
        let invoker = BuildInvoker::new(&env, &selected, OsString::from("/usr/bin:/bin"));

        let result = invoker.invoke(&command(&["sh", "-c", "kill -ABRT $$"])).unwrap();
        assert!(result.out_of_memory());
    }
}
