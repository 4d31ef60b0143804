//! Subprocess execution utilities.

use std::collections::BTreeMap;
use std::ffi::{OsStr, OsString};
use std::fs::File;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use std::sync::{Mutex, PoisonError};
use std::thread;

use anyhow::{anyhow, Context, Result};

/// Builder for subprocess execution.
#[derive(Debug, Clone)]
pub struct ProcessBuilder {
    program: PathBuf,
    args: Vec<String>,
    env: BTreeMap<String, OsString>,
    cwd: Option<PathBuf>,
}

impl ProcessBuilder {
    /// Create a new process builder for the given program.
    pub fn new(program: impl AsRef<Path>) -> Self {
        ProcessBuilder {
            program: program.as_ref().to_path_buf(),
            args: Vec::new(),
            env: BTreeMap::new(),
            cwd: None,
        }
    }

    /// Add multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args.extend(
            args.into_iter()
                .map(|s| s.as_ref().to_string_lossy().into_owned()),
        );
        self
    }

    /// Set an environment variable.
    pub fn env(mut self, key: impl Into<String>, value: impl AsRef<OsStr>) -> Self {
        self.env.insert(key.into(), value.as_ref().to_os_string());
        self
    }

    /// Set the working directory.
    pub fn cwd(mut self, cwd: impl AsRef<Path>) -> Self {
        self.cwd = Some(cwd.as_ref().to_path_buf());
        self
    }

    /// Get the program path.
    pub fn get_program(&self) -> &Path {
        &self.program
    }

    /// Get an environment override.
    pub fn get_env(&self, key: &str) -> Option<&OsStr> {
        self.env.get(key).map(|v| v.as_os_str())
    }

    /// Build the Command.
    fn build_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);

        for (key, value) in &self.env {
            cmd.env(key, value);
        }

        if let Some(ref cwd) = self.cwd {
            cmd.current_dir(cwd);
        }

        cmd
    }

    /// Execute, streaming output while copying it to a log file.
    ///
    /// Child stdout goes to our stdout and child stderr to our stderr, as
    /// the bytes arrive. Both streams are also written, interleaved, to
    /// `log_path`. Blocks until the child exits.
    pub fn exec_tee(&self, log_path: &Path) -> Result<ExitStatus> {
        let log = File::create(log_path)
            .with_context(|| format!("failed to create log file: {}", log_path.display()))?;
        let log = Mutex::new(log);

        let mut cmd = self.build_command();
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        let mut child = cmd
            .spawn()
            .with_context(|| format!("failed to spawn `{}`", self.program.display()))?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        let shared = &log;
        let pumped = thread::scope(|s| {
            let out = stdout.map(|src| s.spawn(move || pump(src, io::stdout(), shared)));
            let err = stderr.map(|src| s.spawn(move || pump(src, io::stderr(), shared)));

            for handle in [out, err].into_iter().flatten() {
                handle
                    .join()
                    .map_err(|_| anyhow!("output reader thread panicked"))??;
            }
            Ok::<(), anyhow::Error>(())
        });

        // Reap the child even if copying failed.
        let status = child
            .wait()
            .with_context(|| format!("failed to wait for `{}`", self.program.display()))?;
        pumped.with_context(|| format!("failed to capture output to {}", log_path.display()))?;

        Ok(status)
    }

    /// Display the command for error messages.
    pub fn display_command(&self) -> String {
        let mut parts = vec![self.program.display().to_string()];
        parts.extend(self.args.iter().cloned());
        parts.join(" ")
    }
}

/// Copy `src` to `sink` and the shared log until EOF.
///
/// A failing sink (e.g. a closed terminal) stops echoing but the log keeps
/// receiving output; a failing log is an error.
fn pump<R: Read, W: Write>(mut src: R, mut sink: W, log: &Mutex<File>) -> io::Result<()> {
    let mut buf = [0u8; 8192];
    let mut echo = true;

    loop {
        let n = match src.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };

        if echo && (sink.write_all(&buf[..n]).is_err() || sink.flush().is_err()) {
            echo = false;
        }

        let mut log = log.lock().unwrap_or_else(PoisonError::into_inner);
        log.write_all(&buf[..n])?;
    }

    log.lock().unwrap_or_else(PoisonError::into_inner).flush()
}

/// Exit code of a finished process.
///
/// A process killed by a signal reports `128 + signal`, matching shells,
/// so an abort after `-XX:+CrashOnOutOfMemoryError` surfaces as 134.
pub fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }

    1
}

/// Find an executable on an explicit search path.
pub fn find_executable_in(name: &str, path: &OsStr, cwd: &Path) -> Option<PathBuf> {
    which::which_in(name, Some(path), cwd).ok()
}
