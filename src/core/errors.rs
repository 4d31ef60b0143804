//! Configuration errors raised before any build tool is touched.

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Error while capturing or validating the build environment.
///
/// Every variant is terminal for the current job and maps to process
/// exit status 1.
#[derive(Debug, Error, Diagnostic)]
pub enum EnvError {
    #[error("{backend} home directory not found: {var}={}", .path.display())]
    #[diagnostic(
        code(jbs::env::missing_home),
        help("point the variable at an existing directory, or unset it to skip this backend")
    )]
    MissingHome {
        backend: &'static str,
        var: &'static str,
        path: PathBuf,
    },

    #[error("invalid CACHE_URL `{url}`: {source}")]
    #[diagnostic(
        code(jbs::env::invalid_mirror_url),
        help("set CACHE_URL to an absolute URL, or set JBS_DISABLE_CACHE=true to build without a mirror")
    )]
    InvalidMirrorUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("invalid base Java version `{0}`")]
    #[diagnostic(
        code(jbs::env::invalid_base_version),
        help("use a plain major version such as `7`, `1.8` or `17`")
    )]
    InvalidBaseVersion(String),

    #[error("cannot resolve `{}` to an absolute path: {source}", .path.display())]
    #[diagnostic(
        code(jbs::env::unresolvable_path),
        help("pass a non-empty path, and run from a directory that still exists")
    )]
    UnresolvablePath {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no build command given")]
    #[diagnostic(
        code(jbs::invoke::empty_command),
        help("pass the build command after `--`, e.g. `jbs-build build -- mvn -B install`")
    )]
    EmptyCommand,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_home_names_variable_and_path() {
        let err = EnvError::MissingHome {
            backend: "Maven",
            var: "MAVEN_HOME",
            path: PathBuf::from("/opt/maven"),
        };
        assert_eq!(
            err.to_string(),
            "Maven home directory not found: MAVEN_HOME=/opt/maven"
        );
        assert!(err.help().is_some());
    }
}
