//! jbs - a hermetic build environment for JVM build tools
//!
//! Prepares a workspace for Maven, Gradle, Ant/Ivy and SBT: validates the
//! declared tool homes, writes each tool's native configuration so that
//! dependency resolution goes through a single cache mirror, composes a
//! `PATH` and runs the build command with its output captured to a log.

pub mod core;
pub mod emit;
pub mod format;
pub mod ops;
pub mod util;

pub use core::{BackendKind, BuildEnvironment, EnvError, EnvSettings};
pub use ops::{build, prepare, BuildOutcome};
pub use util::Config;
