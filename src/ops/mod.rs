//! High-level operations.
//!
//! Each stage of a build job lives in its own module; [`jbs_build`] chains
//! them together.

pub mod invoke;
pub mod jbs_build;
pub mod layout;
pub mod path;
pub mod report;
pub mod select;

pub use invoke::{BuildInvocationResult, BuildInvoker, OOM_EXIT_CODE};
pub use jbs_build::{build, prepare, BuildOutcome, PreparedBuild};
pub use layout::{ensure_layout, list_artifacts};
pub use path::{compose_path, path_prefix};
pub use report::{env_report, format_report, EnvReport};
pub use select::{select_backends, SelectedBackends};
