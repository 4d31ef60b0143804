//! Core data model: environment snapshot, backends and toolchains.

pub mod backend;
pub mod environment;
pub mod errors;
pub mod toolchain;

pub use backend::{BackendDescriptor, BackendKind};
pub use environment::{BuildEnvironment, CacheMirror, EnvSettings, SettingsLayout, WorkspaceLayout};
pub use errors::EnvError;
pub use toolchain::{ToolchainCatalog, ToolchainEntry, ToolchainSet};
