//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

/// jbs-build - prepare a hermetic environment and run a JVM build
#[derive(Parser)]
#[command(name = "jbs-build")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Coloring: auto, always, never
    #[arg(long, global = true, default_value = "auto")]
    pub color: String,

    /// Project config file (defaults to .jbs/config.toml)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Prepare the environment and run a build command
    Build(BuildArgs),

    /// Validate and write tool configuration without building
    Configure(ConfigureArgs),

    /// Show the detected environment
    Env(EnvArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Overrides shared by every environment-reading command.
#[derive(Args, Debug, Clone, Default)]
pub struct EnvironmentArgs {
    /// Workspace root
    #[arg(long, value_name = "DIR")]
    pub workspace: Option<PathBuf>,

    /// Where tool settings are written (defaults to <workspace>/settings)
    #[arg(long, value_name = "DIR")]
    pub settings_root: Option<PathBuf>,

    /// Java version of the base image
    #[arg(long, value_name = "VERSION")]
    pub base_java_version: Option<String>,
}

#[derive(Args)]
pub struct BuildArgs {
    #[command(flatten)]
    pub env: EnvironmentArgs,

    /// Build command and its arguments
    #[arg(last = true, required = true, value_name = "COMMAND")]
    pub command: Vec<String>,
}

#[derive(Args)]
pub struct ConfigureArgs {
    #[command(flatten)]
    pub env: EnvironmentArgs,
}

#[derive(Args)]
pub struct EnvArgs {
    #[command(flatten)]
    pub env: EnvironmentArgs,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
