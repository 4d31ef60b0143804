//! jbs-build CLI - hermetic JVM build environment

use anyhow::Result;
use clap::Parser;
use jbs::util::shell::ColorChoice;
use jbs::util::Shell;
use jbs::EnvError;
use miette::Diagnostic;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() {
    match run() {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("error: {:#}", e);
            if let Some(help) = e.downcast_ref::<EnvError>().and_then(|env| env.help()) {
                eprintln!("help: {}", help);
            }
            std::process::exit(1);
        }
    }
}

fn run() -> Result<i32> {
    // Parse CLI
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("jbs=debug")
    } else if cli.quiet {
        EnvFilter::new("jbs=warn")
    } else {
        EnvFilter::new("jbs=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    let color: ColorChoice = cli.color.parse().map_err(anyhow::Error::msg)?;
    let shell = Shell::from_flags(cli.quiet, cli.verbose, color);
    let config = cli.config.as_deref();

    // Execute command
    match cli.command {
        Commands::Build(args) => commands::build::execute(args, config, &shell),
        Commands::Configure(args) => commands::configure::execute(args, config, &shell).map(|_| 0),
        Commands::Env(args) => commands::env::execute(args, config, &shell).map(|_| 0),
        Commands::Completions(args) => commands::completions::execute(args).map(|_| 0),
    }
}
