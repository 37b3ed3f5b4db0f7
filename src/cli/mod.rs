//! Command-line interface definitions.

pub mod config;
pub mod run;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::adapter::inbound::EntryPointRegistry;

/// Flowhost - generic function execution host.
#[derive(Parser, Debug)]
#[command(name = "flowhost")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve the host HTTP surface until Ctrl-C
    Run(RunArgs),

    /// Inspect configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

/// Subcommands for `flowhost config`
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Resolve a config root for a function and print it as JSON
    Show(ShowArgs),
}

/// Arguments for the `run` subcommand.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Path to configuration file; defaults apply when it does not exist
    #[arg(short, long, default_value = "flowhost.toml")]
    pub config: PathBuf,

    /// Override listen address
    #[arg(long)]
    pub listen: Option<String>,

    /// Override log level (debug, info, warn, error)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Use JSON log format instead of pretty
    #[arg(long)]
    pub json_logs: bool,
}

/// Arguments for the `config show` subcommand.
#[derive(Parser, Debug)]
pub struct ShowArgs {
    /// Function namespace
    #[arg(long)]
    pub namespace: String,

    /// Function name
    #[arg(long)]
    pub name: String,

    /// Config root to resolve
    #[arg(long, default_value = "/configs")]
    pub root: PathBuf,
}

/// Execute the parsed command line with the functions compiled into this host.
///
/// # Errors
///
/// Returns the first error of the executed command.
pub async fn execute(cli: Cli, registry: EntryPointRegistry) -> anyhow::Result<()> {
    match cli.command {
        Commands::Run(args) => run::execute(&args, registry).await,
        Commands::Config(ConfigCommand::Show(args)) => config::execute_show(&args),
    }
}
