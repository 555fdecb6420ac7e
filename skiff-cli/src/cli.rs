//! CLI structure and command definitions.

use crate::commands::{
    BindCommand, BindingsCommand, CompletionsCommand, CreateCommand, DeleteCommand, ListCommand,
    PortsCommand, RebindCommand, StartCommand, StopCommand, UnbindCommand,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Command-line tool for managing development containers and their port
/// forwards.
#[derive(Parser)]
#[command(name = "skiff")]
#[command(version, about = "Manage development containers and their port forwards", long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Override the data directory location
    #[arg(long, value_name = "PATH", global = true, env = "SKIFF_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Override the container runtime binary
    #[arg(long, value_name = "BINARY", global = true, env = "SKIFF_RUNTIME")]
    pub runtime: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand)]
pub enum Command {
    /// Create a container and assign its ports
    Create(CreateCommand),

    /// Delete a container and release its port slot
    Delete(DeleteCommand),

    /// Start a container
    Start(StartCommand),

    /// Stop a container
    Stop(StopCommand),

    /// List containers with status and SSH port
    List(ListCommand),

    /// Show the ports assigned to a container
    Ports(PortsCommand),

    /// Bind a host port to a container port
    Bind(BindCommand),

    /// Remove a dynamic port binding
    Unbind(UnbindCommand),

    /// Move a host port binding to a container
    Rebind(RebindCommand),

    /// List dynamic bindings across all containers
    Bindings(BindingsCommand),

    /// Generate shell completion scripts
    Completions(CompletionsCommand),
}
