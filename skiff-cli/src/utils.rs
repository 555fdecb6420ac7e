//! Shared helpers for CLI commands: configuration loading, collaborator
//! construction, and argument validation.

use std::path::PathBuf;

use crate::error::CliError;
use skiff::{
    AllocationStore, Config, ConfigBuilder, ContainerName, ContainerRuntime, Error, LockFile,
    LxdRuntime, Port,
};

/// Global CLI options shared across all commands.
#[derive(Debug, Clone)]
pub struct GlobalOptions {
    /// Enable verbose output.
    #[allow(dead_code)] // Verbosity is consumed by the logger in main.
    pub verbose: bool,

    /// Suppress non-essential output.
    pub quiet: bool,

    /// Override the data directory location.
    pub data_dir: Option<PathBuf>,

    /// Override the container runtime binary.
    pub runtime: Option<String>,
}

/// Resolve the effective configuration for this invocation.
pub fn load_configuration(global: &GlobalOptions) -> Result<Config, CliError> {
    ConfigBuilder::new()
        .data_dir(global.data_dir.clone())
        .runtime(global.runtime.clone())
        .build()
        .map_err(CliError::from)
}

/// Construct the runtime client from the configuration.
pub fn open_runtime(config: &Config) -> LxdRuntime {
    LxdRuntime::new(config.runtime_binary())
}

/// Construct the allocation store handle from the configuration.
pub fn open_store(config: &Config) -> AllocationStore {
    AllocationStore::new(config.store_path())
}

/// Construct the lock file handle from the configuration.
pub fn open_lock(config: &Config) -> LockFile {
    LockFile::new(config.lock_path())
}

/// Validate a container name argument.
pub fn parse_name(raw: &str) -> Result<ContainerName, CliError> {
    ContainerName::new(raw)
        .map_err(Error::from)
        .map_err(CliError::from)
}

/// Validate a bare host-port argument.
pub fn parse_host_port(raw: &str) -> Result<Port, CliError> {
    let value: u16 = raw.parse().map_err(|_| {
        CliError::InvalidArguments(format!("'{raw}' is not a valid port number (1-65535)"))
    })?;
    Port::try_from(value)
        .map_err(Error::from)
        .map_err(CliError::from)
}

/// Pretty-print a JSON value to stdout.
pub fn print_json(value: &serde_json::Value) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value).map_err(std::io::Error::other)?;
    println!("{rendered}");
    Ok(())
}

/// Fail with a not-found error unless the runtime knows the container.
pub fn require_container(runtime: &LxdRuntime, name: &ContainerName) -> Result<(), CliError> {
    if runtime.exists(name).map_err(CliError::from)? {
        Ok(())
    } else {
        Err(CliError::Library(Error::ContainerNotFound {
            name: name.to_string(),
        }))
    }
}
