//! Bindings command implementation.

use std::io::Write;

use clap::Args;
use serde_json::json;

use super::OutputFormat;
use crate::error::CliError;
use crate::utils::{load_configuration, open_runtime, print_json, GlobalOptions};
use skiff::{Binding, BindingManager, ContainerName, ContainerRuntime};

/// List dynamic bindings across all containers.
#[derive(Args)]
pub struct BindingsCommand {
    /// Output format
    #[arg(long, value_enum, default_value = "table", ignore_case = true)]
    pub format: OutputFormat,
}

impl BindingsCommand {
    /// Execute the bindings command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let config = load_configuration(global)?;
        let runtime = open_runtime(&config);
        let manager = BindingManager::new(&runtime);

        let mut rows: Vec<(ContainerName, Binding)> = Vec::new();
        for info in runtime.list().map_err(CliError::from)? {
            for binding in manager.list(&info.name).map_err(CliError::from)? {
                rows.push((info.name.clone(), binding));
            }
        }

        match self.format {
            OutputFormat::Table => format_as_table(&rows),
            OutputFormat::Json => format_as_json(&rows),
        }
    }
}

fn format_as_table(rows: &[(ContainerName, Binding)]) -> Result<(), CliError> {
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();

    writeln!(handle, "CONTAINER\tHOST\tPORT")?;
    for (name, binding) in rows {
        writeln!(
            handle,
            "{name}\t{}\t{}",
            binding.host_port, binding.container_port
        )?;
    }
    Ok(())
}

fn format_as_json(rows: &[(ContainerName, Binding)]) -> Result<(), CliError> {
    let rows: Vec<_> = rows
        .iter()
        .map(|(name, binding)| {
            json!({
                "container": name.as_str(),
                "host": binding.host_port.value(),
                "port": binding.container_port.value(),
            })
        })
        .collect();
    print_json(&serde_json::Value::Array(rows))
}
