//! List command implementation.

use std::collections::HashMap;
use std::io::Write;

use clap::Args;
use serde_json::json;

use super::OutputFormat;
use crate::error::CliError;
use crate::utils::{
    load_configuration, open_lock, open_runtime, open_store, print_json, GlobalOptions,
};
use skiff::{ContainerInfo, ContainerRuntime, Port};

/// List containers with status and SSH port.
#[derive(Args)]
pub struct ListCommand {
    /// Output format
    #[arg(long, value_enum, default_value = "table", ignore_case = true)]
    pub format: OutputFormat,
}

impl ListCommand {
    /// Execute the list command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let config = load_configuration(global)?;
        let runtime = open_runtime(&config);
        let store = open_store(&config);
        let lock = open_lock(&config);

        let containers = runtime.list().map_err(CliError::from)?;

        // Shared lock: readers may overlap each other but not a writer.
        let allocations: HashMap<String, Port> = {
            let _guard = lock.shared().map_err(CliError::from)?;
            store
                .entries()
                .map_err(CliError::from)?
                .into_iter()
                .collect()
        };

        match self.format {
            OutputFormat::Table => format_as_table(&containers, &allocations)?,
            OutputFormat::Json => format_as_json(&containers, &allocations)?,
        }
        Ok(())
    }
}

fn format_as_table(
    containers: &[ContainerInfo],
    allocations: &HashMap<String, Port>,
) -> Result<(), CliError> {
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();

    writeln!(handle, "NAME\tSTATUS\tSSH")?;
    for info in containers {
        let ssh = allocations
            .get(info.name.as_str())
            .map_or_else(|| "-".to_string(), ToString::to_string);
        writeln!(handle, "{}\t{}\t{}", info.name, info.status, ssh)?;
    }
    Ok(())
}

fn format_as_json(
    containers: &[ContainerInfo],
    allocations: &HashMap<String, Port>,
) -> Result<(), CliError> {
    let rows: Vec<_> = containers
        .iter()
        .map(|info| {
            json!({
                "name": info.name.as_str(),
                "status": info.status.to_string(),
                "ssh": allocations.get(info.name.as_str()).map(|p| p.value()),
            })
        })
        .collect();
    print_json(&serde_json::Value::Array(rows))
}
