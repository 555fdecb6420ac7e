//! Ports command implementation.

use clap::Args;
use serde_json::json;

use super::OutputFormat;
use crate::error::CliError;
use crate::utils::{
    load_configuration, open_lock, open_runtime, open_store, parse_name, print_json,
    require_container, GlobalOptions,
};
use skiff::{Binding, BindingManager, Port, PortRange};

/// Show the ports assigned to a container.
#[derive(Args)]
pub struct PortsCommand {
    /// Container name
    pub name: String,

    /// Output format
    #[arg(long, value_enum, default_value = "table", ignore_case = true)]
    pub format: OutputFormat,
}

impl PortsCommand {
    /// Execute the ports command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let name = parse_name(&self.name)?;
        let config = load_configuration(global)?;
        let runtime = open_runtime(&config);
        let store = open_store(&config);
        let lock = open_lock(&config);

        require_container(&runtime, &name)?;

        let ssh_port = {
            let _guard = lock.shared().map_err(CliError::from)?;
            store.get(&name).map_err(CliError::from)?
        };

        // A container created outside skiff has no record; show its
        // bindings anyway and leave the allocated ports blank.
        let service_range = match ssh_port {
            Some(port) => config.layout().service_range(port).ok(),
            None => None,
        };

        let bindings = BindingManager::new(&runtime)
            .list(&name)
            .map_err(CliError::from)?;

        match self.format {
            OutputFormat::Table => format_as_table(ssh_port, service_range, &bindings),
            OutputFormat::Json => format_as_json(&self.name, ssh_port, service_range, &bindings),
        }
    }
}

fn format_as_table(
    ssh_port: Option<Port>,
    service_range: Option<PortRange>,
    bindings: &[Binding],
) -> Result<(), CliError> {
    let ssh = ssh_port.map_or_else(|| "-".to_string(), |p| p.to_string());
    let services = service_range.map_or_else(|| "-".to_string(), |r| r.to_string());
    println!("ssh: {ssh}");
    println!("services: {services}");
    for binding in bindings {
        println!("bind: {} -> {}", binding.host_port, binding.container_port);
    }
    Ok(())
}

fn format_as_json(
    name: &str,
    ssh_port: Option<Port>,
    service_range: Option<PortRange>,
    bindings: &[Binding],
) -> Result<(), CliError> {
    let bindings: Vec<_> = bindings
        .iter()
        .map(|binding| {
            json!({
                "host": binding.host_port.value(),
                "container": binding.container_port.value(),
            })
        })
        .collect();
    print_json(&json!({
        "name": name,
        "ssh": ssh_port.map(Port::value),
        "services": service_range.map(|r| json!({
            "min": r.min().value(),
            "max": r.max().value(),
        })),
        "bindings": bindings,
    }))
}
