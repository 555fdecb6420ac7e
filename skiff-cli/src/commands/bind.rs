//! Bind command implementation.

use clap::Args;

use crate::error::CliError;
use crate::utils::{
    load_configuration, open_lock, open_runtime, parse_name, require_container, GlobalOptions,
};
use skiff::{BindingManager, Error, PortSpec};

/// Bind a host port to a container port.
#[derive(Args)]
pub struct BindCommand {
    /// Container name
    pub name: String,

    /// Port to forward: PORT or CONTAINER_PORT:HOST_PORT
    pub spec: String,
}

impl BindCommand {
    /// Execute the bind command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let name = parse_name(&self.name)?;
        let spec: PortSpec = self
            .spec
            .parse()
            .map_err(Error::from)
            .map_err(CliError::from)?;

        let config = load_configuration(global)?;
        let runtime = open_runtime(&config);
        let lock = open_lock(&config);

        require_container(&runtime, &name)?;

        let _guard = lock.exclusive().map_err(CliError::from)?;
        BindingManager::new(&runtime)
            .bind(&name, spec.host_port(), spec.container_port())
            .map_err(CliError::from)?;

        if !global.quiet {
            eprintln!(
                "Bound host port {} to '{name}' port {}",
                spec.host_port(),
                spec.container_port()
            );
        }
        Ok(())
    }
}
