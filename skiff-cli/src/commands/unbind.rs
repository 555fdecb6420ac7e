//! Unbind command implementation.

use clap::Args;

use crate::error::CliError;
use crate::utils::{
    load_configuration, open_lock, open_runtime, parse_host_port, parse_name, require_container,
    GlobalOptions,
};
use skiff::BindingManager;

/// Remove a dynamic port binding.
#[derive(Args)]
pub struct UnbindCommand {
    /// Container name
    pub name: String,

    /// Host port of the binding to remove
    pub host_port: String,
}

impl UnbindCommand {
    /// Execute the unbind command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let name = parse_name(&self.name)?;
        let host_port = parse_host_port(&self.host_port)?;

        let config = load_configuration(global)?;
        let runtime = open_runtime(&config);
        let lock = open_lock(&config);

        require_container(&runtime, &name)?;

        let _guard = lock.exclusive().map_err(CliError::from)?;
        BindingManager::new(&runtime)
            .unbind(&name, host_port)
            .map_err(CliError::from)?;

        if !global.quiet {
            eprintln!("Unbound host port {host_port} from '{name}'");
        }
        Ok(())
    }
}
