//! Start command implementation.

use clap::Args;

use crate::error::CliError;
use crate::utils::{
    load_configuration, open_runtime, parse_name, require_container, GlobalOptions,
};
use skiff::ContainerRuntime;

/// Start a container.
#[derive(Args)]
pub struct StartCommand {
    /// Container name
    pub name: String,
}

impl StartCommand {
    /// Execute the start command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let name = parse_name(&self.name)?;
        let config = load_configuration(global)?;
        let runtime = open_runtime(&config);

        require_container(&runtime, &name)?;
        runtime.start(&name).map_err(CliError::from)?;

        if !global.quiet {
            eprintln!("Started container '{name}'");
        }
        Ok(())
    }
}
