//! Stop command implementation.

use clap::Args;

use crate::error::CliError;
use crate::utils::{
    load_configuration, open_runtime, parse_name, require_container, GlobalOptions,
};
use skiff::ContainerRuntime;

/// Stop a container.
#[derive(Args)]
pub struct StopCommand {
    /// Container name
    pub name: String,

    /// Stop without waiting for a clean shutdown
    #[arg(long)]
    pub force: bool,
}

impl StopCommand {
    /// Execute the stop command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let name = parse_name(&self.name)?;
        let config = load_configuration(global)?;
        let runtime = open_runtime(&config);

        require_container(&runtime, &name)?;
        runtime.stop(&name, self.force).map_err(CliError::from)?;

        if !global.quiet {
            eprintln!("Stopped container '{name}'");
        }
        Ok(())
    }
}
