//! Delete command implementation.

use clap::Args;

use crate::error::CliError;
use crate::utils::{
    load_configuration, open_lock, open_runtime, open_store, parse_name, GlobalOptions,
};
use skiff::{delete_container, DeleteOptions};

/// Delete a container and release its port slot.
#[derive(Args)]
pub struct DeleteCommand {
    /// Container name
    pub name: String,

    /// Delete even if the container is running
    #[arg(long)]
    pub force: bool,
}

impl DeleteCommand {
    /// Execute the delete command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let name = parse_name(&self.name)?;
        let config = load_configuration(global)?;

        let runtime = open_runtime(&config);
        let store = open_store(&config);
        let lock = open_lock(&config);

        let options = DeleteOptions {
            name: name.clone(),
            force: self.force,
        };
        delete_container(&runtime, &store, &lock, &options).map_err(CliError::from)?;

        if !global.quiet {
            eprintln!("Deleted container '{name}'");
        }
        Ok(())
    }
}
