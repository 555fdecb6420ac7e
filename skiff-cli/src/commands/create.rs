//! Create command implementation.

use clap::Args;

use crate::error::CliError;
use crate::utils::{
    load_configuration, open_lock, open_runtime, open_store, parse_name, GlobalOptions,
};
use skiff::{create_container, CreateOptions, CreateSource};

/// Create a container and assign its ports.
#[derive(Args)]
pub struct CreateCommand {
    /// Container name
    pub name: String,

    /// Image to launch from (default from configuration)
    #[arg(long, value_name = "IMAGE", conflicts_with = "from_snapshot")]
    pub image: Option<String>,

    /// Copy an existing container or snapshot instead of launching
    #[arg(long, value_name = "SOURCE")]
    pub from_snapshot: Option<String>,
}

impl CreateCommand {
    /// Execute the create command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let name = parse_name(&self.name)?;
        let config = load_configuration(global)?;

        let runtime = open_runtime(&config);
        let store = open_store(&config);
        let lock = open_lock(&config);

        let source = match self.from_snapshot {
            Some(snapshot) => CreateSource::Snapshot(snapshot),
            None => CreateSource::Image(
                self.image.unwrap_or_else(|| config.image().to_string()),
            ),
        };

        let options = CreateOptions {
            name: name.clone(),
            source,
        };
        let outcome = create_container(&runtime, &store, &lock, config.layout(), &options)
            .map_err(CliError::from)?;

        if !global.quiet {
            eprintln!("Created container '{name}'");
        }
        println!("ssh: {}", outcome.ssh_port);
        println!("services: {}", outcome.service_range);

        Ok(())
    }
}
