//! Rebind command implementation.

use clap::Args;

use crate::error::CliError;
use crate::utils::{
    load_configuration, open_lock, open_runtime, parse_name, require_container, GlobalOptions,
};
use skiff::{BindingManager, Error, PortSpec, RebindOutcome};

/// Move a host port binding to a container.
///
/// If another container currently holds the host port, its binding is
/// removed first; if no container holds it, this behaves like `bind`.
#[derive(Args)]
pub struct RebindCommand {
    /// Container that should receive the binding
    pub name: String,

    /// Port to forward: PORT or CONTAINER_PORT:HOST_PORT
    pub spec: String,
}

impl RebindCommand {
    /// Execute the rebind command.
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

        // The lock spans the whole find-unbind-bind sequence so that two
        // skiff invocations cannot race on the same host port.
        let _guard = lock.exclusive().map_err(CliError::from)?;
        let outcome = BindingManager::new(&runtime)
            .rebind(&name, spec.host_port(), spec.container_port())
            .map_err(CliError::from)?;

        if !global.quiet {
            let host_port = spec.host_port();
            match outcome {
                RebindOutcome::Unchanged => {
                    eprintln!("Host port {host_port} is already bound to '{name}'");
                }
                RebindOutcome::Bound => {
                    eprintln!(
                        "Bound host port {host_port} to '{name}' port {}",
                        spec.container_port()
                    );
                }
                RebindOutcome::Moved { from } => {
                    eprintln!("Moved host port {host_port} from '{from}' to '{name}'");
                }
            }
        }
        Ok(())
    }
}
