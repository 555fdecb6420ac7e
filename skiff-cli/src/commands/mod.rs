//! CLI command implementations.
//!
//! One module per subcommand:
//! - `create`: create a container and assign its ports
//! - `delete`: delete a container and release its slot
//! - `start` / `stop`: lifecycle pass-throughs
//! - `list`: containers with status and SSH port
//! - `ports`: all ports of one container
//! - `bind` / `unbind` / `rebind`: dynamic port forwards
//! - `bindings`: global binding view
//! - `completions`: shell completion scripts

pub mod bind;
pub mod bindings;
pub mod completions;
pub mod create;
pub mod delete;
pub mod list;
pub mod ports;
pub mod rebind;
pub mod start;
pub mod stop;
pub mod unbind;

pub use bind::BindCommand;
pub use bindings::BindingsCommand;
pub use completions::CompletionsCommand;
pub use create::CreateCommand;
pub use delete::DeleteCommand;
pub use list::ListCommand;
pub use ports::PortsCommand;
pub use rebind::RebindCommand;
pub use start::StartCommand;
pub use stop::StopCommand;
pub use unbind::UnbindCommand;

use clap::ValueEnum;

/// Output format for listing commands.
#[derive(Clone, Copy, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Tab-separated table (human-readable)
    Table,
    /// JSON
    Json,
}
