//! Main entry point for the skiff CLI.
//!
//! Commands for managing development containers and their ports:
//! - `create` / `delete` / `start` / `stop`: container lifecycle
//! - `list` / `ports`: allocated ports and container status
//! - `bind` / `unbind` / `rebind` / `bindings`: dynamic port forwards

mod cli;
mod commands;
mod error;
mod utils;

use clap::Parser;
use cli::Cli;
use utils::GlobalOptions;

fn main() {
    let cli = Cli::parse();

    let _level = skiff::init_logger(cli.verbose, cli.quiet);

    let global = GlobalOptions {
        verbose: cli.verbose,
        quiet: cli.quiet,
        data_dir: cli.data_dir,
        runtime: cli.runtime,
    };

    let result = match cli.command {
        cli::Command::Create(cmd) => cmd.execute(&global),
        cli::Command::Delete(cmd) => cmd.execute(&global),
        cli::Command::Start(cmd) => cmd.execute(&global),
        cli::Command::Stop(cmd) => cmd.execute(&global),
        cli::Command::List(cmd) => cmd.execute(&global),
        cli::Command::Ports(cmd) => cmd.execute(&global),
        cli::Command::Bind(cmd) => cmd.execute(&global),
        cli::Command::Unbind(cmd) => cmd.execute(&global),
        cli::Command::Rebind(cmd) => cmd.execute(&global),
        cli::Command::Bindings(cmd) => cmd.execute(&global),
        cli::Command::Completions(cmd) => cmd.execute(&global),
    };

    match result {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(e.exit_code());
        }
    }
}
