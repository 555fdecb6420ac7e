//! Shell completion generation command.

use crate::cli::Cli;
use crate::error::CliError;
use crate::utils::GlobalOptions;
use clap::{CommandFactory, Parser};
use clap_complete::{generate, Shell};
use std::io;

/// Generate shell completion scripts
#[derive(Parser)]
pub struct CompletionsCommand {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

impl CompletionsCommand {
    /// Execute the completions command.
    pub fn execute(&self, _global: &GlobalOptions) -> Result<(), CliError> {
        let mut cmd = Cli::command();

        match self.shell {
            Shell::Bash => {
                eprintln!("# Enable with:");
                eprintln!("#   eval \"$(skiff completions bash)\"");
            }
            Shell::Zsh => {
                eprintln!("# Install into a directory on your $fpath:");
                eprintln!("#   skiff completions zsh > ~/.zsh/completions/_skiff");
            }
            Shell::Fish => {
                eprintln!("# Install with:");
                eprintln!("#   skiff completions fish > ~/.config/fish/completions/skiff.fish");
            }
            _ => {}
        }
        eprintln!();

        generate(self.shell, &mut cmd, "skiff", &mut io::stdout());
        Ok(())
    }
}
