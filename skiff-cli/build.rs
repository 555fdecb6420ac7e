//! Build script for skiff-cli.
//!
//! Generates the man page at build time using clap_mangen. The command
//! structure here is a minimal mirror of src/cli.rs, since build scripts
//! cannot depend on the crate being built; keep the two in sync when
//! commands change.

use clap::{Arg, Command};
use clap_mangen::Man;
use std::fs;
use std::path::PathBuf;

fn build_cli() -> Command {
    Command::new("skiff")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Manage development containers and their port forwards")
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .help("Enable verbose output")
                .global(true)
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("quiet")
                .long("quiet")
                .help("Suppress non-essential output")
                .global(true)
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("data-dir")
                .long("data-dir")
                .help("Override the data directory location")
                .value_name("PATH")
                .global(true)
                .env("SKIFF_DATA_DIR"),
        )
        .arg(
            Arg::new("runtime")
                .long("runtime")
                .help("Override the container runtime binary")
                .value_name("BINARY")
                .global(true)
                .env("SKIFF_RUNTIME"),
        )
        .subcommands(vec![
            Command::new("create").about("Create a container and assign its ports"),
            Command::new("delete").about("Delete a container and release its port slot"),
            Command::new("start").about("Start a container"),
            Command::new("stop").about("Stop a container"),
            Command::new("list").about("List containers with status and SSH port"),
            Command::new("ports").about("Show the ports assigned to a container"),
            Command::new("bind").about("Bind a host port to a container port"),
            Command::new("unbind").about("Remove a dynamic port binding"),
            Command::new("rebind").about("Move a host port binding to a container"),
            Command::new("bindings").about("List dynamic bindings across all containers"),
            Command::new("completions").about("Generate shell completion scripts"),
        ])
}

fn main() {
    let out_dir = PathBuf::from(std::env::var("OUT_DIR").unwrap());
    let man_dir = out_dir.join("man");
    fs::create_dir_all(&man_dir).unwrap();

    let app = build_cli();
    let man = Man::new(app);
    let mut buffer = Vec::new();
    man.render(&mut buffer).unwrap();

    fs::write(man_dir.join("skiff.1"), buffer).unwrap();

    println!("cargo:rerun-if-changed=src/cli.rs");
    println!("cargo:rerun-if-changed=src/commands/");
}
