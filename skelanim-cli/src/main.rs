//! Main entry point for the skelanim CLI

mod cli;
mod commands;
mod utils;

use anyhow::Result;
use clap::Parser;

use crate::cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Verbosity flags set the base level, RUST_LOG can still refine it
    env_logger::Builder::new()
        .filter_level(cli.log_level())
        .parse_default_env()
        .init();

    match cli.command {
        Commands::Info { scene, detailed } => commands::info::execute(&scene, detailed),
        Commands::Tree {
            scene,
            depth,
            no_color,
            compact,
        } => commands::tree::execute(&scene, depth, no_color, compact),
        Commands::Play(args) => commands::play::execute(&args),
    }
}
