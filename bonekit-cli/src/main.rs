//! Main entry point for the bonekit CLI

use anyhow::Result;
use clap::CommandFactory;
use clap::Parser;
use clap_complete::{Generator, generate};
use std::io;

use bonekit_cli::cli::{Cli, Commands};
use bonekit_cli::commands;

fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize logger; -v and -q win over RUST_LOG
    let env = env_logger::Env::default().default_filter_or("warn");
    let mut logger = env_logger::Builder::from_env(env);
    if let Some(level) = cli.log_level() {
        logger.filter_level(level);
    }
    logger.init();

    // Execute command
    match cli.command {
        Commands::Info(args) => commands::info::execute(args),
        Commands::Pose(args) => commands::pose::execute(args),
        Commands::Script(args) => commands::script::execute(args),
        Commands::Play(args) => commands::play::execute(args),
        Commands::Completions { shell } => {
            print_completions(shell, &mut Cli::command());
            Ok(())
        }
    }
}

fn print_completions<G: Generator>(generator: G, cmd: &mut clap::Command) {
    generate(
        generator,
        cmd,
        cmd.get_name().to_string(),
        &mut io::stdout(),
    );
}
